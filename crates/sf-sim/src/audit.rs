//! Batch protection audit
//!
//! Plays many randomized sessions on a rayon pool. Each session shuffles its
//! click order, optionally arms the jackpot at a random point, and validates
//! the engine after every click:
//!
//! ```text
//! seed + i ──► session i ──► AuditReport ─┐
//! seed + j ──► session j ──► AuditReport ─┼──► merge ──► AuditReport
//! seed + k ──► session k ──► AuditReport ─┘
//! ```

use anyhow::{Context, Result, bail};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_lottery::{LotteryConfig, LotteryEngine, session_rng, shuffled_indices};

/// Violation samples kept in a report
pub const MAX_VIOLATION_SAMPLES: usize = 10;

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub sessions: usize,
    /// Base seed; session `i` uses `seed + i`
    pub seed: u64,
    /// Probability that a session arms the jackpot at some point
    pub arm_rate: f64,
    /// Worker threads (0 = rayon default)
    pub threads: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            sessions: 1000,
            seed: 0,
            arm_rate: 0.5,
            threads: 0,
        }
    }
}

/// Aggregated audit counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub sessions: u64,
    pub clicks: u64,
    pub counted_clicks: u64,
    pub arms: u64,
    pub armed_wins: u64,
    /// Jackpots awarded without a trigger; any nonzero value is a bug
    pub unarmed_wins: u64,
    /// Armed clicks that found no jackpot left to relocate
    pub armed_misses: u64,
    pub relocations: u64,
    pub destroyed: u64,
    pub violations: u64,
    pub violation_samples: Vec<String>,
}

impl AuditReport {
    pub fn merge(mut self, other: Self) -> Self {
        self.sessions += other.sessions;
        self.clicks += other.clicks;
        self.counted_clicks += other.counted_clicks;
        self.arms += other.arms;
        self.armed_wins += other.armed_wins;
        self.unarmed_wins += other.unarmed_wins;
        self.armed_misses += other.armed_misses;
        self.relocations += other.relocations;
        self.destroyed += other.destroyed;
        self.violations += other.violations;
        let room = MAX_VIOLATION_SAMPLES.saturating_sub(self.violation_samples.len());
        self.violation_samples
            .extend(other.violation_samples.into_iter().take(room));
        self
    }

    /// No invariant broke and no jackpot was handed out unarmed
    pub fn is_clean(&self) -> bool {
        self.violations == 0 && self.unarmed_wins == 0
    }

    fn record_violation(&mut self, message: String) {
        self.violations += 1;
        if self.violation_samples.len() < MAX_VIOLATION_SAMPLES {
            self.violation_samples.push(message);
        }
    }
}

/// Run the audit described by `options` against `config`
pub fn run_audit(config: &LotteryConfig, options: &AuditOptions) -> Result<AuditReport> {
    if !(0.0..=1.0).contains(&options.arm_rate) {
        bail!("arm rate {} is outside 0..=1", options.arm_rate);
    }
    config.validate().context("invalid lottery config")?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if options.threads > 0 {
        builder = builder.num_threads(options.threads);
    }
    let pool = builder.build().context("failed to build audit thread pool")?;

    log::info!(
        "Auditing {} sessions on {} threads (arm rate {:.2})",
        options.sessions,
        pool.current_num_threads(),
        options.arm_rate
    );

    let report = pool.install(|| {
        (0..options.sessions)
            .into_par_iter()
            .map(|i| {
                audit_session(
                    config,
                    options.seed.wrapping_add(i as u64),
                    options.arm_rate,
                )
            })
            .reduce(AuditReport::default, AuditReport::merge)
    });

    if report.is_clean() {
        log::info!("Audit clean: {} sessions, {} clicks", report.sessions, report.clicks);
    } else {
        log::error!(
            "Audit found {} violations and {} unarmed wins",
            report.violations,
            report.unarmed_wins
        );
    }
    Ok(report)
}

/// One randomized session
pub fn audit_session(config: &LotteryConfig, seed: u64, arm_rate: f64) -> AuditReport {
    let mut report = AuditReport {
        sessions: 1,
        ..AuditReport::default()
    };

    let session_config = LotteryConfig {
        seed: Some(seed),
        ..config.clone()
    };
    let mut engine = LotteryEngine::from_config(&session_config);
    let mut rng = session_rng(Some(seed ^ 0x5eed_5eed));

    let order = shuffled_indices(engine.slot_count(), &mut rng);
    let arm_at = (!order.is_empty() && rng.random_bool(arm_rate))
        .then(|| rng.random_range(0..order.len()));

    for (position, index) in order.into_iter().enumerate() {
        if arm_at == Some(position) && engine.trigger_jackpot() {
            report.arms += 1;
        }
        let armed = engine.is_jackpot_armed();
        let had_jackpot = engine.jackpot_index().is_some();

        let Some(outcome) = engine.on_slot_clicked(index) else {
            report.record_violation(format!("seed {}: fresh slot {} rejected", seed, index));
            continue;
        };
        report.clicks += 1;
        if outcome.counted {
            report.counted_clicks += 1;
        }

        match (outcome.jackpot, armed) {
            (true, true) => report.armed_wins += 1,
            (true, false) => {
                report.unarmed_wins += 1;
                report.record_violation(format!(
                    "seed {}: unarmed jackpot win on slot {}",
                    seed, index
                ));
            }
            (false, true) if outcome.counted && !had_jackpot => report.armed_misses += 1,
            _ => {}
        }

        if let Err(e) = engine.validate() {
            report.record_violation(format!("seed {} after slot {}: {}", seed, index, e));
        }
    }

    report.relocations = engine.stats().jackpot_relocations;
    report.destroyed = engine.stats().jackpots_destroyed;
    report
}
