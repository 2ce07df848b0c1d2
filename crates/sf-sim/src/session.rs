//! Scripted single-session runner

use serde::Serialize;
use serde_json::Value;
use sf_lottery::{LotteryConfig, LotteryEngine, SessionStats};
use sf_present::{CelebrationConfig, PresentationDriver, PresentationTiming};

/// Frame step used when a session is animated
pub const FRAME_SECS: f32 = 1.0 / 60.0;

/// Presentation time allowed per click before the runner gives up waiting
const MAX_SETTLE_SECS: f32 = 120.0;

/// What to do in a scripted session
#[derive(Debug, Clone, Default)]
pub struct SessionPlan {
    /// Slots to click, in order; empty clicks every slot in index order
    pub clicks: Vec<usize>,
    /// Arm the jackpot right before the click at this position
    pub arm_before: Option<usize>,
    /// Drive the presentation layer and record its timeline
    pub timing: Option<PresentationTiming>,
}

/// Outcome of one click
#[derive(Debug, Clone, Serialize)]
pub struct ClickRecord {
    pub index: usize,
    pub accepted: bool,
    pub armed: bool,
    pub counted: bool,
    pub prize: Option<String>,
    pub jackpot: bool,
}

/// Presentation milestone with its session time
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub time: f32,
    pub signal: String,
}

/// Everything a session produced
#[derive(Debug, Clone, Serialize)]
pub struct SessionLog {
    pub seed: Option<u64>,
    pub slots: usize,
    pub max_clicks: u32,
    pub initial_jackpot: Option<usize>,
    pub clicks: Vec<ClickRecord>,
    pub events: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineEntry>,
    pub stats: SessionStats,
    pub violations: Vec<String>,
}

/// Play one scripted session
pub fn run_session(config: &LotteryConfig, plan: &SessionPlan) -> SessionLog {
    let mut engine = LotteryEngine::from_config(config);
    let mut driver = plan.timing.clone().map(|timing| {
        let driver = PresentationDriver::new(timing, CelebrationConfig::default());
        match config.seed {
            Some(seed) => driver.with_seed(seed),
            None => driver,
        }
    });

    let clicks: Vec<usize> = if plan.clicks.is_empty() {
        (0..engine.slot_count()).collect()
    } else {
        plan.clicks.clone()
    };

    let mut log = SessionLog {
        seed: config.seed,
        slots: engine.slot_count(),
        max_clicks: engine.max_clicks(),
        initial_jackpot: engine.jackpot_index(),
        clicks: Vec::with_capacity(clicks.len()),
        events: Vec::new(),
        timeline: Vec::new(),
        stats: SessionStats::default(),
        violations: Vec::new(),
    };
    let mut clock = 0.0f32;

    for (position, &index) in clicks.iter().enumerate() {
        if plan.arm_before == Some(position) && !engine.trigger_jackpot() {
            log::warn!("Jackpot could not be armed before click {}", position);
        }
        let armed = engine.is_jackpot_armed();

        let record = match engine.on_slot_clicked(index) {
            Some(outcome) => ClickRecord {
                index,
                accepted: true,
                armed,
                counted: outcome.counted,
                prize: outcome.prize.as_ref().map(|p| p.name().to_string()),
                jackpot: outcome.jackpot,
            },
            None => ClickRecord {
                index,
                accepted: false,
                armed,
                counted: false,
                prize: None,
                jackpot: false,
            },
        };

        if record.jackpot && !armed {
            log.violations
                .push(format!("click {} on slot {} won the jackpot unarmed", position, index));
        }
        if let Err(e) = engine.validate() {
            log.violations.push(format!("after click {}: {}", position, e));
        }
        log.clicks.push(record);

        match driver.as_mut() {
            Some(driver) => {
                for event in engine.drain_events() {
                    log.events.push(event.to_json());
                    driver.handle_event(&event);
                }
                settle(driver, &mut engine, &mut clock, &mut log.timeline);
            }
            None => log
                .events
                .extend(engine.drain_events().iter().map(|e| e.to_json())),
        }
    }

    log.stats = engine.stats().clone();
    log
}

/// Tick the presentation until every animation is done
fn settle(
    driver: &mut PresentationDriver,
    engine: &mut LotteryEngine,
    clock: &mut f32,
    timeline: &mut Vec<TimelineEntry>,
) {
    let mut waited = 0.0;
    while !driver.is_idle() && waited < MAX_SETTLE_SECS {
        let signals = driver.tick(FRAME_SECS);
        PresentationDriver::apply(engine, &signals);
        *clock += FRAME_SECS;
        waited += FRAME_SECS;
        timeline.extend(signals.into_iter().map(|s| TimelineEntry {
            time: *clock,
            signal: format!("{:?}", s),
        }));
    }
    if waited >= MAX_SETTLE_SECS {
        log::warn!("Presentation did not settle within {}s", MAX_SETTLE_SECS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_clicks_every_slot() {
        let log = run_session(&LotteryConfig::demo().with_seed(1), &SessionPlan::default());
        assert_eq!(log.clicks.len(), 10);
        assert!(log.clicks.iter().all(|c| c.accepted));
        assert_eq!(log.clicks.iter().filter(|c| c.counted).count(), 1);
        assert!(log.clicks.iter().all(|c| !c.jackpot));
        assert!(log.violations.is_empty());
        assert!(log.timeline.is_empty());
    }

    #[test]
    fn test_armed_click_wins() {
        let plan = SessionPlan {
            clicks: vec![4],
            arm_before: Some(0),
            timing: None,
        };
        let log = run_session(&LotteryConfig::demo().with_seed(2), &plan);
        assert!(log.clicks[0].armed);
        assert!(log.clicks[0].jackpot);
        assert_eq!(log.stats.jackpots_won, 1);
        assert!(log.events.iter().any(|e| e["type"] == "JACKPOT_WON"));
    }

    #[test]
    fn test_rejected_click_recorded() {
        let plan = SessionPlan {
            clicks: vec![1, 1, 99],
            ..SessionPlan::default()
        };
        let log = run_session(&LotteryConfig::demo().with_seed(3), &plan);
        let accepted: Vec<bool> = log.clicks.iter().map(|c| c.accepted).collect();
        assert_eq!(accepted, vec![true, false, false]);
    }
}
