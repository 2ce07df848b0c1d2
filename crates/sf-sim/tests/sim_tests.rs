//! Simulator Integration Tests
//!
//! Scripted sessions with the presentation layer attached, config files on
//! disk, and audit runs over non-demo boards.

use sf_lottery::{LotteryConfig, PrizeKind, PrizeSpec, grid_layout};
use sf_present::PresentationTiming;
use sf_sim::{AuditOptions, SessionPlan, run_audit, run_session};

// ═══════════════════════════════════════════════════════════════════════════════
// ANIMATED SESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_animated_session_records_timeline() {
    let plan = SessionPlan {
        clicks: vec![0, 5],
        arm_before: None,
        timing: Some(PresentationTiming::turbo()),
    };
    let config = LotteryConfig::demo().with_seed(11).with_max_clicks(2);
    let log = run_session(&config, &plan);

    let revealed: Vec<&str> = log
        .timeline
        .iter()
        .filter(|e| e.signal.starts_with("SlotRevealed"))
        .map(|e| e.signal.as_str())
        .collect();
    assert_eq!(revealed, vec!["SlotRevealed(0)", "SlotRevealed(5)"]);
    assert!(log.timeline.windows(2).all(|w| w[0].time <= w[1].time));
    assert!(log.violations.is_empty());
}

#[test]
fn test_animated_jackpot_runs_celebration() {
    let plan = SessionPlan {
        clicks: vec![3],
        arm_before: Some(0),
        timing: Some(PresentationTiming::studio()),
    };
    let log = run_session(&LotteryConfig::demo().with_seed(12), &plan);

    assert!(log.clicks[0].jackpot);
    let signals: Vec<&str> = log.timeline.iter().map(|e| e.signal.as_str()).collect();
    assert!(signals.contains(&"SlotRevealed(3)"));
    assert!(signals.contains(&"Celebration(ProgressComplete)"));
    assert!(signals.contains(&"Celebration(Completed)"));
}

#[test]
fn test_session_log_serializes() {
    let log = run_session(&LotteryConfig::demo().with_seed(13), &SessionPlan::default());
    let json = serde_json::to_value(&log).unwrap();
    assert_eq!(json["seed"], 13);
    assert_eq!(json["slots"], 10);
    assert!(json.get("timeline").is_none());
    assert_eq!(json["stats"]["counted_clicks"], 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG FILES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_yaml_config_from_disk() {
    let dir = std::env::temp_dir().join(format!("sf-sim-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("board.yaml");
    let yaml = serde_yml::to_string(&LotteryConfig::demo().with_max_clicks(3)).unwrap();
    std::fs::write(&path, yaml).unwrap();

    let config = LotteryConfig::load(&path).unwrap();
    assert_eq!(config.max_clicks, 3);
    assert_eq!(config.slots.len(), 10);

    let log = run_session(&config.with_seed(4), &SessionPlan::default());
    assert_eq!(log.clicks.iter().filter(|c| c.counted).count(), 3);

    std::fs::remove_dir_all(&dir).ok();
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUDIT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_audit_large_board() {
    let config = LotteryConfig {
        max_clicks: 5,
        slots: grid_layout(8, 6, 1.0),
        prizes: vec![
            PrizeSpec::new("Grand", PrizeKind::Jackpot),
            PrizeSpec::new("Silver", PrizeKind::Normal),
            PrizeSpec::new("Bronze", PrizeKind::Normal),
        ],
        ..LotteryConfig::default()
    };
    let options = AuditOptions {
        sessions: 300,
        seed: 99,
        arm_rate: 1.0,
        threads: 4,
    };
    let report = run_audit(&config, &options).unwrap();

    assert!(report.is_clean(), "{:?}", report.violation_samples);
    assert_eq!(report.clicks, 300 * 48);
    assert_eq!(report.arms + report.destroyed, 300);
    assert_eq!(report.armed_wins, report.arms);
}

#[test]
fn test_audit_rejects_invalid_config() {
    let config = LotteryConfig {
        prizes: vec![
            PrizeSpec::new("A", PrizeKind::Jackpot),
            PrizeSpec::new("B", PrizeKind::Jackpot),
        ],
        ..LotteryConfig::demo()
    };
    assert!(run_audit(&config, &AuditOptions::default()).is_err());
}
