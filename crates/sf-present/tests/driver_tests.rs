//! Presentation Driver Integration Tests
//!
//! Engine events flowing into reveals, shuffles and the celebration panel,
//! and milestones flowing back into the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sf_lottery::{LotteryConfig, LotteryEngine, RevealState};
use sf_present::{
    CelebrationConfig, CelebrationSignal, CelebrationStage, DriverSignal, PresentationDriver,
    PresentationTiming, VideoClip,
};

const FRAME: f32 = 1.0 / 64.0;

fn engine() -> LotteryEngine {
    LotteryEngine::from_config(&LotteryConfig::demo().with_seed(77))
}

fn plain_slot(engine: &LotteryEngine) -> usize {
    engine
        .assignments()
        .find(|(_, p)| p.is_filler())
        .map(|(i, _)| i)
        .expect("filler slot")
}

fn run_frames(
    driver: &mut PresentationDriver,
    engine: &mut LotteryEngine,
    seconds: f32,
) -> Vec<DriverSignal> {
    let frames = (seconds / FRAME).ceil() as usize;
    (0..frames)
        .flat_map(|_| driver.update(engine, FRAME))
        .collect()
}

#[test]
fn test_click_reveals_slot() {
    let mut engine = engine();
    let mut driver = PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default());
    let slot = plain_slot(&engine);

    engine.on_slot_clicked(slot);
    assert_eq!(engine.slot(slot).unwrap().state(), RevealState::Revealing);

    let signals = driver.update(&mut engine, FRAME);
    assert!(signals.is_empty());
    let reveal = driver.reveal(slot).expect("reveal running");
    assert!(reveal.scale() < 1.0);

    let signals = run_frames(&mut driver, &mut engine, 1.0);
    assert_eq!(signals, vec![DriverSignal::SlotRevealed(slot)]);
    assert_eq!(engine.slot(slot).unwrap().state(), RevealState::Revealed);
    assert!(driver.is_idle());
}

#[test]
fn test_jackpot_celebration_waits_for_reveal() {
    let mut engine = engine();
    let mut driver = PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default());
    let slot = plain_slot(&engine);

    assert!(engine.trigger_jackpot());
    engine.on_slot_clicked(slot);
    driver.update(&mut engine, FRAME);

    assert!(driver.has_pending_celebration());
    assert_eq!(driver.celebration().stage(), CelebrationStage::Hidden);

    let signals = run_frames(&mut driver, &mut engine, 0.75);
    assert!(signals.contains(&DriverSignal::SlotRevealed(slot)));
    assert!(!driver.has_pending_celebration());
    assert!(driver.celebration().is_showing());

    let signals = run_frames(&mut driver, &mut engine, 20.0);
    assert!(signals.contains(&DriverSignal::Celebration(CelebrationSignal::ProgressComplete)));
    assert!(signals.contains(&DriverSignal::Celebration(CelebrationSignal::Completed)));
    assert_eq!(driver.celebration().stage(), CelebrationStage::Shown);
    assert_eq!(
        driver.celebration().visible_title(),
        sf_present::DEFAULT_CELEBRATION_TITLE
    );
}

#[test]
fn test_studio_timing_completes_in_one_frame() {
    let mut engine = engine();
    let config = CelebrationConfig {
        clips: vec![VideoClip::new("fanfare", Some(0.0))],
        ..CelebrationConfig::default()
    };
    let mut driver = PresentationDriver::new(PresentationTiming::studio(), config);
    let slot = plain_slot(&engine);

    engine.trigger_jackpot();
    engine.on_slot_clicked(slot);
    let signals = driver.update(&mut engine, 0.0);

    assert_eq!(signals[0], DriverSignal::SlotRevealed(slot));
    assert_eq!(
        signals.last(),
        Some(&DriverSignal::Celebration(CelebrationSignal::Completed))
    );
    assert!(signals.contains(&DriverSignal::Celebration(CelebrationSignal::VideoComplete)));
    assert_eq!(engine.slot(slot).unwrap().state(), RevealState::Revealed);
}

#[test]
fn test_shuffle_gates_engine_until_settled() {
    let mut engine = engine();
    let mut driver =
        PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default())
            .with_seed(3);

    assert!(driver.begin_shuffle(&mut engine));
    assert!(!driver.begin_shuffle(&mut engine));
    assert!(engine.is_shuffling());
    assert!(engine.on_slot_clicked(0).is_none());

    let total = driver.timing().shuffle_duration(engine.slot_count());
    let signals = run_frames(&mut driver, &mut engine, total + 0.1);
    assert_eq!(signals, vec![DriverSignal::ShuffleSettled]);
    assert!(!engine.is_shuffling());
    assert!(driver.shuffle().is_none());

    // ShuffleComplete is consumed on the next frame without side effects
    driver.update(&mut engine, FRAME);
    assert!(engine.on_slot_clicked(0).is_some());
}

#[test]
fn test_duplicate_reveal_ignored() {
    let mut driver = PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default());
    assert!(driver.reveal_slot(2));
    assert!(!driver.reveal_slot(2));
}

#[test]
fn test_hide_celebration_mid_show() {
    let mut engine = engine();
    let mut driver = PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default());

    engine.trigger_jackpot();
    engine.on_slot_clicked(plain_slot(&engine));
    run_frames(&mut driver, &mut engine, 2.0);
    assert!(driver.celebration().is_showing());

    driver.celebration_mut().hide();
    let signals = run_frames(&mut driver, &mut engine, 1.0);
    assert_eq!(
        signals,
        vec![DriverSignal::Celebration(CelebrationSignal::Hidden)]
    );
    assert!(driver.is_idle());
}

#[test]
fn test_click_after_completion_still_reveals() {
    let mut engine = engine();
    let mut driver = PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default());
    let first = plain_slot(&engine);

    engine.on_slot_clicked(first);
    run_frames(&mut driver, &mut engine, 2.0);
    assert!(!engine.is_active());

    let second = (0..engine.slot_count())
        .find(|&i| !engine.slot(i).unwrap().is_clicked())
        .expect("unclicked slot");
    let outcome = engine.on_slot_clicked(second).expect("accepted");
    assert!(!outcome.counted);

    let signals = run_frames(&mut driver, &mut engine, 2.0);
    assert_eq!(signals, vec![DriverSignal::SlotRevealed(second)]);
    assert_eq!(engine.slot(second).unwrap().state(), RevealState::Revealed);
    assert!(driver.is_idle());
}

#[test]
fn test_reset_mid_shuffle_waits_for_settle() {
    let mut engine = engine();
    let mut driver =
        PresentationDriver::new(PresentationTiming::normal(), CelebrationConfig::default())
            .with_seed(5);

    assert!(driver.begin_shuffle(&mut engine));
    driver.update(&mut engine, 0.1);
    engine.reset();
    assert!(engine.is_shuffling());
    assert!(engine.on_slot_clicked(0).is_none());

    let total = driver.timing().shuffle_duration(engine.slot_count());
    let signals = run_frames(&mut driver, &mut engine, total);
    assert!(signals.contains(&DriverSignal::ShuffleSettled));
    assert!(!engine.is_shuffling());
    assert!(engine.on_slot_clicked(0).is_some());
}

#[test]
fn test_host_celebration_callback() {
    let mut engine = engine();
    let mut driver = PresentationDriver::new(PresentationTiming::studio(), CelebrationConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    driver.on_celebration_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    engine.trigger_jackpot();
    engine.on_slot_clicked(plain_slot(&engine));
    let signals = driver.update(&mut engine, 0.0);

    assert!(signals.contains(&DriverSignal::Celebration(CelebrationSignal::Completed)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
