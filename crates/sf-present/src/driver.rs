//! Presentation driver
//!
//! Turns lottery events into running animations and reports, per frame, the
//! milestones the engine needs to hear about (slot revealed, shuffle settled).

use std::collections::BTreeMap;
use std::sync::Arc;

use sf_core::Vec2;
use sf_lottery::{LotteryEngine, LotteryEvent, SessionRng, session_rng};

use crate::celebration::{CelebrationConfig, CelebrationSequencer, CelebrationSignal};
use crate::reveal::SlotReveal;
use crate::scatter::ShuffleAnimation;
use crate::timing::PresentationTiming;

/// Milestone reported by `PresentationDriver::tick`
#[derive(Debug, Clone, PartialEq)]
pub enum DriverSignal {
    /// Reveal animation finished; the host should call `mark_revealed`
    SlotRevealed(usize),
    /// Shuffle settled; the host should call `complete_shuffle`
    ShuffleSettled,
    Celebration(CelebrationSignal),
}

type CompletionHook = Arc<dyn Fn() + Send + Sync>;

/// Owns every presentation animation of one board
pub struct PresentationDriver {
    timing: PresentationTiming,
    reveals: BTreeMap<usize, SlotReveal>,
    shuffle: Option<ShuffleAnimation>,
    celebration: CelebrationSequencer,
    /// Slot whose reveal gates the celebration
    pending_celebration: Option<usize>,
    /// Host `on_complete`, handed to every celebration the driver starts
    on_celebration_complete: Option<CompletionHook>,
    rng: SessionRng,
}

impl PresentationDriver {
    pub fn new(timing: PresentationTiming, celebration: CelebrationConfig) -> Self {
        Self {
            celebration: CelebrationSequencer::new(celebration, timing.clone()),
            timing,
            reveals: BTreeMap::new(),
            shuffle: None,
            pending_celebration: None,
            on_celebration_complete: None,
            rng: session_rng(None),
        }
    }

    /// Seed the scatter RNG for reproducible shuffles
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = session_rng(Some(seed));
        self
    }

    /// Callback run each time a driver-started celebration completes
    pub fn on_celebration_complete<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_celebration_complete = Some(Arc::new(callback));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn handle_event(&mut self, event: &LotteryEvent) {
        match event {
            LotteryEvent::PrizeResolved { index, prize } => {
                log::debug!("Revealing slot {} ({})", index, prize);
                self.reveal_slot(*index);
            }
            LotteryEvent::SlotRevealRequested { index } => {
                log::debug!("Revealing slot {} (session over)", index);
                self.reveal_slot(*index);
            }
            LotteryEvent::JackpotWon { index } => {
                if self.reveals.contains_key(index) {
                    self.pending_celebration = Some(*index);
                } else {
                    self.start_celebration();
                }
            }
            other => log::trace!("Presentation ignores {}", other.type_name()),
        }
    }

    /// Start the reveal for a slot; false if one is already running
    pub fn reveal_slot(&mut self, index: usize) -> bool {
        if self.reveals.contains_key(&index) {
            return false;
        }
        self.reveals.insert(index, SlotReveal::new(index, &self.timing));
        true
    }

    /// Start a shuffle over the given anchors, replacing any running one
    pub fn start_shuffle(&mut self, anchors: Vec<Vec2>) {
        self.shuffle = Some(ShuffleAnimation::new(anchors, &self.timing, &mut self.rng));
    }

    /// Gate the engine and start the shuffle over its slot anchors
    pub fn begin_shuffle(&mut self, engine: &mut LotteryEngine) -> bool {
        if !engine.begin_shuffle() {
            return false;
        }
        let anchors = engine.slots().iter().map(|s| s.anchor()).collect();
        self.start_shuffle(anchors);
        true
    }

    /// Drain the engine's pending events into the driver
    pub fn consume(&mut self, engine: &mut LotteryEngine) -> usize {
        let events = engine.drain_events();
        for event in &events {
            self.handle_event(event);
        }
        events.len()
    }

    fn start_celebration(&mut self) {
        self.pending_celebration = None;
        let title = self.celebration.config().title.clone();
        let hook = self.on_celebration_complete.clone();
        self.celebration.show(title, move || {
            log::debug!("Celebration callback fired");
            if let Some(hook) = hook {
                hook();
            }
        });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME CLOCK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance every animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<DriverSignal> {
        let mut signals = Vec::new();

        let mut revealed = Vec::new();
        for (index, reveal) in self.reveals.iter_mut() {
            if reveal.tick(dt) {
                revealed.push(*index);
            }
        }
        for index in revealed {
            self.reveals.remove(&index);
            signals.push(DriverSignal::SlotRevealed(index));
            if self.pending_celebration == Some(index) {
                self.start_celebration();
            }
        }

        if let Some(shuffle) = self.shuffle.as_mut() {
            if shuffle.tick(dt) || shuffle.is_settled() {
                self.shuffle = None;
                signals.push(DriverSignal::ShuffleSettled);
            }
        }

        signals.extend(
            self.celebration
                .tick(dt)
                .into_iter()
                .map(DriverSignal::Celebration),
        );
        signals
    }

    /// Report finished reveals and shuffles back to the engine
    pub fn apply(engine: &mut LotteryEngine, signals: &[DriverSignal]) {
        for signal in signals {
            match signal {
                DriverSignal::SlotRevealed(index) => {
                    engine.mark_revealed(*index);
                }
                DriverSignal::ShuffleSettled => engine.complete_shuffle(),
                DriverSignal::Celebration(_) => {}
            }
        }
    }

    /// One frame: consume events, advance, report back
    pub fn update(&mut self, engine: &mut LotteryEngine, dt: f32) -> Vec<DriverSignal> {
        self.consume(engine);
        let signals = self.tick(dt);
        Self::apply(engine, &signals);
        signals
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn reveal(&self, index: usize) -> Option<&SlotReveal> {
        self.reveals.get(&index)
    }

    pub fn shuffle(&self) -> Option<&ShuffleAnimation> {
        self.shuffle.as_ref()
    }

    pub fn celebration(&self) -> &CelebrationSequencer {
        &self.celebration
    }

    pub fn celebration_mut(&mut self) -> &mut CelebrationSequencer {
        &mut self.celebration
    }

    pub fn timing(&self) -> &PresentationTiming {
        &self.timing
    }

    pub fn has_pending_celebration(&self) -> bool {
        self.pending_celebration.is_some()
    }

    /// No reveal, shuffle or celebration in flight
    pub fn is_idle(&self) -> bool {
        self.reveals.is_empty()
            && self.shuffle.is_none()
            && self.pending_celebration.is_none()
            && !self.celebration.is_showing()
    }
}

impl std::fmt::Debug for PresentationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationDriver")
            .field("reveals", &self.reveals.len())
            .field("shuffling", &self.shuffle.is_some())
            .field("pending_celebration", &self.pending_celebration)
            .field("celebration", &self.celebration)
            .finish()
    }
}
