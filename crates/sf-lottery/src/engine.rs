//! Lottery Engine — prize assignment and jackpot protection
//!
//! The engine is the single writer of the assignment map. Every click runs to
//! completion before the next one is accepted, so relocation and resolution
//! never interleave.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use sf_core::IconId;

use crate::config::{DEFAULT_FILLER_NAME, LotteryConfig};
use crate::error::LotteryError;
use crate::events::{EventBus, LotteryEvent, Subscription};
use crate::prize::{PrizeRecord, SharedPrize};
use crate::shuffle::{SessionRng, fisher_yates, session_rng, shuffled_indices};
use crate::slot::SlotItem;

/// Undrained events kept in the outbox before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 4096;

/// Result of an accepted click
#[derive(Debug, Clone)]
pub struct ClickOutcome {
    /// Clicked slot
    pub index: usize,
    /// Prize the slot shows after protection rules were applied
    pub prize: Option<SharedPrize>,
    /// The click awarded the jackpot
    pub jackpot: bool,
    /// The click counted against the click budget (session was active)
    pub counted: bool,
    /// This click ended the session
    pub completed: bool,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub counted_clicks: u64,
    pub uncounted_clicks: u64,
    pub prizes_resolved: u64,
    pub fillers_resolved: u64,
    pub jackpots_won: u64,
    pub jackpot_relocations: u64,
    pub jackpots_destroyed: u64,
    pub filler_substitutions: u64,
    pub resets: u64,
}

/// Scratch-card lottery engine
///
/// Owns the slots, the prize pool, the index → prize assignment map and the
/// jackpot-protection state machine.
pub struct LotteryEngine {
    /// Slots, indexed by position
    slots: Vec<SlotItem>,
    /// Configured prize pool
    prize_pool: Vec<SharedPrize>,
    /// Cover icon pool
    cover_icons: Vec<IconId>,
    /// Filler label
    filler_name: String,
    /// Filler icon
    filler_icon: Option<IconId>,
    /// Slot index → assigned prize
    assignments: BTreeMap<usize, SharedPrize>,
    /// Slot holding the unclaimed jackpot
    jackpot_index: Option<usize>,
    /// Next click wins the jackpot
    jackpot_armed: bool,
    /// Counted clicks this session
    click_count: u32,
    /// Click budget
    max_clicks: u32,
    /// Session accepts counted clicks
    active: bool,
    /// Shuffle presentation in flight
    shuffling: bool,
    /// Random number generator
    rng: SessionRng,
    /// Observer list
    bus: EventBus,
    /// Events waiting for `drain_events`
    outbox: VecDeque<LotteryEvent>,
    /// Current session stats
    stats: SessionStats,
}

impl LotteryEngine {
    /// Create an empty engine with an entropy-seeded RNG
    pub fn new() -> Self {
        Self::with_rng(session_rng(None))
    }

    /// Create an empty engine with a seeded RNG
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(session_rng(Some(seed)))
    }

    fn with_rng(rng: SessionRng) -> Self {
        Self {
            slots: Vec::new(),
            prize_pool: Vec::new(),
            cover_icons: Vec::new(),
            filler_name: DEFAULT_FILLER_NAME.to_string(),
            filler_icon: None,
            assignments: BTreeMap::new(),
            jackpot_index: None,
            jackpot_armed: false,
            click_count: 0,
            max_clicks: 1,
            active: true,
            shuffling: false,
            rng,
            bus: EventBus::new(),
            outbox: VecDeque::new(),
            stats: SessionStats::default(),
        }
    }

    /// Build and initialize an engine from configuration
    pub fn from_config(config: &LotteryConfig) -> Self {
        let mut engine = Self::with_rng(session_rng(config.seed));
        engine.set_max_clicks(config.max_clicks);
        engine.set_cover_icons(config.cover_icons.clone());
        engine.initialize(
            config.slot_items(),
            config.prize_pool(),
            config.filler.name.clone(),
            config.filler.icon.clone(),
        );
        engine
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the click budget (at least 1)
    pub fn set_max_clicks(&mut self, count: u32) {
        self.max_clicks = count.max(1);
    }

    /// Set the cover icon pool used by the next initialize / reset
    pub fn set_cover_icons(&mut self, icons: Vec<IconId>) {
        self.cover_icons = icons;
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = session_rng(Some(seed));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INITIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Take ownership of the slots and the prize pool and deal a fresh board
    pub fn initialize(
        &mut self,
        mut slots: Vec<SlotItem>,
        prize_pool: Vec<SharedPrize>,
        filler_name: impl Into<String>,
        filler_icon: Option<IconId>,
    ) {
        // Stable layout regardless of the order the host discovered slots in
        slots.sort_by(|a, b| a.name().cmp(b.name()));
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.set_item_index(i);
            slot.reset_state();
        }

        self.slots = slots;
        self.prize_pool = prize_pool;
        self.filler_name = filler_name.into();
        self.filler_icon = filler_icon;
        self.click_count = 0;
        self.active = true;
        self.jackpot_armed = false;
        self.shuffling = false;

        if self.slots.is_empty() {
            log::warn!("Lottery initialized without slots");
        }

        self.assign_random_cover_icons();
        self.assign_random_prizes();
        self.check_invariants("initialize");

        log::info!(
            "Lottery initialized: {} slots, {} pool prizes, max {} clicks",
            self.slots.len(),
            self.prize_pool.len(),
            self.max_clicks
        );
    }

    /// New session on the same slots: counters, cover icons and prizes are re-dealt
    pub fn reset(&mut self) {
        self.click_count = 0;
        self.active = true;
        self.jackpot_armed = false;

        for slot in &mut self.slots {
            slot.reset_state();
        }

        self.assign_random_cover_icons();
        self.assign_random_prizes();
        self.stats.resets += 1;
        self.check_invariants("reset");

        log::debug!("Lottery reset (#{})", self.stats.resets);
    }

    /// Hand out cover icons without repetition; surplus slots keep no cover
    fn assign_random_cover_icons(&mut self) {
        if self.cover_icons.is_empty() {
            return;
        }

        let mut icons = self.cover_icons.clone();
        fisher_yates(&mut icons, &mut self.rng);

        if icons.len() < self.slots.len() {
            log::debug!(
                "{} cover icons for {} slots; {} slots keep no cover",
                icons.len(),
                self.slots.len(),
                self.slots.len() - icons.len()
            );
        }

        for (slot, icon) in self.slots.iter_mut().zip(icons) {
            slot.set_cover_icon(icon);
        }
    }

    fn assign_random_prizes(&mut self) {
        self.assignments.clear();
        self.jackpot_index = None;
        for slot in &mut self.slots {
            slot.clear_prize();
        }

        if self.slots.is_empty() {
            return;
        }

        let (jackpot, mut normal_prizes) = partition_pool(&self.prize_pool);
        let indices = shuffled_indices(self.slots.len(), &mut self.rng);

        // The jackpot sits on a random slot; it can only be won after arming
        let mut start = 0;
        if let Some(jackpot) = jackpot {
            let index = indices[0];
            self.assign(index, jackpot);
            self.jackpot_index = Some(index);
            start = 1;
        }

        fisher_yates(&mut normal_prizes, &mut self.rng);
        if normal_prizes.len() > indices.len() - start {
            log::debug!(
                "{} pool prizes left unassigned",
                normal_prizes.len() - (indices.len() - start)
            );
        }

        let mut normal_prizes = normal_prizes.into_iter();
        for &index in &indices[start..] {
            let prize = normal_prizes
                .next()
                .unwrap_or_else(|| self.synthesize_filler());
            self.assign(index, prize);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLICK HANDLING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Handle a slot activation from the input layer.
    ///
    /// Returns `None` when the click is rejected: unknown index, slot already
    /// clicked, or a shuffle still settling.
    pub fn on_slot_clicked(&mut self, index: usize) -> Option<ClickOutcome> {
        if self.shuffling {
            log::debug!("Click on slot {} ignored: shuffle in progress", index);
            return None;
        }

        let Some(slot) = self.slots.get_mut(index) else {
            log::warn!("Click on unknown slot index {}", index);
            return None;
        };

        if !slot.press() {
            log::debug!("Slot {} already clicked", index);
            return None;
        }

        Some(self.resolve_click(index))
    }

    fn resolve_click(&mut self, index: usize) -> ClickOutcome {
        let was_armed = self.jackpot_armed;

        // Protection runs even after the session has ended
        if was_armed {
            self.relocate_jackpot_to(index);
            self.jackpot_armed = false;
        } else if self.jackpot_index == Some(index) {
            self.relocate_jackpot_away_from(index);
        }

        if !self.active {
            self.stats.uncounted_clicks += 1;
            // Still flipped to Revealing, so the host must present it
            self.emit(LotteryEvent::SlotRevealRequested { index });
            self.check_invariants("inactive click");
            return ClickOutcome {
                index,
                prize: self.assignments.get(&index).cloned(),
                jackpot: false,
                counted: false,
                completed: false,
            };
        }

        self.click_count += 1;
        self.stats.counted_clicks += 1;

        let mut prize = self.assignments.get(&index).cloned();

        // Last line of defense: an unarmed click never resolves to the jackpot
        if !was_armed && prize.as_ref().is_some_and(|p| p.is_jackpot()) {
            log::error!(
                "Unarmed click on slot {} resolved to the jackpot; substituting filler",
                index
            );
            let filler = self.synthesize_filler();
            self.assign(index, filler.clone());
            if self.jackpot_index == Some(index) {
                self.jackpot_index = None;
            }
            self.stats.filler_substitutions += 1;
            prize = Some(filler);
        }

        let jackpot = prize.as_ref().is_some_and(|p| p.is_jackpot());
        if jackpot {
            // Claimed: a later trigger cannot re-arm it
            self.jackpot_index = None;
            self.stats.jackpots_won += 1;
            log::info!("Jackpot won on slot {}", index);
        }

        self.emit(LotteryEvent::SlotClicked { index });

        if let Some(ref p) = prize {
            self.stats.prizes_resolved += 1;
            if p.is_filler() {
                self.stats.fillers_resolved += 1;
            }
            self.emit(LotteryEvent::PrizeResolved {
                index,
                prize: p.clone(),
            });
            if jackpot {
                self.emit(LotteryEvent::JackpotWon { index });
            }
        }

        let completed = self.click_count >= self.max_clicks;
        if completed {
            self.complete_lottery();
        }

        self.check_invariants("click");

        ClickOutcome {
            index,
            prize,
            jackpot,
            counted: true,
            completed,
        }
    }

    /// Swap the jackpot onto `target` so the current click wins it
    fn relocate_jackpot_to(&mut self, target: usize) {
        let Some(from) = self.jackpot_index else {
            log::debug!("Armed click on slot {} but no jackpot remains", target);
            return;
        };

        if !self.assignments.get(&from).is_some_and(|p| p.is_jackpot()) {
            log::warn!("Jackpot index {} is stale; armed click not relocated", from);
            return;
        }

        if from == target {
            return;
        }

        self.swap_assignments(from, target);
        self.jackpot_index = Some(target);
        self.stats.jackpot_relocations += 1;
        log::debug!("Jackpot relocated {} -> {} (armed)", from, target);
        self.emit(LotteryEvent::JackpotRelocated { from, to: target });
    }

    /// Move the jackpot off `clicked` onto the first other unclicked slot,
    /// destroying it when none is left
    fn relocate_jackpot_away_from(&mut self, clicked: usize) {
        let candidate = self
            .slots
            .iter()
            .find(|s| s.index() != clicked && !s.is_clicked())
            .map(SlotItem::index);

        match candidate {
            Some(to) => {
                self.swap_assignments(clicked, to);
                self.jackpot_index = Some(to);
                self.stats.jackpot_relocations += 1;
                log::debug!("Jackpot relocated {} -> {} (unarmed click)", clicked, to);
                self.emit(LotteryEvent::JackpotRelocated { from: clicked, to });
            }
            None => {
                let filler = self.synthesize_filler();
                self.assign(clicked, filler);
                self.jackpot_index = None;
                self.stats.jackpots_destroyed += 1;
                log::info!(
                    "No unclicked slot left for the jackpot; destroyed at slot {}",
                    clicked
                );
                self.emit(LotteryEvent::JackpotDestroyed { at: clicked });
            }
        }
    }

    fn swap_assignments(&mut self, a: usize, b: usize) {
        let prize_a = self
            .assignments
            .remove(&a)
            .unwrap_or_else(|| self.synthesize_filler());
        let prize_b = self
            .assignments
            .remove(&b)
            .unwrap_or_else(|| self.synthesize_filler());
        self.assign(a, prize_b);
        self.assign(b, prize_a);
    }

    fn assign(&mut self, index: usize, prize: SharedPrize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.set_prize(prize.clone());
            self.assignments.insert(index, prize);
        } else {
            log::warn!("Assignment to unknown slot {} skipped", index);
        }
    }

    fn synthesize_filler(&self) -> SharedPrize {
        PrizeRecord::filler(self.filler_name.clone(), self.filler_icon.clone()).shared()
    }

    fn complete_lottery(&mut self) {
        self.active = false;
        log::info!("Lottery complete after {} clicks", self.click_count);
        self.emit(LotteryEvent::LotteryComplete {
            clicks: self.click_count,
        });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // JACKPOT TRIGGER
    // ═══════════════════════════════════════════════════════════════════════════

    /// Arm the jackpot: the next click wins it, wherever it lands.
    ///
    /// Reactivates an ended session without touching click counts or slot
    /// states. Returns false (and does nothing) when no unclaimed jackpot
    /// remains.
    pub fn trigger_jackpot(&mut self) -> bool {
        let Some(index) = self.jackpot_index else {
            log::debug!("Jackpot trigger ignored: no unclaimed jackpot");
            return false;
        };

        if !self.assignments.get(&index).is_some_and(|p| p.is_jackpot()) {
            log::debug!("Jackpot trigger ignored: slot {} no longer holds it", index);
            return false;
        }

        if !self.active {
            self.active = true;
            log::info!("Session reactivated by jackpot trigger");
        }

        self.jackpot_armed = true;
        log::debug!("Jackpot armed");
        true
    }

    /// Disarm the jackpot trigger
    pub fn cancel_jackpot_trigger(&mut self) {
        self.jackpot_armed = false;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PRESENTATION HOOKS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start of the scatter/return shuffle; clicks are rejected until it completes
    pub fn begin_shuffle(&mut self) -> bool {
        if self.shuffling {
            return false;
        }
        self.shuffling = true;
        true
    }

    /// Shuffle settled; clicks are accepted again
    pub fn complete_shuffle(&mut self) {
        if !self.shuffling {
            return;
        }
        self.shuffling = false;
        self.emit(LotteryEvent::ShuffleComplete);
    }

    /// Reveal presentation finished for a slot (Revealing → Revealed)
    pub fn mark_revealed(&mut self, index: usize) -> bool {
        self.slots
            .get_mut(index)
            .is_some_and(|slot| slot.finish_reveal())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register an event listener
    #[must_use = "dropping the Subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&LotteryEvent) + Send + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<LotteryEvent> {
        self.outbox.drain(..).collect()
    }

    fn emit(&mut self, event: LotteryEvent) {
        self.bus.publish(&event);
        if self.outbox.len() >= MAX_PENDING_EVENTS {
            log::warn!("Event outbox full; dropping oldest event");
            self.outbox.pop_front();
        }
        self.outbox.push_back(event);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn slots(&self) -> &[SlotItem] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotItem> {
        self.slots.get(index)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn prize_at(&self, index: usize) -> Option<&SharedPrize> {
        self.assignments.get(&index)
    }

    /// Assignment map in index order
    pub fn assignments(&self) -> impl Iterator<Item = (usize, &SharedPrize)> {
        self.assignments.iter().map(|(i, p)| (*i, p))
    }

    /// Slot holding the unclaimed jackpot
    pub fn jackpot_index(&self) -> Option<usize> {
        self.jackpot_index
    }

    /// Slot whose assignment is the jackpot, claimed or not
    pub fn jackpot_holder(&self) -> Option<usize> {
        self.assignments
            .iter()
            .find(|(_, p)| p.is_jackpot())
            .map(|(i, _)| *i)
    }

    pub fn is_jackpot_armed(&self) -> bool {
        self.jackpot_armed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn max_clicks(&self) -> u32 {
        self.max_clicks
    }

    pub fn remaining_clicks(&self) -> u32 {
        self.max_clicks.saturating_sub(self.click_count)
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INVARIANTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Check every class invariant
    pub fn validate(&self) -> Result<(), LotteryError> {
        let n = self.slots.len();

        if let Some(&index) = self.assignments.keys().find(|&&i| i >= n) {
            return Err(LotteryError::UnknownSlot(index));
        }

        for slot in &self.slots {
            let index = slot.index();
            let Some(assigned) = self.assignments.get(&index) else {
                return Err(LotteryError::MissingAssignment(index));
            };
            if !slot.prize().is_some_and(|p| PrizeRecord::same(p, assigned)) {
                return Err(LotteryError::SlotOutOfSync(index));
            }
        }

        let holders: Vec<usize> = self
            .assignments
            .iter()
            .filter(|(_, p)| p.is_jackpot())
            .map(|(i, _)| *i)
            .collect();
        if holders.len() > 1 {
            return Err(LotteryError::MultipleJackpots(holders));
        }

        match (self.jackpot_index, holders.first()) {
            (Some(index), Some(&holder)) => {
                let clicked = self.slots.get(index).is_none_or(SlotItem::is_clicked);
                if index != holder || clicked {
                    return Err(LotteryError::StaleJackpotIndex(index));
                }
            }
            (Some(index), None) => return Err(LotteryError::StaleJackpotIndex(index)),
            (None, Some(&holder)) => {
                if self.slots.get(holder).is_some_and(|s| !s.is_clicked()) {
                    return Err(LotteryError::UntrackedJackpot(holder));
                }
            }
            (None, None) => {}
        }

        if self.jackpot_armed && !self.active {
            return Err(LotteryError::ArmedWhileInactive);
        }

        Ok(())
    }

    fn check_invariants(&self, context: &str) {
        if let Err(e) = self.validate() {
            log::error!("Lottery invariant violated after {}: {}", context, e);
        }
    }
}

impl Default for LotteryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LotteryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryEngine")
            .field("slots", &self.slots.len())
            .field("jackpot_index", &self.jackpot_index)
            .field("jackpot_armed", &self.jackpot_armed)
            .field("click_count", &self.click_count)
            .field("max_clicks", &self.max_clicks)
            .field("active", &self.active)
            .field("shuffling", &self.shuffling)
            .finish()
    }
}

/// Split the pool into the jackpot (first one wins) and the regular prizes
fn partition_pool(pool: &[SharedPrize]) -> (Option<SharedPrize>, Vec<SharedPrize>) {
    let mut jackpot: Option<SharedPrize> = None;
    let mut normal = Vec::with_capacity(pool.len());

    for prize in pool {
        if !prize.is_jackpot() {
            normal.push(prize.clone());
        } else if jackpot.is_none() {
            jackpot = Some(prize.clone());
        } else {
            log::warn!("Extra jackpot '{}' in prize pool dropped", prize.name());
        }
    }

    (jackpot, normal)
}
