//! Slot items — one concealed grid cell
//!
//! A slot never decides its own prize. The engine is the single writer of the
//! assigned prize and cover icon; the slot only flips its own reveal state when
//! pressed.

use serde::{Deserialize, Serialize};
use sf_core::{IconId, Vec2};

use crate::prize::SharedPrize;

/// Reveal state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    /// Concealed, clickable
    #[default]
    Covered,
    /// Clicked; reveal presentation in progress
    Revealing,
    /// Fully revealed
    Revealed,
}

/// One clickable slot
#[derive(Debug, Clone)]
pub struct SlotItem {
    index: usize,
    name: String,
    anchor: Vec2,
    cover_icon: Option<IconId>,
    prize: Option<SharedPrize>,
    state: RevealState,
}

impl SlotItem {
    /// Create a slot with a host label and its resting (pre-shuffle) position
    pub fn new(name: impl Into<String>, anchor: Vec2) -> Self {
        Self {
            index: 0,
            name: name.into(),
            anchor,
            cover_icon: None,
            prize: None,
            state: RevealState::Covered,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn cover_icon(&self) -> Option<&IconId> {
        self.cover_icon.as_ref()
    }

    pub fn prize(&self) -> Option<&SharedPrize> {
        self.prize.as_ref()
    }

    /// Label of the assigned prize, falling back to the slot name
    pub fn prize_name(&self) -> &str {
        self.prize.as_ref().map_or(self.name.as_str(), |p| p.name())
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_clicked(&self) -> bool {
        self.state != RevealState::Covered
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENGINE-DRIVEN MUTATORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn set_item_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_prize(&mut self, prize: SharedPrize) {
        self.prize = Some(prize);
    }

    pub(crate) fn clear_prize(&mut self) {
        self.prize = None;
    }

    pub(crate) fn set_cover_icon(&mut self, icon: IconId) {
        self.cover_icon = Some(icon);
    }

    pub(crate) fn reset_state(&mut self) {
        self.state = RevealState::Covered;
    }

    /// Covered → Revealing. Returns false if the slot was already clicked.
    pub(crate) fn press(&mut self) -> bool {
        if self.state != RevealState::Covered {
            return false;
        }
        self.state = RevealState::Revealing;
        true
    }

    /// Revealing → Revealed
    pub(crate) fn finish_reveal(&mut self) -> bool {
        if self.state != RevealState::Revealing {
            return false;
        }
        self.state = RevealState::Revealed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prize::PrizeRecord;

    #[test]
    fn test_press_only_once() {
        let mut slot = SlotItem::new("slot_00", Vec2::ZERO);
        assert!(!slot.is_clicked());
        assert!(slot.press());
        assert_eq!(slot.state(), RevealState::Revealing);
        assert!(!slot.press());
        assert!(slot.finish_reveal());
        assert_eq!(slot.state(), RevealState::Revealed);
        assert!(!slot.press());
        assert!(!slot.finish_reveal());
    }

    #[test]
    fn test_finish_requires_revealing() {
        let mut slot = SlotItem::new("slot_00", Vec2::ZERO);
        assert!(!slot.finish_reveal());
        assert_eq!(slot.state(), RevealState::Covered);
    }

    #[test]
    fn test_reset_state_keeps_prize_and_index() {
        let mut slot = SlotItem::new("slot_03", Vec2::new(1.0, 2.0));
        slot.set_item_index(3);
        slot.set_prize(PrizeRecord::new("Mug", None).shared());
        slot.press();
        slot.reset_state();
        assert_eq!(slot.state(), RevealState::Covered);
        assert_eq!(slot.index(), 3);
        assert_eq!(slot.prize_name(), "Mug");
        assert_eq!(slot.anchor(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_prize_name_falls_back_to_slot_name() {
        let slot = SlotItem::new("slot_07", Vec2::ZERO);
        assert_eq!(slot.prize_name(), "slot_07");
    }
}
