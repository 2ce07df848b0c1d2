//! Lottery events and the observer bus
//!
//! Listeners are registered on an [`EventBus`] and receive every event
//! synchronously, in emission order. `subscribe` returns a [`Subscription`]
//! handle; dropping it (or calling `unsubscribe`) removes the listener.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::json;

use crate::prize::SharedPrize;

/// Event emitted by the lottery engine
#[derive(Debug, Clone)]
pub enum LotteryEvent {
    /// A slot click was accepted and counted
    SlotClicked { index: usize },
    /// The prize awarded for a counted click
    PrizeResolved { index: usize, prize: SharedPrize },
    /// The jackpot was awarded (always after an explicit trigger)
    JackpotWon { index: usize },
    /// A click after the session ended: reveal the slot, nothing was awarded
    SlotRevealRequested { index: usize },
    /// Click budget exhausted
    LotteryComplete { clicks: u32 },
    /// Scatter/return shuffle presentation settled
    ShuffleComplete,
    /// The jackpot moved between slots
    JackpotRelocated { from: usize, to: usize },
    /// No unclicked slot was left to hold the jackpot
    JackpotDestroyed { at: usize },
}

impl LotteryEvent {
    /// Canonical event name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SlotClicked { .. } => "SLOT_CLICKED",
            Self::PrizeResolved { .. } => "PRIZE_RESOLVED",
            Self::SlotRevealRequested { .. } => "SLOT_REVEAL_REQUESTED",
            Self::JackpotWon { .. } => "JACKPOT_WON",
            Self::LotteryComplete { .. } => "LOTTERY_COMPLETE",
            Self::ShuffleComplete => "SHUFFLE_COMPLETE",
            Self::JackpotRelocated { .. } => "JACKPOT_RELOCATED",
            Self::JackpotDestroyed { .. } => "JACKPOT_DESTROYED",
        }
    }

    /// Slot the event refers to, if any
    pub fn slot_index(&self) -> Option<usize> {
        match self {
            Self::SlotClicked { index }
            | Self::PrizeResolved { index, .. }
            | Self::SlotRevealRequested { index }
            | Self::JackpotWon { index } => Some(*index),
            Self::JackpotRelocated { to, .. } => Some(*to),
            Self::JackpotDestroyed { at } => Some(*at),
            Self::LotteryComplete { .. } | Self::ShuffleComplete => None,
        }
    }

    /// JSON form for logs and the simulator's event dump
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::SlotClicked { index } => json!({ "type": self.type_name(), "index": index }),
            Self::PrizeResolved { index, prize } => json!({
                "type": self.type_name(),
                "index": index,
                "prize": prize.name(),
                "kind": prize.kind(),
                "icon": prize.icon(),
            }),
            Self::SlotRevealRequested { index } | Self::JackpotWon { index } => {
                json!({ "type": self.type_name(), "index": index })
            }
            Self::LotteryComplete { clicks } => json!({ "type": self.type_name(), "clicks": clicks }),
            Self::ShuffleComplete => json!({ "type": self.type_name() }),
            Self::JackpotRelocated { from, to } => {
                json!({ "type": self.type_name(), "from": from, "to": to })
            }
            Self::JackpotDestroyed { at } => json!({ "type": self.type_name(), "at": at }),
        }
    }
}

type Listener = Box<dyn FnMut(&LotteryEvent) + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Set while listeners are taken out for dispatch
    dispatching: bool,
    /// Ids unsubscribed during dispatch
    removed: Vec<u64>,
}

/// Observer list for lottery events
#[derive(Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The listener stays registered while the returned
    /// handle is alive.
    #[must_use = "dropping the Subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&LotteryEvent) + Send + 'static,
    {
        let mut reg = self.registry.lock();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every listener
    pub fn publish(&self, event: &LotteryEvent) {
        // Listeners run without the lock held so they may subscribe or drop
        // their own handles.
        let mut taken = {
            let mut reg = self.registry.lock();
            if reg.dispatching {
                log::warn!("nested publish of {} ignored", event.type_name());
                return;
            }
            reg.dispatching = true;
            std::mem::take(&mut reg.listeners)
        };

        for (id, listener) in taken.iter_mut() {
            if self.registry.lock().removed.contains(id) {
                continue;
            }
            listener(event);
        }

        let mut reg = self.registry.lock();
        reg.dispatching = false;
        let removed = std::mem::take(&mut reg.removed);
        taken.retain(|(id, _)| !removed.contains(id));
        taken.append(&mut reg.listeners);
        reg.listeners = taken;
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Disposable listener handle
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    fn remove(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut reg = registry.lock();
        if let Some(pos) = reg.listeners.iter().position(|(id, _)| *id == self.id) {
            reg.listeners.remove(pos);
        } else if reg.dispatching {
            reg.removed.push(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_publish() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = bus.subscribe(move |e| {
            if matches!(e, LotteryEvent::ShuffleComplete) {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        bus.publish(&LotteryEvent::ShuffleComplete);
        bus.publish(&LotteryEvent::SlotClicked { index: 2 });
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&LotteryEvent::ShuffleComplete);
        sub.unsubscribe();
        bus.publish(&LotteryEvent::ShuffleComplete);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_drop_own_handle_during_dispatch() {
        let bus = EventBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let count = Arc::new(AtomicUsize::new(0));

        let s = slot.clone();
        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            s.lock().take();
        });
        *slot.lock() = Some(sub);

        bus.publish(&LotteryEvent::ShuffleComplete);
        bus.publish(&LotteryEvent::ShuffleComplete);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn test_event_json() {
        let e = LotteryEvent::JackpotRelocated { from: 1, to: 4 };
        let v = e.to_json();
        assert_eq!(v["type"], "JACKPOT_RELOCATED");
        assert_eq!(v["to"], 4);
        assert_eq!(e.slot_index(), Some(4));
    }
}
