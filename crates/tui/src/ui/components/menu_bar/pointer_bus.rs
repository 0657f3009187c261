//! Document-scope pointer-down subscription used for "click outside closes".
//!
//! The menu bar acquires one subscription when mounted and releases it on
//! unmount. The host publishes every pointer-down it sees; each subscriber
//! drains its own inbox and performs its own containment check.

use std::collections::{BTreeMap, VecDeque};

/// A pointer press at a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDown {
    pub column: u16,
    pub row: u16,
}

impl PointerDown {
    pub fn new(column: u16, row: u16) -> Self {
        Self { column, row }
    }
}

/// Handle returned by [`PointerEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Injectable source of document-wide pointer-down events.
pub trait PointerEventBus {
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
    /// Takes every event published since the last drain for `id`.
    fn drain(&mut self, id: SubscriptionId) -> Vec<PointerDown>;
}

/// In-process bus: the host publishes, subscribers drain.
#[derive(Debug, Default)]
pub struct DocumentPointerBus {
    next_id: u64,
    inboxes: BTreeMap<SubscriptionId, VecDeque<PointerDown>>,
}

impl DocumentPointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every live subscription.
    pub fn publish(&mut self, event: PointerDown) {
        for inbox in self.inboxes.values_mut() {
            inbox.push_back(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inboxes.len()
    }
}

impl PointerEventBus for DocumentPointerBus {
    fn subscribe(&mut self) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.inboxes.insert(id, VecDeque::new());
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.inboxes.remove(&id);
    }

    fn drain(&mut self, id: SubscriptionId) -> Vec<PointerDown> {
        self.inboxes.get_mut(&id).map(|inbox| inbox.drain(..).collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_events_reach_only_live_subscribers() {
        let mut bus = DocumentPointerBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();
        bus.publish(PointerDown::new(1, 2));
        bus.unsubscribe(second);
        bus.publish(PointerDown::new(3, 4));

        assert_eq!(bus.drain(first), vec![PointerDown::new(1, 2), PointerDown::new(3, 4)]);
        assert!(bus.drain(first).is_empty());
        assert!(bus.drain(second).is_empty());
        assert_eq!(bus.subscriber_count(), 1);
    }
}
