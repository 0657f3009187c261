//! Open/closed state machine for the "More" dropdown.

use menubar_types::{ItemId, MenuItem};
use ratatui::layout::{Position, Rect};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownPhase {
    #[default]
    Closed,
    Open,
}

/// Why the dropdown closed. Decides whether focus returns to the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// `Escape` pressed inside the dropdown.
    Escape,
    /// `Tab` pressed inside the dropdown; default tab order continues.
    Tab,
    /// Pointer pressed outside the menu bar's rendering root.
    OutsidePointer,
    /// A proxy entry was activated.
    Activation { keyboard: bool },
    /// The toggle control was activated while open.
    Toggle { keyboard: bool },
    /// A layout pass left nothing overflowed.
    OverflowCleared,
    /// The menu bar was unmounted or the overflow feature disabled.
    Detached,
}

impl CloseReason {
    pub fn returns_focus_to_toggle(self) -> bool {
        match self {
            CloseReason::Escape => true,
            CloseReason::Activation { keyboard } | CloseReason::Toggle { keyboard } => keyboard,
            CloseReason::Tab | CloseReason::OutsidePointer | CloseReason::OverflowCleared | CloseReason::Detached => false,
        }
    }
}

/// Dropdown stand-in for an overflowed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntry {
    pub item: ItemId,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

impl From<&MenuItem> for ProxyEntry {
    fn from(item: &MenuItem) -> Self {
        Self {
            item: item.id,
            label: item.label.clone(),
            disabled: item.disabled,
            selected: item.selected,
        }
    }
}

/// Result of a close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    pub reason: CloseReason,
    pub focus_toggle: bool,
}

/// Dropdown controller state. Entries exist only while open.
#[derive(Debug, Default, Clone)]
pub struct DropdownState {
    phase: DropdownPhase,
    entries: Vec<ProxyEntry>,
    active: Option<usize>,
    /// Last rendered toggle control area; the dropdown anchors below it.
    pub anchor: Option<Rect>,
    /// Last rendered popup area, including borders.
    pub area: Option<Rect>,
    /// Last rendered per-entry rows for hit testing.
    pub entry_areas: Vec<Rect>,
}

impl DropdownState {
    pub fn phase(&self) -> DropdownPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == DropdownPhase::Open
    }

    pub fn entries(&self) -> &[ProxyEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ProxyEntry> {
        self.entries.get(index)
    }

    /// Index of the entry holding dropdown focus.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index.filter(|i| *i < self.entries.len());
    }

    /// Opens over `overflowed`. A no-op when nothing overflows or when already
    /// open. Returns `true` on a Closed → Open transition.
    pub fn open(&mut self, overflowed: &[MenuItem]) -> bool {
        if overflowed.is_empty() || self.is_open() {
            return false;
        }
        self.entries = overflowed.iter().map(ProxyEntry::from).collect();
        self.active = None;
        self.phase = DropdownPhase::Open;
        debug!(entries = self.entries.len(), "dropdown opened");
        true
    }

    /// Closes the dropdown. `None` when it was already closed.
    pub fn close(&mut self, reason: CloseReason) -> Option<CloseOutcome> {
        if !self.is_open() {
            return None;
        }
        self.phase = DropdownPhase::Closed;
        self.entries.clear();
        self.entry_areas.clear();
        self.active = None;
        self.area = None;
        debug!(?reason, "dropdown closed");
        Some(CloseOutcome {
            reason,
            focus_toggle: reason.returns_focus_to_toggle(),
        })
    }

    /// Applies the latest classification. An empty overflow set forces
    /// `Closed`; otherwise an open dropdown rebuilds its entries, keeping the
    /// active entry when its item is still overflowed.
    pub fn sync_overflow(&mut self, overflowed: &[MenuItem]) -> Option<CloseOutcome> {
        if overflowed.is_empty() {
            return self.close(CloseReason::OverflowCleared);
        }
        if self.is_open() {
            let active_item = self.active.and_then(|i| self.entries.get(i)).map(|entry| entry.item);
            self.entries = overflowed.iter().map(ProxyEntry::from).collect();
            self.active = active_item.and_then(|id| self.entries.iter().position(|entry| entry.item == id));
        }
        None
    }

    /// Hit-tests a pointer position against the rendered popup.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.is_some_and(|area| area.contains(Position::new(column, row)))
    }

    /// Entry index under a pointer position.
    pub fn entry_at(&self, column: u16, row: u16) -> Option<usize> {
        let position = Position::new(column, row);
        self.entry_areas.iter().position(|area| area.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overflowed() -> Vec<MenuItem> {
        vec![MenuItem::new(3, "Docs"), MenuItem::new(4, "Blog"), MenuItem::new(5, "About")]
    }

    #[test]
    fn opening_with_empty_overflow_is_a_noop() {
        let mut dropdown = DropdownState::default();
        assert!(!dropdown.open(&[]));
        assert!(!dropdown.is_open());
        assert!(dropdown.entries().is_empty());
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let mut dropdown = DropdownState::default();
        assert!(dropdown.open(&overflowed()));
        assert!(!dropdown.open(&overflowed()));
        assert_eq!(dropdown.entries().len(), 3);

        let outcome = dropdown.close(CloseReason::Escape).unwrap();
        assert!(outcome.focus_toggle);
        assert!(dropdown.close(CloseReason::Escape).is_none());
        assert!(dropdown.entries().is_empty());
    }

    #[test]
    fn outside_pointer_close_keeps_focus_in_place() {
        let mut dropdown = DropdownState::default();
        dropdown.open(&overflowed());
        let outcome = dropdown.close(CloseReason::OutsidePointer).unwrap();
        assert!(!outcome.focus_toggle);
    }

    #[test]
    fn empty_classification_forces_closed() {
        let mut dropdown = DropdownState::default();
        dropdown.open(&overflowed());
        let outcome = dropdown.sync_overflow(&[]).unwrap();
        assert_eq!(outcome.reason, CloseReason::OverflowCleared);
        assert_eq!(dropdown.phase(), DropdownPhase::Closed);
    }

    #[test]
    fn resync_keeps_active_entry_by_identity() {
        let mut dropdown = DropdownState::default();
        dropdown.open(&overflowed());
        dropdown.set_active(Some(1));

        // The bar grew: "Docs" moved back inline.
        let remaining = vec![MenuItem::new(4, "Blog"), MenuItem::new(5, "About")];
        assert!(dropdown.sync_overflow(&remaining).is_none());
        assert_eq!(dropdown.active(), Some(0));
        assert_eq!(dropdown.entries()[0].item, ItemId(4));
    }

    #[test]
    fn hit_testing_uses_rendered_areas() {
        let mut dropdown = DropdownState::default();
        dropdown.open(&overflowed());
        dropdown.area = Some(Rect::new(10, 1, 12, 5));
        dropdown.entry_areas = vec![Rect::new(11, 2, 10, 1), Rect::new(11, 3, 10, 1)];
        assert!(dropdown.contains(10, 1));
        assert!(!dropdown.contains(22, 1));
        assert_eq!(dropdown.entry_at(12, 3), Some(1));
        assert_eq!(dropdown.entry_at(12, 5), None);
    }
}
