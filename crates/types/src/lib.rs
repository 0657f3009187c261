//! Shared type definitions for the menu bar overflow controller.
//!
//! The types here describe what a consumer slots into the menu bar
//! (`SlotChild`, `MenuItem`), what the menu bar reports back (`MenuBarEffect`,
//! `ItemSelectEvent`), and the runtime messages used by the demo event loop
//! (`Msg`). They carry no rendering or layout logic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity-stable handle for a slotted menu item.
///
/// The consumer owns item identity; the menu bar only reads and writes
/// presentation attributes on the item carrying this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// A single entry rendered in the menu bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Consumer-assigned identity.
    pub id: ItemId,
    /// Text shown inline and on the dropdown proxy entry.
    pub label: String,
    /// Disabled items are skipped by keyboard navigation and ignore activation.
    #[serde(default)]
    pub disabled: bool,
    /// At most one item in the bar is selected at any time.
    #[serde(default)]
    pub selected: bool,
    /// Derived on every layout pass; never persisted.
    #[serde(skip)]
    pub overflowed: bool,
    /// Width in terminal cells captured on the last layout pass.
    #[serde(skip)]
    pub measured_width: u16,
}

impl MenuItem {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            label: label.into(),
            disabled: false,
            selected: false,
            overflowed: false,
            measured_width: 0,
        }
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// True when the item participates in the inline roving focus ring.
    pub fn is_navigable_inline(&self) -> bool {
        !self.disabled && !self.overflowed
    }
}

/// A child projected into the menu bar slot.
///
/// Only `Item` children take part in layout, navigation, and selection; the
/// other variants are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotChild {
    Item(MenuItem),
    Separator,
    Text { text: String },
}

impl SlotChild {
    /// Returns the menu item when this child is one.
    pub fn into_menu_item(self) -> Option<MenuItem> {
        match self {
            SlotChild::Item(item) => Some(item),
            SlotChild::Separator | SlotChild::Text { .. } => None,
        }
    }
}

impl From<MenuItem> for SlotChild {
    fn from(item: MenuItem) -> Self {
        SlotChild::Item(item)
    }
}

/// Where an activation originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationSource {
    /// The item was activated in the visible bar.
    Inline,
    /// The item was activated through its dropdown proxy entry.
    Dropdown,
}

/// Normalized "item selected" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSelectEvent {
    pub item: ItemId,
    pub label: String,
    pub source: ActivationSource,
}

/// Side effects the menu bar asks its host to perform.
///
/// Handlers never touch host state directly; they return effects so the host
/// can route focus and selection the same way it does for any component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuBarEffect {
    /// An item was activated; carries the normalized selection event.
    ItemSelected(ItemSelectEvent),
    /// Move host focus onto the "More" toggle.
    FocusToggle,
    /// Move host focus onto the inline bar tab stop.
    FocusBar,
    /// Let the host continue its own forward tab order.
    FocusNext,
    /// Let the host continue its own backward tab order.
    FocusPrev,
}

/// Messages driving the demo event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Terminal resized to `(columns, rows)`.
    Resize(u16, u16),
    /// Animation frame tick.
    Tick,
    /// Slotted children replaced by the host.
    SlotChanged(Vec<SlotChild>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_child_deserializes_tagged_variants() {
        let json = r#"[
            {"kind": "item", "id": 3, "label": "Docs", "disabled": true},
            {"kind": "separator"},
            {"kind": "text", "text": "beta"}
        ]"#;
        let children: Vec<SlotChild> = serde_json::from_str(json).unwrap();

        assert_eq!(children.len(), 3);
        let items: Vec<MenuItem> = children.into_iter().filter_map(SlotChild::into_menu_item).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ItemId(3));
        assert!(items[0].disabled);
        assert!(!items[0].overflowed);
        assert_eq!(items[0].measured_width, 0);
    }

    #[test]
    fn overflowed_items_are_not_navigable_inline() {
        let mut item = MenuItem::new(1, "Home");
        assert!(item.is_navigable_inline());
        item.overflowed = true;
        assert!(!item.is_navigable_inline());
        let disabled = MenuItem::new(2, "Admin").with_disabled(true);
        assert!(!disabled.is_navigable_inline());
    }
}
