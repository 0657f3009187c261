//! Width measurement seam between the overflow classifier and the renderer.

use std::collections::HashMap;

use menubar_types::{ItemId, MenuItem};
use menubar_util::padded_width;
use ratatui::layout::Rect;

/// Glyph appended to the toggle label to hint at the dropdown.
pub const TOGGLE_INDICATOR: &str = " ▾";

/// Read-only source of widths for one layout pass.
///
/// Measurement never fails: an item that cannot be measured reports `0` and is
/// treated as always fitting until the next pass corrects it. A missing
/// container (`None`) means the bar is detached and the pass is skipped.
pub trait WidthProvider {
    /// Width of `item` in cells, `0` when unavailable.
    fn measure(&self, item: &MenuItem) -> u16;
    /// Width available to the bar, `None` when detached.
    fn container_width(&self) -> Option<u16>;
    /// Space permanently reserved for the "More" toggle when anything overflows.
    fn reserved_control_width(&self) -> u16;
}

/// Measures items the way the terminal renderer lays them out: label cells
/// plus padding on both sides. The container is the last area the bar was
/// rendered into.
#[derive(Debug, Clone, Default)]
pub struct TerminalWidthProvider {
    container: Option<Rect>,
    item_padding: u16,
    overflow_label: String,
}

impl TerminalWidthProvider {
    pub fn new(overflow_label: impl Into<String>, item_padding: u16) -> Self {
        Self {
            container: None,
            item_padding,
            overflow_label: overflow_label.into(),
        }
    }

    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
    }

    /// Text rendered on the toggle control.
    pub fn toggle_text(&self) -> String {
        format!("{}{}", self.overflow_label, TOGGLE_INDICATOR)
    }
}

impl WidthProvider for TerminalWidthProvider {
    fn measure(&self, item: &MenuItem) -> u16 {
        padded_width(&item.label, self.item_padding)
    }

    fn container_width(&self) -> Option<u16> {
        self.container.map(|area| area.width)
    }

    fn reserved_control_width(&self) -> u16 {
        padded_width(&self.toggle_text(), self.item_padding)
    }
}

/// Fixed widths keyed by item id, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWidthProvider {
    pub widths: HashMap<ItemId, u16>,
    pub container: Option<u16>,
    pub reserved: u16,
}

impl StaticWidthProvider {
    /// Assigns `widths[i]` to `ItemId(i)`.
    pub fn sequential(widths: &[u16], container: u16, reserved: u16) -> Self {
        Self {
            widths: widths.iter().copied().zip(0u32..).map(|(w, id)| (ItemId(id), w)).collect(),
            container: Some(container),
            reserved,
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }
}

impl WidthProvider for StaticWidthProvider {
    fn measure(&self, item: &MenuItem) -> u16 {
        self.widths.get(&item.id).copied().unwrap_or(0)
    }

    fn container_width(&self) -> Option<u16> {
        self.container
    }

    fn reserved_control_width(&self) -> u16 {
        self.reserved
    }
}
