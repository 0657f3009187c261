use crossterm::event::{KeyCode, KeyEvent};
use menubar_types::{ActivationSource, ItemId, ItemSelectEvent, MenuBarEffect, MenuItem, SlotChild};
use menubar_util::MenuBarConfig;
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::{Position, Rect};
use tracing::debug;

use super::dropdown::{CloseReason, DropdownState};
use super::layout_monitor::LayoutMonitor;
use super::navigator::{
    FocusContext, Orientation, RovingMove, ToggleKeyAction, is_activation_key, next_roving_index, roving_move_for,
    toggle_key_action,
};
use super::overflow::{OverflowSplit, classify_overflow};
use super::pointer_bus::{PointerEventBus, SubscriptionId};
use super::width::{TerminalWidthProvider, WidthProvider};

/// State for the adaptive menu bar.
///
/// Owns the slotted items' presentation flags, the overflow split, the
/// dropdown, and the keyboard focus context. Handlers return
/// [`MenuBarEffect`]s so the host decides how focus and selection propagate.
#[derive(Debug)]
pub struct MenuBarState {
    items: Vec<MenuItem>,
    overflow_label: String,
    overflow_enabled: bool,
    item_padding: u16,
    split: OverflowSplit,
    pub dropdown: DropdownState,
    focus_context: FocusContext,
    monitor: LayoutMonitor,
    subscription: Option<SubscriptionId>,
    /// Container focus flag for the host focus tree.
    pub container_focus: FocusFlag,
    /// Single tab stop for the inline bar (roving focus inside).
    pub bar_focus: FocusFlag,
    /// Tab stop for the "More" toggle.
    pub toggle_focus: FocusFlag,
    /// Last rendered container area; `None` while detached.
    pub last_area: Option<Rect>,
    /// Last rendered area per item; `None` for overflowed items.
    pub item_areas: Vec<Option<Rect>>,
}

impl Default for MenuBarState {
    fn default() -> Self {
        Self::new(&MenuBarConfig::default())
    }
}

impl MenuBarState {
    /// Creates an empty, unmounted bar configured from `config`.
    pub fn new(config: &MenuBarConfig) -> Self {
        Self {
            items: Vec::new(),
            overflow_label: config.overflow_label.clone(),
            overflow_enabled: config.overflow_enabled,
            item_padding: config.item_padding,
            split: OverflowSplit::default(),
            dropdown: DropdownState::default(),
            focus_context: FocusContext::Outside,
            monitor: LayoutMonitor::default(),
            subscription: None,
            container_focus: FocusFlag::named("menubar"),
            bar_focus: FocusFlag::named("menubar.bar"),
            toggle_focus: FocusFlag::named("menubar.toggle"),
            last_area: None,
            item_areas: Vec::new(),
        }
    }

    /// Every slotted item in document order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Looks up an item by id.
    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Label shown on the toggle.
    pub fn overflow_label(&self) -> &str {
        &self.overflow_label
    }

    /// Whether items may move into the dropdown at all.
    pub fn overflow_enabled(&self) -> bool {
        self.overflow_enabled
    }

    /// Cells of padding drawn on each side of a label.
    pub fn item_padding(&self) -> u16 {
        self.item_padding
    }

    /// Result of the last layout pass.
    pub fn split(&self) -> OverflowSplit {
        self.split
    }

    /// Where keyboard focus currently sits inside the bar.
    pub fn focus_context(&self) -> FocusContext {
        self.focus_context
    }

    /// Layout monitor driving the frame scheduler.
    pub fn monitor(&self) -> &LayoutMonitor {
        &self.monitor
    }

    /// True while subscribed to a pointer bus.
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Items drawn inline.
    pub fn visible_items(&self) -> &[MenuItem] {
        &self.items[self.split.visible()]
    }

    /// Items currently listed in the dropdown.
    pub fn overflowed_items(&self) -> &[MenuItem] {
        &self.items[self.split.overflowed()]
    }

    /// The toggle exists only while something overflows.
    pub fn toggle_visible(&self) -> bool {
        self.overflow_enabled && self.split.toggle_visible()
    }

    /// True when the selected item currently lives in the dropdown.
    pub fn selection_overflowed(&self) -> bool {
        self.overflowed_items().iter().any(|item| item.selected)
    }

    /// Width provider matching how this state is rendered in a terminal.
    pub fn terminal_width_provider(&self) -> TerminalWidthProvider {
        let mut provider = TerminalWidthProvider::new(self.overflow_label.clone(), self.item_padding);
        provider.set_container(self.last_area);
        provider
    }

    /// Replaces the slotted children. Non-item children are ignored; at most
    /// one item keeps `selected`.
    pub fn set_children(&mut self, children: Vec<SlotChild>) {
        let mut items: Vec<MenuItem> = children.into_iter().filter_map(SlotChild::into_menu_item).collect();
        let mut seen_selected = false;
        for item in &mut items {
            item.overflowed = false;
            if item.selected {
                item.selected = !seen_selected;
                seen_selected = true;
            }
        }
        self.items = items;
        self.item_areas = vec![None; self.items.len()];
        self.split = OverflowSplit::all_visible(self.items.len());
        self.dropdown.close(CloseReason::Detached);
        self.repair_focus_context();
        if self.overflow_enabled && self.is_mounted() {
            self.monitor.notify_items_changed();
        }
    }

    /// Updates the toggle text. Never schedules a layout pass.
    pub fn set_overflow_label(&mut self, label: impl Into<String>) {
        self.overflow_label = label.into();
    }

    /// Enables or disables the overflow feature. Disabled bars render every
    /// item inline and never measure.
    pub fn set_overflow_enabled(&mut self, enabled: bool) {
        if self.overflow_enabled == enabled {
            return;
        }
        self.overflow_enabled = enabled;
        if enabled {
            if self.is_mounted() {
                self.monitor.notify_feature_enabled();
            }
        } else {
            self.monitor.reset();
            self.show_everything_inline();
        }
    }

    /// Acquires the document pointer subscription and schedules the initial
    /// pass. Mounting twice keeps the single subscription.
    pub fn mount(&mut self, bus: &mut dyn PointerEventBus) {
        if self.subscription.is_some() {
            return;
        }
        self.subscription = Some(bus.subscribe());
        if self.overflow_enabled {
            self.monitor.notify_mounted();
        }
        debug!(items = self.items.len(), "menu bar mounted");
    }

    /// Releases the pointer subscription and drops pending layout work.
    pub fn unmount(&mut self, bus: &mut dyn PointerEventBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
        self.dropdown.close(CloseReason::Detached);
        self.monitor.reset();
        self.focus_context = FocusContext::Outside;
        self.last_area = None;
        debug!("menu bar unmounted");
    }

    /// Records the area the bar was rendered into. A width change requests
    /// a layout pass on the next frame.
    pub fn observe_container(&mut self, area: Option<Rect>) {
        self.last_area = area;
        if self.overflow_enabled && self.is_mounted() {
            self.monitor.observe_container(area.map(|a| a.width));
        }
    }

    /// Animation frame tick. Runs at most one coalesced layout pass.
    pub fn on_frame(&mut self, widths: &dyn WidthProvider) -> Vec<MenuBarEffect> {
        if !self.overflow_enabled || !self.is_mounted() {
            return Vec::new();
        }
        let was_on_toggle = matches!(self.focus_context, FocusContext::Toggle | FocusContext::Dropdown { .. });
        let mut monitor = std::mem::take(&mut self.monitor);
        monitor.on_frame(|| self.apply_layout(widths));
        self.monitor = monitor;

        if was_on_toggle && !self.toggle_visible() {
            self.focus_context = FocusContext::Bar {
                index: next_roving_index(&self.navigable_bar_indices(), None, RovingMove::Last),
            };
            return vec![MenuBarEffect::FocusBar];
        }
        Vec::new()
    }

    fn apply_layout(&mut self, widths: &dyn WidthProvider) -> Option<u16> {
        let Some(container) = widths.container_width() else {
            debug!("menu bar detached; skipping layout pass");
            return None;
        };
        for item in &mut self.items {
            item.measured_width = widths.measure(item);
        }
        let measured: Vec<u16> = self.items.iter().map(|item| item.measured_width).collect();
        let reserved = widths.reserved_control_width();
        self.split = classify_overflow(&measured, container, reserved);
        for (index, item) in self.items.iter_mut().enumerate() {
            item.overflowed = index >= self.split.split;
        }

        let overflowed = self.items[self.split.overflowed()].to_vec();
        if self.dropdown.sync_overflow(&overflowed).is_some() && matches!(self.focus_context, FocusContext::Dropdown { .. }) {
            self.focus_context = FocusContext::Toggle;
        }
        if let FocusContext::Dropdown { .. } = self.focus_context {
            self.focus_context = FocusContext::Dropdown {
                index: self.dropdown.active(),
            };
        }
        self.repair_focus_context();
        debug!(
            container,
            reserved,
            split = self.split.split,
            items = self.split.len,
            "menu bar layout pass applied"
        );
        Some(container)
    }

    fn show_everything_inline(&mut self) {
        for item in &mut self.items {
            item.overflowed = false;
        }
        self.split = OverflowSplit::all_visible(self.items.len());
        self.dropdown.close(CloseReason::Detached);
        if matches!(self.focus_context, FocusContext::Toggle | FocusContext::Dropdown { .. }) {
            self.focus_context = FocusContext::Bar { index: None };
        }
        self.repair_focus_context();
    }

    /// Keeps the bar's roving index on a navigable item.
    fn repair_focus_context(&mut self) {
        if let FocusContext::Bar { index } = self.focus_context {
            let navigable = self.navigable_bar_indices();
            let still_valid = index.is_some_and(|i| navigable.contains(&i));
            if !still_valid {
                self.focus_context = FocusContext::Bar {
                    index: next_roving_index(&navigable, None, RovingMove::Last),
                };
            }
        }
        if self.focus_context == FocusContext::Toggle && !self.toggle_visible() {
            self.focus_context = FocusContext::Bar {
                index: next_roving_index(&self.navigable_bar_indices(), None, RovingMove::Last),
            };
        }
    }

    /// Positions of non-disabled, non-overflowed items.
    pub fn navigable_bar_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_navigable_inline())
            .map(|(index, _)| index)
            .collect()
    }

    /// Positions of non-disabled proxy entries in the open dropdown.
    pub fn navigable_dropdown_indices(&self) -> Vec<usize> {
        self.dropdown
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.disabled)
            .map(|(index, _)| index)
            .collect()
    }

    /// Marks `id` selected and every sibling unselected, returning the
    /// normalized notification. Unknown or disabled items are ignored.
    pub fn activate(&mut self, id: ItemId, source: ActivationSource) -> Option<ItemSelectEvent> {
        let target = self.items.iter().find(|item| item.id == id)?;
        if target.disabled {
            return None;
        }
        let label = target.label.clone();
        for item in &mut self.items {
            item.selected = item.id == id;
        }
        debug!(item = %id, ?source, "menu item selected");
        Some(ItemSelectEvent { item: id, label, source })
    }

    /// Flips the dropdown. A no-op when nothing overflows.
    pub fn toggle_dropdown(&mut self, keyboard: bool) -> Vec<MenuBarEffect> {
        if self.dropdown.is_open() {
            return self.close_dropdown(CloseReason::Toggle { keyboard });
        }
        self.open_dropdown(None);
        Vec::new()
    }

    /// Opens the dropdown, optionally moving dropdown focus to the first or
    /// last entry. Returns `true` when the dropdown is open afterwards.
    pub fn open_dropdown(&mut self, focus: Option<RovingMove>) -> bool {
        if !self.toggle_visible() {
            return false;
        }
        let overflowed = self.overflowed_items().to_vec();
        self.dropdown.open(&overflowed);
        if let Some(movement) = focus {
            let index = next_roving_index(&self.navigable_dropdown_indices(), None, movement);
            self.dropdown.set_active(index);
            self.focus_context = FocusContext::Dropdown { index };
        }
        self.dropdown.is_open()
    }

    /// Closes the dropdown for `reason` and reports where focus goes.
    pub fn close_dropdown(&mut self, reason: CloseReason) -> Vec<MenuBarEffect> {
        let Some(outcome) = self.dropdown.close(reason) else {
            return Vec::new();
        };
        if outcome.focus_toggle {
            self.focus_context = FocusContext::Toggle;
            return vec![MenuBarEffect::FocusToggle];
        }
        if let FocusContext::Dropdown { .. } = self.focus_context {
            self.focus_context = FocusContext::Outside;
        }
        Vec::new()
    }

    /// Routes a key press according to the current focus context.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<MenuBarEffect> {
        match self.focus_context {
            FocusContext::Outside => Vec::new(),
            FocusContext::Bar { index } => self.handle_bar_key(index, key),
            FocusContext::Toggle => self.handle_toggle_key(key),
            FocusContext::Dropdown { index } => self.handle_dropdown_key(index, key),
        }
    }

    fn handle_bar_key(&mut self, index: Option<usize>, key: KeyEvent) -> Vec<MenuBarEffect> {
        if let Some(movement) = roving_move_for(Orientation::Horizontal, &key) {
            let next = next_roving_index(&self.navigable_bar_indices(), index, movement);
            self.focus_context = FocusContext::Bar { index: next.or(index) };
            return Vec::new();
        }
        if is_activation_key(&key) {
            let current = index.or_else(|| next_roving_index(&self.navigable_bar_indices(), None, RovingMove::First));
            let Some(item_id) = current.and_then(|i| self.items.get(i)).map(|item| item.id) else {
                return Vec::new();
            };
            self.focus_context = FocusContext::Bar { index: current };
            return self
                .activate(item_id, ActivationSource::Inline)
                .map(MenuBarEffect::ItemSelected)
                .into_iter()
                .collect();
        }
        match key.code {
            KeyCode::Tab if self.toggle_visible() => {
                self.focus_context = FocusContext::Toggle;
                vec![MenuBarEffect::FocusToggle]
            }
            KeyCode::Tab => {
                self.focus_context = FocusContext::Outside;
                vec![MenuBarEffect::FocusNext]
            }
            KeyCode::BackTab => {
                self.focus_context = FocusContext::Outside;
                vec![MenuBarEffect::FocusPrev]
            }
            _ => Vec::new(),
        }
    }

    fn handle_toggle_key(&mut self, key: KeyEvent) -> Vec<MenuBarEffect> {
        if let Some(action) = toggle_key_action(&key) {
            if !self.toggle_visible() {
                return Vec::new();
            }
            let focus_move = match action {
                ToggleKeyAction::OpenFocusFirst => RovingMove::First,
                ToggleKeyAction::OpenFocusLast => RovingMove::Last,
            };
            if self.dropdown.is_open() && is_activation_key(&key) {
                return self.close_dropdown(CloseReason::Toggle { keyboard: true });
            }
            if self.dropdown.is_open() {
                let index = next_roving_index(&self.navigable_dropdown_indices(), None, focus_move);
                self.dropdown.set_active(index);
                self.focus_context = FocusContext::Dropdown { index };
            } else {
                self.open_dropdown(Some(focus_move));
            }
            return Vec::new();
        }
        match key.code {
            KeyCode::Esc => self.close_dropdown(CloseReason::Escape),
            KeyCode::Tab => {
                let mut effects = self.close_dropdown(CloseReason::Tab);
                self.focus_context = FocusContext::Outside;
                effects.push(MenuBarEffect::FocusNext);
                effects
            }
            KeyCode::BackTab => {
                self.close_dropdown(CloseReason::Tab);
                self.focus_context = FocusContext::Bar {
                    index: next_roving_index(&self.navigable_bar_indices(), None, RovingMove::Last),
                };
                vec![MenuBarEffect::FocusBar]
            }
            _ => Vec::new(),
        }
    }

    fn handle_dropdown_key(&mut self, index: Option<usize>, key: KeyEvent) -> Vec<MenuBarEffect> {
        if !self.dropdown.is_open() {
            self.focus_context = FocusContext::Toggle;
            return self.handle_toggle_key(key);
        }
        if let Some(movement) = roving_move_for(Orientation::Vertical, &key) {
            let next = next_roving_index(&self.navigable_dropdown_indices(), index, movement);
            self.dropdown.set_active(next);
            self.focus_context = FocusContext::Dropdown { index: next };
            return Vec::new();
        }
        if is_activation_key(&key) {
            let Some(entry_index) = index else {
                return Vec::new();
            };
            return self.activate_proxy(entry_index, true);
        }
        match key.code {
            KeyCode::Esc => self.close_dropdown(CloseReason::Escape),
            KeyCode::Tab => {
                self.close_dropdown(CloseReason::Tab);
                self.focus_context = FocusContext::Outside;
                vec![MenuBarEffect::FocusNext]
            }
            KeyCode::BackTab => {
                self.close_dropdown(CloseReason::Tab);
                self.focus_context = FocusContext::Toggle;
                vec![MenuBarEffect::FocusToggle]
            }
            _ => Vec::new(),
        }
    }

    /// Forwards activation of a proxy entry to its item and closes the dropdown.
    pub fn activate_proxy(&mut self, entry_index: usize, keyboard: bool) -> Vec<MenuBarEffect> {
        let Some(entry) = self.dropdown.entry(entry_index) else {
            return Vec::new();
        };
        let item_id = entry.item;
        let Some(event) = self.activate(item_id, ActivationSource::Dropdown) else {
            return Vec::new();
        };
        let mut effects = vec![MenuBarEffect::ItemSelected(event)];
        effects.extend(self.close_dropdown(CloseReason::Activation { keyboard }));
        effects
    }

    /// True when a position lies inside the bar or the open dropdown.
    pub fn root_contains(&self, column: u16, row: u16) -> bool {
        let inside_bar = self.last_area.is_some_and(|area| area.contains(Position::new(column, row)));
        inside_bar || self.dropdown.contains(column, row)
    }

    /// Handles a pointer press inside the rendering root.
    pub fn handle_pointer_down(&mut self, column: u16, row: u16) -> Vec<MenuBarEffect> {
        let position = Position::new(column, row);
        if let Some(entry_index) = self.dropdown.entry_at(column, row) {
            return self.activate_proxy(entry_index, false);
        }
        if self.toggle_visible() && self.dropdown.anchor.is_some_and(|area| area.contains(position)) {
            self.focus_context = FocusContext::Toggle;
            let mut effects = vec![MenuBarEffect::FocusToggle];
            effects.extend(self.toggle_dropdown(false));
            return effects;
        }
        let hit = self.item_areas.iter().position(|area| area.is_some_and(|a| a.contains(position)));
        let Some(index) = hit else {
            return Vec::new();
        };
        let Some(item_id) = self.items.get(index).map(|item| item.id) else {
            return Vec::new();
        };
        let Some(event) = self.activate(item_id, ActivationSource::Inline) else {
            return Vec::new();
        };
        self.close_dropdown(CloseReason::Activation { keyboard: false });
        self.focus_context = FocusContext::Bar { index: Some(index) };
        vec![MenuBarEffect::FocusBar, MenuBarEffect::ItemSelected(event)]
    }

    /// Drains document pointer presses and closes the dropdown for any press
    /// outside the rendering root. Returns `true` if the dropdown closed.
    pub fn drain_pointer_bus(&mut self, bus: &mut dyn PointerEventBus) -> bool {
        let Some(id) = self.subscription else {
            return false;
        };
        let mut closed = false;
        for event in bus.drain(id) {
            if self.dropdown.is_open() && !self.root_contains(event.column, event.row) {
                self.close_dropdown(CloseReason::OutsidePointer);
                closed = true;
            }
        }
        closed
    }

    /// Re-derives the focus context from the host's focus flags after the
    /// host moved focus (e.g. Tab via the focus tree).
    pub fn sync_focus_from_flags(&mut self) {
        if self.toggle_focus.get() && self.toggle_visible() {
            if !matches!(self.focus_context, FocusContext::Dropdown { .. }) {
                self.focus_context = FocusContext::Toggle;
            }
        } else if self.bar_focus.get() {
            if !matches!(self.focus_context, FocusContext::Bar { .. }) {
                self.close_dropdown(CloseReason::Tab);
                let navigable = self.navigable_bar_indices();
                let selected = self.items.iter().position(|item| item.selected).filter(|i| navigable.contains(i));
                self.focus_context = FocusContext::Bar {
                    index: selected.or_else(|| next_roving_index(&navigable, None, RovingMove::First)),
                };
            }
        } else if self.focus_context != FocusContext::Outside {
            self.close_dropdown(CloseReason::Tab);
            self.focus_context = FocusContext::Outside;
        }
    }

    /// Gives the bar keyboard focus without going through the host focus tree.
    pub fn focus_bar(&mut self) {
        let navigable = self.navigable_bar_indices();
        let selected = self.items.iter().position(|item| item.selected).filter(|i| navigable.contains(i));
        self.focus_context = FocusContext::Bar {
            index: selected.or_else(|| next_roving_index(&navigable, None, RovingMove::First)),
        };
    }
}

impl HasFocus for MenuBarState {
    /// The bar is one tab stop; the toggle is a second one while visible.
    fn build(&self, builder: &mut FocusBuilder) {
        let tag = builder.start(self);
        builder.leaf_widget(&self.bar_focus);
        if self.toggle_visible() {
            builder.leaf_widget(&self.toggle_focus);
        }
        builder.end(tag);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area.unwrap_or_default()
    }
}
