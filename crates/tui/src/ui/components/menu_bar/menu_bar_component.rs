use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use menubar_types::{MenuBarEffect, Msg};
use menubar_util::{padded_width, truncate_to_width};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

use super::{MenuBarState, WidthProvider};
use super::navigator::FocusContext;
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::{
    Theme,
    theme_helpers::{self as th, menu_entry_style},
};

/// Renders the menu bar and wires it into the app's event flow.
///
/// Layout state is owned by [`MenuBarState`]; this component only draws what
/// the last classification decided and forwards input.
#[derive(Debug, Default)]
pub struct MenuBarComponent;

impl MenuBarComponent {
    pub fn new() -> Self {
        Self
    }
}

impl Component for MenuBarComponent {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<MenuBarEffect> {
        match msg {
            Msg::Tick => {
                let widths = app.menu_bar.terminal_width_provider();
                app.menu_bar.on_frame(&widths)
            }
            Msg::SlotChanged(children) => {
                app.menu_bar.set_children(children.clone());
                Vec::new()
            }
            // The next render observes the new container width.
            Msg::Resize(..) => Vec::new(),
        }
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<MenuBarEffect> {
        if app.menu_bar.focus_context() == FocusContext::Outside {
            app.menu_bar.sync_focus_from_flags();
        }
        app.menu_bar.handle_key(key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<MenuBarEffect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        if !app.menu_bar.root_contains(mouse.column, mouse.row) {
            return Vec::new();
        }
        app.menu_bar.handle_pointer_down(mouse.column, mouse.row)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        render_menu_bar(frame, rect, &mut app.menu_bar, &*app.theme);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let hints: &[(&str, &str)] = match app.menu_bar.focus_context() {
            FocusContext::Outside => &[],
            FocusContext::Bar { .. } => &[(" ←/→", " Navigate"), (" Enter", " Select"), (" Tab", " Next")],
            FocusContext::Toggle => &[(" Enter/↓", " Open"), (" ↑", " Open at end"), (" Esc", " Close")],
            FocusContext::Dropdown { .. } => &[(" ↑/↓", " Navigate"), (" Enter", " Select"), (" Esc", " Close")],
        };
        th::build_hint_spans(&*app.theme, hints)
    }
}

/// Draws the bar into `area` and records the geometry used for hit testing.
///
/// Visible items are drawn left to right at their measured widths, followed
/// by the toggle while anything overflows. An open dropdown is drawn below
/// the toggle, kept inside the frame.
pub fn render_menu_bar(frame: &mut Frame, area: Rect, state: &mut MenuBarState, theme: &dyn Theme) {
    state.observe_container(Some(area));
    frame.render_widget(Block::default().style(th::panel_style(theme)), area);

    let padding = state.item_padding();
    let widths = state.terminal_width_provider();
    let focus_context = state.focus_context();
    let split = state.split();
    let mut item_areas = vec![None; state.items().len()];
    let mut cursor = area.x;

    for index in split.visible() {
        let Some(item) = state.items().get(index) else {
            continue;
        };
        let remaining = area.right().saturating_sub(cursor);
        if remaining == 0 {
            break;
        }
        let width = match item.measured_width {
            0 => widths.measure(item),
            measured => measured,
        }
        .min(remaining);
        if width == 0 {
            continue;
        }
        let item_area = Rect::new(cursor, area.y, width, area.height);
        let focused = focus_context == FocusContext::Bar { index: Some(index) };
        let style = menu_entry_style(theme, item.disabled, item.selected, focused);
        let text = truncate_to_width(&pad_label(&item.label, padding), width);
        frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), item_area);
        item_areas[index] = Some(item_area);
        cursor = cursor.saturating_add(width);
    }
    state.item_areas = item_areas;

    if !state.toggle_visible() {
        state.dropdown.anchor = None;
        return;
    }

    let toggle_text = widths.toggle_text();
    let toggle_width = widths.reserved_control_width().min(area.width);
    let toggle_x = cursor.min(area.right().saturating_sub(toggle_width));
    let anchor = Rect::new(toggle_x, area.y, toggle_width, area.height);
    let toggle_focused = matches!(focus_context, FocusContext::Toggle);
    let toggle_selected = state.selection_overflowed() || state.dropdown.is_open();
    let style = menu_entry_style(theme, false, toggle_selected, toggle_focused);
    let text = truncate_to_width(&pad_label(&toggle_text, padding), toggle_width);
    frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), anchor);
    state.dropdown.anchor = Some(anchor);

    if state.dropdown.is_open() {
        render_dropdown(frame, anchor, state, theme);
    }
}

fn render_dropdown(frame: &mut Frame, anchor: Rect, state: &mut MenuBarState, theme: &dyn Theme) {
    let padding = state.item_padding();
    let bounds = frame.area();
    let widest = state
        .dropdown
        .entries()
        .iter()
        .map(|entry| padded_width(&entry.label, padding))
        .max()
        .unwrap_or(0);
    let entry_count = u16::try_from(state.dropdown.entries().len()).unwrap_or(u16::MAX);

    let width = widest.saturating_add(2).max(anchor.width).min(bounds.width);
    let x = anchor.x.min(bounds.right().saturating_sub(width));
    let y = anchor.bottom();
    let height = entry_count.saturating_add(2).min(bounds.bottom().saturating_sub(y));
    if width < 3 || height < 3 {
        state.dropdown.area = None;
        state.dropdown.entry_areas.clear();
        return;
    }
    let popup = Rect::new(x, y, width, height);

    let block = th::block(theme, None, true).style(theme.popup_style());
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let active = state.dropdown.active();
    let mut entry_areas = Vec::with_capacity(state.dropdown.entries().len());
    for (index, entry) in state.dropdown.entries().iter().enumerate() {
        let Ok(offset) = u16::try_from(index) else {
            break;
        };
        if offset >= inner.height {
            break;
        }
        let row = Rect::new(inner.x, inner.y + offset, inner.width, 1);
        let style = menu_entry_style(theme, entry.disabled, entry.selected, active == Some(index));
        let text = truncate_to_width(&pad_label(&entry.label, padding), row.width);
        frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), row);
        entry_areas.push(row);
    }
    state.dropdown.area = Some(popup);
    state.dropdown.entry_areas = entry_areas;
}

fn pad_label(label: &str, padding: u16) -> String {
    let pad = " ".repeat(usize::from(padding));
    format!("{pad}{label}{pad}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::menu_bar::pointer_bus::DocumentPointerBus;
    use crate::ui::theme::NordTheme;
    use menubar_types::{ActivationSource, ItemId, MenuItem, SlotChild};
    use menubar_util::MenuBarConfig;
    use ratatui::{Terminal, backend::TestBackend};

    fn state_with(labels: &[&str], bus: &mut DocumentPointerBus) -> MenuBarState {
        let mut state = MenuBarState::new(&MenuBarConfig::default());
        let children = labels
            .iter()
            .zip(0u32..)
            .map(|(label, id)| SlotChild::Item(MenuItem::new(id, *label)))
            .collect();
        state.set_children(children);
        state.mount(bus);
        state
    }

    fn draw(terminal: &mut Terminal<TestBackend>, state: &mut MenuBarState, bar_width: u16) {
        let theme = NordTheme::new();
        terminal
            .draw(|frame| render_menu_bar(frame, Rect::new(0, 0, bar_width, 1), state, &theme))
            .expect("draw");
    }

    /// Render, run the scheduled pass, release the guard, render again.
    fn draw_settled(terminal: &mut Terminal<TestBackend>, state: &mut MenuBarState, bar_width: u16) {
        draw(terminal, state, bar_width);
        let widths = state.terminal_width_provider();
        state.on_frame(&widths);
        state.on_frame(&widths);
        draw(terminal, state, bar_width);
    }

    fn row_text(terminal: &Terminal<TestBackend>, y: u16, from: u16, to: u16) -> String {
        let buffer = terminal.backend().buffer();
        (from..to).map(|x| buffer[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn roomy_bar_draws_every_item_without_toggle() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "Docs", "Blog"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).expect("terminal");

        draw_settled(&mut terminal, &mut state, 20);

        assert!(!state.toggle_visible());
        assert_eq!(row_text(&terminal, 0, 0, 18), " Home  Docs  Blog ");
        assert_eq!(state.item_areas[2], Some(Rect::new(12, 0, 6, 1)));
        assert!(state.dropdown.anchor.is_none());
    }

    #[test]
    fn narrow_bar_draws_toggle_after_visible_prefix() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "Docs", "Blog"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(16, 6)).expect("terminal");

        // 18 cells needed, 16 available; reserving 8 for " More ▾ " leaves room for "Home".
        draw_settled(&mut terminal, &mut state, 16);

        assert_eq!(state.visible_items().len(), 1);
        assert_eq!(state.item_areas, vec![Some(Rect::new(0, 0, 6, 1)), None, None]);
        assert_eq!(state.dropdown.anchor, Some(Rect::new(6, 0, 8, 1)));
        assert_eq!(row_text(&terminal, 0, 0, 6), " Home ");
        assert_eq!(row_text(&terminal, 0, 6, 11), " More");
    }

    #[test]
    fn open_dropdown_lists_overflowed_items_and_pointer_selects() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "Docs", "Blog"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(16, 6)).expect("terminal");
        draw_settled(&mut terminal, &mut state, 16);

        assert!(state.open_dropdown(None));
        draw(&mut terminal, &mut state, 16);

        assert_eq!(state.dropdown.area, Some(Rect::new(6, 1, 8, 4)));
        assert_eq!(state.dropdown.entry_areas.len(), 2);
        assert_eq!(row_text(&terminal, 2, 7, 13), " Docs ");
        assert_eq!(row_text(&terminal, 3, 7, 13), " Blog ");

        let effects = state.handle_pointer_down(8, 3);
        let selected: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                MenuBarEffect::ItemSelected(event) => Some((event.item, event.source)),
                _ => None,
            })
            .collect();
        assert_eq!(selected, vec![(ItemId(2), ActivationSource::Dropdown)]);
        assert!(!state.dropdown.is_open());
        assert!(state.selection_overflowed());
    }

    #[test]
    fn dropdown_is_clamped_to_the_frame() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "Documentation"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(16, 6)).expect("terminal");
        draw_settled(&mut terminal, &mut state, 16);
        assert!(state.open_dropdown(None));
        draw(&mut terminal, &mut state, 16);

        let popup = state.dropdown.area.expect("popup rendered");
        assert!(popup.right() <= 16);
        assert_eq!(popup.width, 16);
    }

    #[test]
    fn empty_labels_are_drawn_at_their_measured_width() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "", "", "", "Docs"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(16, 4)).expect("terminal");

        // 6 + 2 + 2 + 2 + 6 cells do not fit in 16; the 8-cell budget keeps "Home" and one blank.
        draw_settled(&mut terminal, &mut state, 16);

        assert!(state.toggle_visible());
        assert_eq!(state.visible_items().len(), 2);
        assert_eq!(state.overflowed_items().len(), 3);
        for (item, area) in state.items().iter().zip(&state.item_areas) {
            if let Some(area) = area {
                assert_eq!(area.width, item.measured_width);
            }
        }
        assert_eq!(state.item_areas[1], Some(Rect::new(6, 0, 2, 1)));
        assert_eq!(state.dropdown.anchor, Some(Rect::new(8, 0, 8, 1)));
        assert_eq!(row_text(&terminal, 0, 0, 13), " Home    More");
    }

    #[test]
    fn clicking_inline_item_selects_it() {
        let mut bus = DocumentPointerBus::new();
        let mut state = state_with(&["Home", "Docs", "Blog"], &mut bus);
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).expect("terminal");
        draw_settled(&mut terminal, &mut state, 20);

        let effects = state.handle_pointer_down(7, 0);
        assert_eq!(effects.first(), Some(&MenuBarEffect::FocusBar));
        assert_eq!(state.focus_context(), FocusContext::Bar { index: Some(1) });
        assert!(state.items()[1].selected);
    }
}
