use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use menubar_types::{MenuBarEffect, MenuItem, Msg, SlotChild};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use super::components::{Component, MenuBarComponent};
use super::theme::theme_helpers as th;
use crate::app::App;

/// Top-level view: the menu bar across the top, a content pane, and a hint
/// line at the bottom.
#[derive(Debug, Default)]
pub struct MainView {
    pub menu_bar_view: MenuBarComponent,
    /// Last rendered content pane, for pointer focus.
    content_area: Rect,
}

impl MainView {
    pub fn new() -> Self {
        Self {
            menu_bar_view: MenuBarComponent::new(),
            content_area: Rect::default(),
        }
    }

    /// Gives focus to the menu bar when nothing in the tree holds it.
    pub fn restore_focus(&mut self, app: &mut App) {
        app.focus.focus(&app.menu_bar.bar_focus);
        app.menu_bar.sync_focus_from_flags();
    }

    /// Adds or removes a trailing item, replacing the bar's slot contents.
    fn edit_slot(&mut self, app: &mut App, grow: bool) -> Vec<MenuBarEffect> {
        let mut children: Vec<SlotChild> = app.menu_bar.items().iter().cloned().map(SlotChild::Item).collect();
        if grow {
            let next_id = app.menu_bar.items().iter().map(|item| item.id.0 + 1).max().unwrap_or(0);
            children.push(SlotChild::Item(MenuItem::new(next_id, format!("Item {next_id}"))));
        } else {
            children.pop();
        }
        self.menu_bar_view.handle_message(app, &Msg::SlotChanged(children))
    }

    fn render_content(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.theme;
        let block = th::block(theme, Some("Content"), app.content_focus.get());
        let selection = match app.last_selection.as_ref() {
            Some(event) => Line::from(vec![
                Span::styled("Selected: ", theme.text_secondary_style()),
                Span::styled(event.label.clone(), theme.accent_emphasis_style()),
                Span::styled(format!(" ({:?})", event.source), theme.text_muted_style()),
            ]),
            None => Line::from(Span::styled("Nothing selected yet", theme.text_muted_style())),
        };
        let overflow = Line::from(Span::styled(
            format!(
                "{} inline, {} in \"{}\"",
                app.menu_bar.visible_items().len(),
                app.menu_bar.overflowed_items().len(),
                app.menu_bar.overflow_label()
            ),
            theme.text_secondary_style(),
        ));
        let paragraph = Paragraph::new(vec![selection, Line::default(), overflow])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn content_hint_spans<'a>(&self, app: &App) -> Vec<Span<'a>> {
        th::build_hint_spans(
            &*app.theme,
            &[(" Tab", " Menu"), (" +/-", " Add/remove item"), (" Ctrl+C", " Quit")],
        )
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<MenuBarEffect> {
        self.menu_bar_view.handle_message(app, msg)
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<MenuBarEffect> {
        if app.menu_bar_has_focus() {
            return self.menu_bar_view.handle_key_events(app, key);
        }
        match key.code {
            KeyCode::Tab => vec![MenuBarEffect::FocusNext],
            KeyCode::BackTab => vec![MenuBarEffect::FocusPrev],
            KeyCode::Char('+') => self.edit_slot(app, true),
            KeyCode::Char('-') => self.edit_slot(app, false),
            _ => Vec::new(),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<MenuBarEffect> {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && self.content_area.contains(Position::new(mouse.column, mouse.row))
            && !app.menu_bar.root_contains(mouse.column, mouse.row)
        {
            app.focus.focus(&app.content_focus);
            app.menu_bar.sync_focus_from_flags();
            return Vec::new();
        }
        self.menu_bar_view.handle_mouse_events(app, mouse)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [bar_area, content_area, hint_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)]).areas(rect);
        self.content_area = content_area;

        // Content first so the dropdown overlays it.
        self.render_content(frame, content_area, app);
        let hints = if app.menu_bar_has_focus() {
            self.menu_bar_view.get_hint_spans(app)
        } else {
            self.content_hint_spans(app)
        };
        frame.render_widget(Paragraph::new(Line::from(hints)).style(th::panel_style(&*app.theme)), hint_area);
        self.menu_bar_view.render(frame, bar_area, app);
    }
}
