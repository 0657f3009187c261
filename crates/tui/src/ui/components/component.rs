//! Component system for the menu bar host.
//!
//! Components are self-contained UI elements that handle their own events and
//! rendering while integrating with the application through a consistent
//! interface. They never move focus themselves; they report
//! [`MenuBarEffect`]s and the runtime applies them.

use crossterm::event::{KeyEvent, MouseEvent};
use menubar_types::{MenuBarEffect, Msg};
use ratatui::{Frame, layout::Rect, text::Span};

use crate::app::App;

/// A UI component with its own behavior, rendered into a provided `Rect`.
///
/// # Component Lifecycle
///
/// 1. **Messages**: `handle_message()` receives ticks, resizes and slot changes
/// 2. **Input**: `handle_key_events()` / `handle_mouse_events()` while focused
/// 3. **Rendering**: `render()` draws the component into the frame area
pub(crate) trait Component {
    /// Handle an application-level message the component cares about.
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<MenuBarEffect> {
        Vec::new()
    }

    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<MenuBarEffect> {
        Vec::new()
    }

    /// Handle mouse events routed to this component.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<MenuBarEffect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Implementations may record layout geometry on the app state for
    /// hit testing; any other state change belongs in the handlers.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the status line while this component has focus.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }
}
