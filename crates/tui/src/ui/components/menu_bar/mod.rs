//! Adaptive horizontal menu bar with an overflow dropdown.
//!
//! Items are laid out left to right. When the bar is narrower than the sum of
//! its items, a trailing run of items moves into a "More" dropdown; the split
//! is recomputed on the next animation frame whenever the container width or
//! the item set changes. It supports:
//! - Greedy, order-preserving overflow classification (`overflow`)
//! - Frame-coalesced re-layout with a re-entrancy guard (`layout_monitor`)
//! - A dropdown of proxy entries with outside-pointer dismissal (`dropdown`)
//! - Roving keyboard focus for the bar and the dropdown (`navigator`)
//! - rat-focus integration via one tab stop for the bar and one for the toggle
//!
//! Handlers return [`menubar_types::MenuBarEffect`]s; the host maps focus
//! effects onto its own focus tree and reacts to selections.
//!
//! # Usage
//!
//! ```ignore
//! let mut state = MenuBarState::new(&MenuBarConfig::default());
//! state.set_children(config.slot_children());
//! state.mount(&mut pointer_bus);
//! // every frame:
//! let widths = state.terminal_width_provider();
//! let effects = state.on_frame(&widths);
//! // in the render pass:
//! render_menu_bar(frame, area, &mut state, theme);
//! ```

pub mod dropdown;
pub mod layout_monitor;
mod menu_bar_component;
pub mod navigator;
pub mod overflow;
pub mod pointer_bus;
mod state;
pub mod width;

pub use menu_bar_component::{MenuBarComponent, render_menu_bar};
pub use pointer_bus::{DocumentPointerBus, PointerDown, PointerEventBus};
pub use state::MenuBarState;
pub use width::{StaticWidthProvider, TerminalWidthProvider, WidthProvider};
