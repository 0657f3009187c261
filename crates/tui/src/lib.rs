//! # Menu Bar TUI Library
//!
//! An adaptive horizontal menu bar for terminal applications. Items that do
//! not fit the available width move into a "More" dropdown; the split is
//! recomputed on the next animation frame after the terminal is resized or
//! the item set changes.
//!
//! ## Key Features
//!
//! - Greedy, order-preserving overflow classification
//! - Frame-coalesced re-layout with a re-entrancy guard
//! - Roving keyboard focus for the bar and the dropdown
//! - Outside-click dismissal through a document pointer bus
//! - rat-focus integration for Tab order with the rest of the host

mod app;
mod ui;

use anyhow::Result;
use menubar_util::MenuBarConfig;

pub use ui::components::menu_bar;
pub use ui::theme;

/// Runs the menu bar demo application until Ctrl+C.
///
/// # Errors
///
/// Returns an error when the terminal cannot be put into raw mode, the
/// alternate screen cannot be entered, or drawing fails.
pub async fn run(config: MenuBarConfig) -> Result<()> {
    ui::runtime::run_app(config).await
}
