//! UI components: the adaptive menu bar.

pub mod component;
pub mod menu_bar;

pub use component::*;
pub use menu_bar::MenuBarComponent;
