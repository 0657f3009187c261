//! Theme styling for the menu bar: semantic roles, the Nord palette, and
//! helper builders for ratatui widgets and styles.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::Theme;
