//! UI rendering module for the menu bar host.
//!
//! This module provides the components, the main view layout, the theme and
//! the runtime event loop.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
