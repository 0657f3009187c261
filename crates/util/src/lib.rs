pub mod config;
pub mod text;

pub use config::*;
pub use text::*;
