//! Terminal UI for gridwatch.

pub mod app;
pub mod components;
pub mod ui;

pub use app::{App, Command, Tab};
pub use ui::Theme;
