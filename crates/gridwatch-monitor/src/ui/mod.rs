//! Shared UI helpers.

pub mod theme;

pub use theme::Theme;
