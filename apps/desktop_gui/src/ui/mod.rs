//! UI layer for desktop GUI: landing panel and chat modal.

pub mod app;

pub use app::{ChatWidgetApp, StartupConfig};
