//! UI layer for desktop GUI: app shell, surface state and widgets.

pub mod app;
pub mod surface;
pub mod widgets;

pub use app::AnalyzerApp;
