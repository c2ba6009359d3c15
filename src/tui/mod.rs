//! Terminal explorer built on ratatui and crossterm.

mod app;
mod ui;

pub use app::ExplorerApp;
pub use ui::parse_css_color;
