// Library root: re-exports all modules so integration tests can `use vbs::*`.

pub mod app;
pub mod chapters;
pub mod config;
pub mod logging;
pub mod message;
pub mod player;
pub mod theme;
pub mod tui;
pub mod ui;
