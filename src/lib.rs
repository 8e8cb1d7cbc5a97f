#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod cache;
pub mod config;
pub mod data;
pub mod hackernews;
pub mod item;
pub mod keymap;
pub mod logger;
pub mod nav;
pub mod render;
pub mod theme;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
