//! procfleet-tui: the interactive terminal interface.
//!
//! One tab per monitored machine, each showing that machine's process
//! table. The [`App`](app::App) owns the main loop; views are built from
//! [`Component`](components::Component) implementations.

pub mod action;
pub mod app;
pub mod components;
pub mod tui;

pub use app::App;
