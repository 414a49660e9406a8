//! Actions for the procfleet TUI
//!
//! Actions represent events that can modify application state.

use procfleet_hosts::SignalKind;

/// Actions that can be dispatched in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Refresh the active tab / every tab
    Refresh,
    RefreshAll,
    ToggleAutoRefresh,

    /// Send a signal to the selected process
    Signal(SignalKind),

    ToggleHelp,
    Tick,
}
