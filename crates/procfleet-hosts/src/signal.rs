//! Control signals the operator can send to a selected process.

use serde::{Deserialize, Serialize};

/// Signal kinds supported by the dispatcher.
///
/// Mapped 1:1 to POSIX STOP/TERM/KILL/CONT, locally through the process
/// table and remotely through `kill -<NAME>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    /// SIGSTOP - suspend the process
    Pause,
    /// SIGTERM - ask the process to exit
    Terminate,
    /// SIGKILL - kill the process immediately
    ForceKill,
    /// SIGCONT - resume a stopped process
    Resume,
}

impl SignalKind {
    /// POSIX signal name without the SIG prefix, as `kill -<NAME>` takes it.
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Pause => "STOP",
            SignalKind::Terminate => "TERM",
            SignalKind::ForceKill => "KILL",
            SignalKind::Resume => "CONT",
        }
    }

    /// Verb for status lines and key hints.
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Pause => "pause",
            SignalKind::Terminate => "terminate",
            SignalKind::ForceKill => "kill",
            SignalKind::Resume => "resume",
        }
    }
}
