//! Error taxonomy for process sources.

use thiserror::Error;

/// Errors a process source can surface.
///
/// None of these is fatal to the interactive session: an unreachable or
/// unsupported source aborts a single fetch and leaves the caller's previous
/// snapshot intact, and a failed signal delivery is reported once and never
/// retried.
#[derive(Debug, Error)]
pub enum HostError {
    /// The backend could not be contacted or enumerated.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// A configured backend type this build does not know how to talk to.
    #[error("unsupported backend type '{0}'")]
    UnsupportedBackend(String),

    /// A control signal could not be delivered to a specific pid.
    #[error("signal delivery failed: {0}")]
    SignalDelivery(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
