//! Timing constants shared across the application.

use std::time::Duration;

/// How often each target's snapshot is refreshed in the background.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// How long a single fetch may run before it is abandoned.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
