//! procfleet-core: the machine registry and per-machine view state.
//!
//! Each monitored machine is a [`Target`]: a process source plus the last
//! snapshot fetched from it and the cursor/scroll state of its table view.
//! The [`TargetRegistry`] owns all targets and tracks which tab is active.
//! Nothing here performs I/O; fetches are spawned by the caller and their
//! results are applied back through [`Target::apply_snapshot`] and
//! [`Target::fetch_failed`].

pub mod constants;
pub mod registry;
pub mod target;

pub use registry::TargetRegistry;
pub use target::Target;
