//! procfleet-hosts: process table backends for procfleet
//!
//! This crate knows how to obtain a process snapshot from a machine and how
//! to deliver control signals to a pid on that machine. Two backends exist:
//! the local kernel process table (via sysinfo) and remote hosts reached
//! through an ssh subprocess. Everything above this crate talks to the
//! [`ProcessSource`] enum and never cares which backend it is.
//!
//! # Example
//!
//! ```no_run
//! use procfleet_hosts::ProcessSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ProcessSource::local();
//!     let snapshot = source.fetch().await?;
//!     println!("{} processes", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod local;
pub mod record;
mod remote;
pub mod signal;
pub mod source;

pub use config::{DEFAULT_SSH_PORT, RemoteHost, SSH_BACKEND, load_remote_config};
pub use error::HostError;
pub use record::{ProcessRecord, ProcessState};
pub use signal::SignalKind;
pub use source::ProcessSource;
