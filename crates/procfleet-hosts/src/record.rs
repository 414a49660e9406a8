//! Process records and their states.

use serde::{Deserialize, Serialize};

/// One row of a process snapshot.
///
/// `pid` is the identity key: when a snapshot is replaced, the selected row
/// is rehomed by pid, not by position. Uniqueness of pid within a snapshot
/// is assumed but not verified; a backend may report duplicates transiently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    /// Owning user name, `"?"` when it could not be resolved.
    pub owner: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub state: ProcessState,
    /// Full command line when available, otherwise the short command name.
    pub command: String,
}

/// Linux-style process state, keyed by the character `ps` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// R - running or runnable
    Running,
    /// S - interruptible sleep
    Sleeping,
    /// D - uninterruptible sleep (usually I/O)
    DiskSleep,
    /// I - idle kernel thread
    Idle,
    /// Z - zombie (terminated but not reaped by parent)
    Zombie,
    /// T - stopped by signal or debugger
    Stopped,
    /// t - tracing stop
    Tracing,
    /// X - dead
    Dead,
    /// Anything else, keeping the character the backend reported
    Unknown(char),
}

impl ProcessState {
    /// Parse from the first character of a `ps` STAT column.
    pub fn from_char(c: char) -> Self {
        match c {
            'R' => ProcessState::Running,
            'S' => ProcessState::Sleeping,
            'D' => ProcessState::DiskSleep,
            'I' => ProcessState::Idle,
            'Z' => ProcessState::Zombie,
            'T' => ProcessState::Stopped,
            't' => ProcessState::Tracing,
            'X' => ProcessState::Dead,
            other => ProcessState::Unknown(other),
        }
    }

    /// Single-character representation for table display.
    pub fn short(&self) -> char {
        match self {
            ProcessState::Running => 'R',
            ProcessState::Sleeping => 'S',
            ProcessState::DiskSleep => 'D',
            ProcessState::Idle => 'I',
            ProcessState::Zombie => 'Z',
            ProcessState::Stopped => 'T',
            ProcessState::Tracing => 't',
            ProcessState::Dead => 'X',
            ProcessState::Unknown(c) => *c,
        }
    }

    /// Human-readable description for detail views.
    pub fn description(&self) -> &'static str {
        match self {
            ProcessState::Running => "Running",
            ProcessState::Sleeping => "Sleeping",
            ProcessState::DiskSleep => "Disk Sleep",
            ProcessState::Idle => "Idle",
            ProcessState::Zombie => "Zombie",
            ProcessState::Stopped => "Stopped",
            ProcessState::Tracing => "Tracing",
            ProcessState::Dead => "Dead",
            ProcessState::Unknown(_) => "Unknown",
        }
    }
}
