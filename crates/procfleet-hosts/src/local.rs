//! Local process source backed by sysinfo.

use std::sync::{Arc, Mutex};

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System, Users};

use crate::error::HostError;
use crate::record::{ProcessRecord, ProcessState};
use crate::signal::SignalKind;

/// The local machine's process table.
///
/// sysinfo computes cpu usage as a delta between refreshes, so the `System`
/// is kept alive across fetches instead of rebuilt each time.
#[derive(Debug, Clone)]
pub struct LocalSource {
    system: Arc<Mutex<System>>,
}

impl LocalSource {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }

    /// Refresh and snapshot the process table.
    ///
    /// The sysinfo refresh walks /proc and can take tens of milliseconds, so
    /// it runs on the blocking pool.
    pub async fn fetch(&self) -> Result<Vec<ProcessRecord>, HostError> {
        let system = Arc::clone(&self.system);
        tokio::task::spawn_blocking(move || collect(&system))
            .await
            .map_err(|e| HostError::Unreachable(format!("local collection task failed: {e}")))
    }

    /// Send `kind` to `pid` through the process table.
    pub fn send_signal(&self, pid: i32, kind: SignalKind) -> Result<(), HostError> {
        let mut sys = self.system.lock().unwrap_or_else(|e| e.into_inner());
        sys.refresh_processes(ProcessesToUpdate::All, true);
        let Some(process) = sys.process(Pid::from_u32(pid as u32)) else {
            return Err(HostError::SignalDelivery(format!("pid {pid} not found")));
        };
        match process.kill_with(as_sysinfo_signal(kind)) {
            Some(true) => Ok(()),
            Some(false) => Err(HostError::SignalDelivery(format!(
                "kernel refused {} for pid {pid}",
                kind.name()
            ))),
            None => Err(HostError::SignalDelivery(format!(
                "{} not supported on this platform",
                kind.name()
            ))),
        }
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(system: &Mutex<System>) -> Vec<ProcessRecord> {
    let mut sys = system.lock().unwrap_or_else(|e| e.into_inner());
    sys.refresh_processes(ProcessesToUpdate::All, true);
    let users = Users::new_with_refreshed_list();
    let total_memory = sys.total_memory();

    let mut records: Vec<ProcessRecord> = sys
        .processes()
        .iter()
        .map(|(pid, process)| {
            let owner = process
                .user_id()
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|u| u.name().to_string())
                .unwrap_or_else(|| "?".to_string());
            let mem_percent = if total_memory > 0 {
                process.memory() as f32 / total_memory as f32 * 100.0
            } else {
                0.0
            };
            let command = if process.cmd().is_empty() {
                process.name().to_string_lossy().into_owned()
            } else {
                process
                    .cmd()
                    .iter()
                    .map(|s| s.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            ProcessRecord {
                pid: pid.as_u32() as i32,
                owner,
                cpu_percent: process.cpu_usage(),
                mem_percent,
                state: map_status(process.status()),
                command,
            }
        })
        .collect();
    // sysinfo hands back a hash map; keep the table order stable.
    records.sort_by_key(|r| r.pid);
    records
}

fn map_status(status: ProcessStatus) -> ProcessState {
    match status {
        ProcessStatus::Run => ProcessState::Running,
        ProcessStatus::Sleep => ProcessState::Sleeping,
        ProcessStatus::UninterruptibleDiskSleep => ProcessState::DiskSleep,
        ProcessStatus::Idle => ProcessState::Idle,
        ProcessStatus::Zombie => ProcessState::Zombie,
        ProcessStatus::Stop => ProcessState::Stopped,
        ProcessStatus::Tracing => ProcessState::Tracing,
        ProcessStatus::Dead => ProcessState::Dead,
        other => ProcessState::from_char(other.to_string().chars().next().unwrap_or('?')),
    }
}

fn as_sysinfo_signal(kind: SignalKind) -> sysinfo::Signal {
    match kind {
        SignalKind::Pause => sysinfo::Signal::Stop,
        SignalKind::Terminate => sysinfo::Signal::Term,
        SignalKind::ForceKill => sysinfo::Signal::Kill,
        SignalKind::Resume => sysinfo::Signal::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_reports_this_process() {
        let source = LocalSource::new();
        let records = source.fetch().await.unwrap();
        assert!(!records.is_empty());
        let me = std::process::id() as i32;
        assert!(records.iter().any(|r| r.pid == me));
    }

    #[tokio::test]
    async fn snapshot_is_sorted_by_pid() {
        let source = LocalSource::new();
        let records = source.fetch().await.unwrap();
        assert!(records.windows(2).all(|w| w[0].pid <= w[1].pid));
    }

    #[test]
    fn signal_to_missing_pid_fails() {
        let source = LocalSource::new();
        // pid 0 is the kernel scheduler and never appears in the table
        let err = source.send_signal(0, SignalKind::Resume).unwrap_err();
        assert!(matches!(err, HostError::SignalDelivery(_)));
    }
}
