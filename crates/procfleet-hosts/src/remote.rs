//! SSH-backed process source.
//!
//! Remote listings run `ps -e -o pid,user,pcpu,pmem,stat,args` over an ssh
//! subprocess and parse the six-column output. Signals go out the same way
//! as `kill -<NAME> <pid>`. Arguments are always passed as a structured
//! argv, never concatenated into a shell string.

use std::process::Output;

use tokio::process::Command;

use crate::config::RemoteHost;
use crate::error::HostError;
use crate::record::{ProcessRecord, ProcessState};
use crate::signal::SignalKind;

const CONNECT_TIMEOUT_SECS: u32 = 5;

const PS_ARGS: [&str; 4] = ["ps", "-e", "-o", "pid,user,pcpu,pmem,stat,args"];

/// Fetch the process table from `host` over ssh.
pub async fn fetch_remote(host: &RemoteHost) -> Result<Vec<ProcessRecord>, HostError> {
    let output = exec_ssh(host, &PS_ARGS).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Unreachable(format!(
            "{}: {}",
            host.destination(),
            stderr.trim()
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_listing(&stdout))
}

/// Deliver `kind` to `pid` on `host`.
pub async fn signal_remote(host: &RemoteHost, pid: i32, kind: SignalKind) -> Result<(), HostError> {
    let flag = format!("-{}", kind.name());
    let pid_arg = pid.to_string();
    let args = ["kill", flag.as_str(), pid_arg.as_str()];
    let output = exec_ssh(host, &args)
        .await
        .map_err(|e| HostError::SignalDelivery(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::SignalDelivery(format!(
            "kill -{} {} on {}: {}",
            kind.name(),
            pid,
            host.name,
            stderr.trim()
        )));
    }
    Ok(())
}

async fn exec_ssh(host: &RemoteHost, remote_args: &[&str]) -> Result<Output, HostError> {
    let port = host.port.to_string();
    let connect_timeout = format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}");
    let destination = host.destination();
    tracing::debug!("ssh {destination} {remote_args:?}");
    Command::new("ssh")
        .args(["-p", port.as_str()])
        .args(["-o", "BatchMode=yes"])
        .args(["-o", connect_timeout.as_str()])
        .arg(&destination)
        .args(remote_args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| HostError::Unreachable(format!("{destination}: {e}")))
}

/// Parse full `ps` output, skipping the header line.
fn parse_listing(stdout: &str) -> Vec<ProcessRecord> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| {
            let record = parse_row(line);
            if record.is_none() && !line.trim().is_empty() {
                tracing::debug!("dropping unparseable ps row: {line}");
            }
            record
        })
        .collect()
}

/// Parse one `ps` row: five whitespace-delimited columns, then the rest of
/// the line as the command. The command keeps its internal spacing.
fn parse_row(line: &str) -> Option<ProcessRecord> {
    let (pid, rest) = split_field(line)?;
    let (user, rest) = split_field(rest)?;
    let (cpu, rest) = split_field(rest)?;
    let (mem, rest) = split_field(rest)?;
    let (stat, rest) = split_field(rest)?;
    let command = rest.trim();
    if command.is_empty() {
        return None;
    }
    Some(ProcessRecord {
        pid: pid.parse().ok()?,
        owner: user.to_string(),
        cpu_percent: cpu.parse().ok()?,
        mem_percent: mem.parse().ok()?,
        state: ProcessState::from_char(stat.chars().next()?),
        command: command.to_string(),
    })
}

/// Split off the first whitespace-delimited field, returning it and the
/// remainder of the line.
fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
  PID USER     %CPU %MEM STAT COMMAND
    1 root      0.0  0.1 Ss   /sbin/init splash
  421 postgres  2.5  4.2 S    postgres: checkpointer
 9310 deploy   98.0  1.0 R    /usr/bin/ffmpeg -i in.mp4 out.webm
";

    #[test]
    fn parses_listing_and_skips_header() {
        let records = parse_listing(LISTING);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].pid, 1);
        assert_eq!(records[0].owner, "root");
        assert_eq!(records[2].state, ProcessState::Running);
    }

    #[test]
    fn command_keeps_rest_of_line() {
        let records = parse_listing(LISTING);
        assert_eq!(records[0].command, "/sbin/init splash");
        assert_eq!(records[1].command, "postgres: checkpointer");
        assert_eq!(records[2].command, "/usr/bin/ffmpeg -i in.mp4 out.webm");
    }

    #[test]
    fn stat_uses_first_char_only() {
        let records = parse_listing(LISTING);
        assert_eq!(records[0].state, ProcessState::Sleeping);
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let stdout = "\
  PID USER     %CPU %MEM STAT COMMAND
    1 root      0.0  0.1 Ss   /sbin/init
  bad root      0.0  0.1 S    cmd
    7 root      oops 0.1 S    cmd
    8 root      0.0  0.1 S
";
        let records = parse_listing(stdout);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, 1);
    }

    #[test]
    fn empty_output_yields_empty_snapshot() {
        assert!(parse_listing("").is_empty());
        assert!(parse_listing("  PID USER %CPU %MEM STAT COMMAND\n").is_empty());
    }
}
