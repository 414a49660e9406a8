//! The unified process source.

use crate::config::{RemoteHost, SSH_BACKEND};
use crate::error::HostError;
use crate::local::LocalSource;
use crate::record::ProcessRecord;
use crate::remote;
use crate::signal::SignalKind;

/// A machine whose processes can be listed and signalled.
///
/// Callers fetch snapshots and dispatch signals through this enum without
/// knowing whether the machine is local or reached over ssh.
#[derive(Debug, Clone)]
pub enum ProcessSource {
    Local(LocalSource),
    Remote(RemoteHost),
}

impl ProcessSource {
    pub fn local() -> Self {
        ProcessSource::Local(LocalSource::new())
    }

    /// Wrap a configured remote host. The backend type is not validated
    /// here; a type this build does not speak fails each fetch and dispatch
    /// instead, so a misconfigured host still gets its tab.
    pub fn remote(host: RemoteHost) -> Self {
        ProcessSource::Remote(host)
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ProcessSource::Local(_))
    }

    /// Fetch a fresh process snapshot.
    pub async fn fetch(&self) -> Result<Vec<ProcessRecord>, HostError> {
        match self {
            ProcessSource::Local(local) => local.fetch().await,
            ProcessSource::Remote(host) => {
                ensure_ssh(host)?;
                remote::fetch_remote(host).await
            }
        }
    }

    /// Deliver `kind` to `pid` on this machine.
    pub async fn send_signal(&self, pid: i32, kind: SignalKind) -> Result<(), HostError> {
        match self {
            ProcessSource::Local(local) => local.send_signal(pid, kind),
            ProcessSource::Remote(host) => {
                ensure_ssh(host)?;
                remote::signal_remote(host, pid, kind).await
            }
        }
    }
}

fn ensure_ssh(host: &RemoteHost) -> Result<(), HostError> {
    if host.backend == SSH_BACKEND {
        Ok(())
    } else {
        Err(HostError::UnsupportedBackend(host.backend.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SSH_PORT;

    fn host(backend: &str) -> RemoteHost {
        RemoteHost {
            name: "h".to_string(),
            host: "example.com".to_string(),
            port: DEFAULT_SSH_PORT,
            username: "root".to_string(),
            password: String::new(),
            backend: backend.to_string(),
        }
    }

    #[tokio::test]
    async fn unsupported_backend_fails_at_fetch() {
        let source = ProcessSource::remote(host("telnet"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, HostError::UnsupportedBackend(b) if b == "telnet"));
    }

    #[tokio::test]
    async fn unsupported_backend_fails_at_signal() {
        let source = ProcessSource::remote(host("telnet"));
        let err = source
            .send_signal(1, SignalKind::Terminate)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::UnsupportedBackend(_)));
    }

    #[test]
    fn local_flag() {
        assert!(ProcessSource::local().is_local());
        assert!(!ProcessSource::remote(host("ssh")).is_local());
    }
}
