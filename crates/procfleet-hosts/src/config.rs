//! Remote host configuration.
//!
//! Hosts come from a plain text file with one colon-separated entry per
//! line: `name:host:port:user:password:type`. Blank lines and lines
//! starting with `#` are skipped, as are lines with fewer than six fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Port used when an entry leaves the port field empty or unparseable.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// The only backend type this build supports.
pub const SSH_BACKEND: &str = "ssh";

/// A remote machine whose process table can be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    /// Display name shown on the tab strip.
    pub name: String,
    /// Hostname or address ssh connects to.
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Stored for future backends; ssh runs with BatchMode and never uses it.
    pub password: String,
    /// Backend type string, normally [`SSH_BACKEND`].
    pub backend: String,
}

impl RemoteHost {
    /// The `user@host` form ssh takes as its destination.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// Load remote host entries from `path`.
///
/// A missing or unreadable file is an error; a readable file with no valid
/// entries yields an empty list.
pub fn load_remote_config(path: impl AsRef<Path>) -> Result<Vec<RemoteHost>, HostError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_remote_config(&contents))
}

fn parse_remote_config(contents: &str) -> Vec<RemoteHost> {
    let mut hosts = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_entry(line) {
            Some(host) => hosts.push(host),
            None => tracing::warn!("skipping malformed host entry: {line}"),
        }
    }
    hosts
}

fn parse_entry(line: &str) -> Option<RemoteHost> {
    let fields: Vec<&str> = line.splitn(6, ':').collect();
    if fields.len() < 6 {
        return None;
    }
    let port = match fields[2].parse::<u16>() {
        Ok(p) if p > 0 => p,
        _ => DEFAULT_SSH_PORT,
    };
    let backend = if fields[5].is_empty() {
        SSH_BACKEND.to_string()
    } else {
        fields[5].to_string()
    };
    Some(RemoteHost {
        name: fields[0].to_string(),
        host: fields[1].to_string(),
        port,
        username: fields[3].to_string(),
        password: fields[4].to_string(),
        backend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_entry() {
        let hosts = parse_remote_config("web1:web1.example.com:2222:deploy:secret:ssh\n");
        assert_eq!(
            hosts,
            vec![RemoteHost {
                name: "web1".to_string(),
                host: "web1.example.com".to_string(),
                port: 2222,
                username: "deploy".to_string(),
                password: "secret".to_string(),
                backend: "ssh".to_string(),
            }]
        );
    }

    #[test]
    fn skips_comments_blanks_and_short_lines() {
        let contents = "\
# fleet hosts
web1:web1.example.com:22:deploy:pw:ssh

broken:entry
db1:db1.example.com:22:admin:pw:ssh
";
        let hosts = parse_remote_config(contents);
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].name, "web1");
        assert_eq!(hosts[1].name, "db1");
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let hosts = parse_remote_config("h:example.com:nope:root:pw:ssh\nz:example.com:0:root:pw:ssh\n");
        assert_eq!(hosts[0].port, DEFAULT_SSH_PORT);
        assert_eq!(hosts[1].port, DEFAULT_SSH_PORT);
    }

    #[test]
    fn empty_backend_defaults_to_ssh() {
        let hosts = parse_remote_config("h:example.com:22:root:pw:\n");
        assert_eq!(hosts[0].backend, SSH_BACKEND);
    }

    #[test]
    fn password_colons_are_not_supported() {
        // splitn(6) hands everything after the fifth colon to the backend
        // field, so a colon in the password ends up there instead.
        let hosts = parse_remote_config("h:example.com:22:root:pw:extra:ssh\n");
        assert_eq!(hosts[0].password, "pw");
        assert_eq!(hosts[0].backend, "extra:ssh");
    }

    #[test]
    fn destination_joins_user_and_host() {
        let hosts = parse_remote_config("h:example.com:22:deploy:pw:ssh\n");
        assert_eq!(hosts[0].destination(), "deploy@example.com");
    }
}
