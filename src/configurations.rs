//! Parses the plain-text configuration file that maps each role to the
//! multicast group it listens on.
//!
//! Each line has the shape `<role> <host> <port>`, where role is one of
//! `clients`, `proposers`, `acceptors`, `learners`. This is the line format
//! the original implementation's `parse_cfg` reads; it is kept verbatim
//! rather than going through the teacher's TOML-based `config` crate,
//! because the spec's authoritative config format is this one, not TOML
//! (see DESIGN.md).

use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use crate::error::ConfigError;

/// The four multicast groups a fully configured deployment needs.
#[derive(Debug, Clone, Copy)]
pub struct Topology {
    pub clients: SocketAddrV4,
    pub proposers: SocketAddrV4,
    pub acceptors: SocketAddrV4,
    pub learners: SocketAddrV4,
}

impl Topology {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_str_records(&contents)
    }

    fn from_str_records(contents: &str) -> Result<Self, ConfigError> {
        let mut clients = None;
        let mut proposers = None;
        let mut acceptors = None;
        let mut learners = None;

        for (line_no, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (role, host, port) = match (fields.next(), fields.next(), fields.next()) {
                (Some(role), Some(host), Some(port)) if fields.next().is_none() => {
                    (role, host, port)
                }
                _ => {
                    return Err(ConfigError::Malformed {
                        line_no: line_no + 1,
                        line: line.to_string(),
                    })
                }
            };

            let host = Ipv4Addr::from_str(host).map_err(|source| ConfigError::BadHost {
                line_no: line_no + 1,
                source,
            })?;
            let port: u16 = port.parse().map_err(|source| ConfigError::BadPort {
                line_no: line_no + 1,
                source,
            })?;
            let addr = SocketAddrV4::new(host, port);

            match role {
                "clients" => clients = Some(addr),
                "proposers" => proposers = Some(addr),
                "acceptors" => acceptors = Some(addr),
                "learners" => learners = Some(addr),
                _ => {
                    return Err(ConfigError::Malformed {
                        line_no: line_no + 1,
                        line: line.to_string(),
                    })
                }
            }
        }

        Ok(Topology {
            clients: clients.ok_or_else(|| ConfigError::MissingRole("clients".to_string()))?,
            proposers: proposers
                .ok_or_else(|| ConfigError::MissingRole("proposers".to_string()))?,
            acceptors: acceptors
                .ok_or_else(|| ConfigError::MissingRole("acceptors".to_string()))?,
            learners: learners
                .ok_or_else(|| ConfigError::MissingRole("learners".to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
clients 239.0.0.1 9000
proposers 239.0.0.1 9001
acceptors 239.0.0.1 9002
learners 239.0.0.1 9003
";

    #[test]
    fn parses_a_complete_config() {
        let topology = Topology::from_str_records(SAMPLE).unwrap();
        assert_eq!(topology.clients.port(), 9000);
        assert_eq!(topology.learners.port(), 9003);
    }

    #[test]
    fn ignores_blank_lines() {
        let with_blanks = format!("\n{}\n\n", SAMPLE);
        assert!(Topology::from_str_records(&with_blanks).is_ok());
    }

    #[test]
    fn rejects_missing_role() {
        let missing_learners = "\
clients 239.0.0.1 9000
proposers 239.0.0.1 9001
acceptors 239.0.0.1 9002
";
        match Topology::from_str_records(missing_learners) {
            Err(ConfigError::MissingRole(role)) => assert_eq!(role, "learners"),
            other => panic!("expected MissingRole, got {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_line() {
        let bad = "clients only-two-fields\n";
        assert!(matches!(
            Topology::from_str_records(bad),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_bad_port() {
        let bad = "clients 239.0.0.1 not-a-port\n";
        assert!(matches!(
            Topology::from_str_records(bad),
            Err(ConfigError::BadPort { .. })
        ));
    }
}
