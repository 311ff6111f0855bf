//! Reachability probes used to skip dead DCs before querying them.

use super::{cli, ReachabilityProbe};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const PING_SLACK: Duration = Duration::from_secs(2);

/// TCP connect to the DNS port.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub port: u16,
    pub timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, timeout: Duration) -> TcpProbe {
        TcpProbe { port, timeout }
    }
}

impl ReachabilityProbe for TcpProbe {
    fn is_reachable(&self, host: &str) -> bool {
        let addrs = match (host, self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                log::debug!("probe: cannot resolve {host}: {e}");
                return false;
            }
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => log::debug!("probe: {addr} not reachable: {e}"),
            }
        }
        false
    }
}

/// Single ICMP echo through the system `ping`.
#[derive(Debug, Clone)]
pub struct PingProbe {
    pub timeout: Duration,
}

impl PingProbe {
    fn command(&self, host: &str) -> String {
        if cfg!(windows) {
            format!("ping -n 1 -w {} {host}", self.timeout.as_millis())
        } else {
            format!("ping -c 1 -W {} {host}", self.timeout.as_secs().max(1))
        }
    }
}

impl ReachabilityProbe for PingProbe {
    fn is_reachable(&self, host: &str) -> bool {
        // ping enforces its own timeout; the slack only covers process start
        match cli::run(&self.command(host), self.timeout + PING_SLACK) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("probe: ping {host} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let probe = TcpProbe::new(port, Duration::from_millis(500));
        assert!(probe.is_reachable("127.0.0.1"));
    }

    #[test]
    fn test_tcp_probe_unresolvable() {
        let probe = TcpProbe::new(53, Duration::from_millis(100));
        assert!(!probe.is_reachable("not a hostname"));
    }

    #[test]
    fn test_ping_command() {
        let probe = PingProbe {
            timeout: Duration::from_millis(1500),
        };
        let cmd = probe.command("dc1");
        assert!(cmd.starts_with("ping "));
        assert!(cmd.ends_with(" dc1"));
    }
}
