// crates/server/src/config.rs
//! Server configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use task_caching_jobs::DEFAULT_REPORT_DELAY;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address (all interfaces).
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Simulated duration of a report job.
    pub report_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            report_delay: DEFAULT_REPORT_DELAY,
        }
    }
}

impl Config {
    /// Load from process environment variables.
    ///
    /// - `TASK_CACHING_HOST` — bind address (default `0.0.0.0`)
    /// - `TASK_CACHING_PORT`, then `PORT` — listen port (default 8000)
    /// - `TASK_CACHING_REPORT_DELAY_MS` — report job duration (default 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Unparseable values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = parse_var(&lookup, "TASK_CACHING_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "TASK_CACHING_PORT")
            .or_else(|| parse_var(&lookup, "PORT"))
            .unwrap_or(defaults.port);
        let report_delay = parse_var(&lookup, "TASK_CACHING_REPORT_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.report_delay);

        Self {
            host,
            port,
            report_delay,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid config value");
            None
        }
    }
}
