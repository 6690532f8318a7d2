//! Connection-level types shared by the invoker and the HTTP transport.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::CoreError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 18081;

/// Path of the JSON-RPC endpoint on the daemon.
pub const JSON_RPC_PATH: &str = "/json_rpc";

// ==============================================================================
// Scheme
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(CoreError::Config(format!(
                "unsupported scheme `{other}`; expected http or https"
            ))),
        }
    }
}

// ==============================================================================
// Credentials
// ==============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ==============================================================================
// Endpoint
// ==============================================================================

/// Where the daemon lives and how to log in to it. Fixed for the lifetime
/// of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl Endpoint {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Full URL every call is posted to.
    pub fn url(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            // Bare IPv6 literal.
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{}://{}:{}{}", self.scheme, host, self.port, JSON_RPC_PATH)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(Scheme::Http, DEFAULT_HOST, DEFAULT_PORT)
    }
}

// ==============================================================================
// Client Configuration
// ==============================================================================

/// Everything needed to build an HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    /// Upper bound on a whole exchange, auth retry excluded.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Optional cap on outbound HTTP requests per second.
    pub requests_per_second: Option<u32>,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            requests_per_second: None,
        }
    }
}

// ==============================================================================
// Raw Response
// ==============================================================================

/// What the transport hands back to the invoker: a successful status and
/// the undecoded body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_points_at_local_daemon() {
        assert_eq!(Endpoint::default().url(), "http://127.0.0.1:18081/json_rpc");
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let endpoint = Endpoint::new(Scheme::Https, "::1", 38081);
        assert_eq!(endpoint.url(), "https://[::1]:38081/json_rpc");
    }

    #[test]
    fn scheme_parse_rejects_unknown() {
        assert_eq!("HTTPS".parse::<Scheme>().expect("https parses"), Scheme::Https);
        let err = "ftp".parse::<Scheme>().expect_err("must reject ftp");
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }
}
