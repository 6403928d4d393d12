//! Connection settings.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// obs-websocket 4.x default port.
pub const DEFAULT_PORT: u16 = 4444;

// ============================================================================
// ClientConfig
// ============================================================================

/// Where to connect and how chatty to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Echo every decoded inbound frame.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Creates a config for `host:port` with debug off.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            debug: false,
        }
    }

    /// Returns the WebSocket URL, bracketing bare IPv6 addresses.
    #[must_use]
    pub fn ws_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}", self.host, self.port)
        } else {
            format!("ws://{}:{}", self.host, self.port)
        }
    }

    /// Checks that the settings form a usable WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty host, port 0, or a host that
    /// does not parse as part of a URL.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("Host must not be empty"));
        }

        if self.port == 0 {
            return Err(Error::config("Port must not be 0"));
        }

        let url = self.ws_url();
        let parsed =
            Url::parse(&url).map_err(|e| Error::config(format!("Invalid server URL {url}: {e}")))?;

        if parsed.host_str().is_none() || parsed.path() != "/" {
            return Err(Error::config(format!("Invalid server host: {}", self.host)));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
