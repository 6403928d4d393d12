//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`ObsRemote`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use obs_remote::ObsRemote;
//!
//! # fn example() -> obs_remote::Result<()> {
//! let obs = ObsRemote::builder()
//!     .host("192.168.1.20")
//!     .port(4444)
//!     .debug(true)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;

use super::config::ClientConfig;
use super::core::ObsRemote;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring an [`ObsRemote`] instance.
///
/// Use [`ObsRemote::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the server port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Echo every decoded inbound frame through `tracing`.
    #[inline]
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) if host or port is unusable
    pub fn build(self) -> Result<ObsRemote> {
        self.config.validate()?;
        Ok(ObsRemote::with_config(self.config))
    }
}

// ============================================================================
// Tests
// ============================================================================
