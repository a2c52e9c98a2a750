use crate::error::ConfigError;
use std::net::{Ipv4Addr, SocketAddr};
use tandem_core::utils::DEFAULT_PORT;

/// Relay process settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    /// Capacity of the command channel feeding the relay task.
    pub command_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            command_buffer: 256,
        }
    }
}

impl RelayConfig {
    /// Reads `PORT`; anything unset falls back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?;
        }

        Ok(config)
    }

    /// Listens on every interface.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
