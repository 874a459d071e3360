//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `REWARDS_*` environment variables and an
//! optional configuration file, merged by `ortho_config`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_BIND_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 12;

/// Errors raised when settings are loaded but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The token signing secret is blank.
    #[error("auth_secret must not be empty")]
    EmptyAuthSecret,
    /// The bind host does not parse as an IP address.
    #[error("invalid bind_host {value:?}")]
    InvalidBindHost {
        /// Raw configured value.
        value: String,
    },
}

/// Runtime configuration for the rewards backend.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REWARDS")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Secret used to sign bearer tokens.
    pub auth_secret: String,
    /// Address the HTTP server binds to.
    pub bind_host: Option<String>,
    /// Port the HTTP server binds to.
    pub bind_port: Option<u16>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Argon2 memory cost override in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 iteration count override.
    pub hash_iterations: Option<u32>,
    /// Apply pending migrations before serving; enabled when unset.
    pub run_migrations: Option<bool>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &"<redacted>")
            .field("auth_secret", &"<redacted>")
            .field("bind_host", &self.bind_host)
            .field("bind_port", &self.bind_port)
            .field("pool_max_size", &self.pool_max_size)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl AppSettings {
    /// Socket address for the HTTP listener, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindHost`] when `bind_host` is not an
    /// IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = match self.bind_host.as_deref() {
            None => DEFAULT_BIND_ADDR,
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| SettingsError::InvalidBindHost {
                    value: raw.to_owned(),
                })?,
        };
        Ok(SocketAddr::new(
            host,
            self.bind_port.unwrap_or(DEFAULT_BIND_PORT),
        ))
    }

    /// Pool size, falling back to the default.
    #[must_use]
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Whether pending migrations run at startup, defaulting to `true`.
    #[must_use]
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Argon2 cost override, present only when both values are configured.
    #[must_use]
    pub const fn hash_cost(&self) -> Option<(u32, u32)> {
        match (self.hash_memory_kib, self.hash_iterations) {
            (Some(memory), Some(iterations)) => Some((memory, iterations)),
            _ => None,
        }
    }

    /// Token signing secret bytes.
    ///
    /// # Errors
    /// Returns [`SettingsError::EmptyAuthSecret`] when the secret is blank.
    pub fn auth_secret(&self) -> Result<&[u8], SettingsError> {
        if self.auth_secret.trim().is_empty() {
            return Err(SettingsError::EmptyAuthSecret);
        }
        Ok(self.auth_secret.as_bytes())
    }
}
