//! Service settings loaded via OrthoConfig.
//!
//! Values come from `SHOTSERVER_*` environment variables, command-line flags
//! and an optional config file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::FactoryViewPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOGIN_URL: &str = "/login";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Runtime configuration for the screenshot factory service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHOTSERVER")]
pub struct AppSettings {
    /// Listen socket, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the service keeps factories in memory.
    pub database_url: Option<String>,
    /// Seconds since the last poll for a factory to count as active.
    #[ortho_config(default = 600)]
    pub last_poll_timeout_secs: u64,
    /// Highest website profanity score whose screenshots are shown.
    #[ortho_config(default = 0)]
    pub profanities_allowed: i32,
    /// Where anonymous visitors of the registration page are sent.
    pub login_url: Option<String>,
    /// File holding the cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated session key outside debug builds.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` attribute on the session cookie. Unset means on.
    pub cookie_secure: Option<bool>,
}

/// Settings that cannot be used as given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
}

impl AppSettings {
    /// Parsed listen socket.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn login_url(&self) -> &str {
        self.login_url.as_deref().unwrap_or(DEFAULT_LOGIN_URL)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Whether the session cookie carries `Secure`, on unless disabled.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Freshness window and profanity threshold for the factory pages.
    pub fn view_policy(&self) -> FactoryViewPolicy {
        FactoryViewPolicy::new(
            Duration::from_secs(self.last_poll_timeout_secs),
            self.profanities_allowed,
        )
    }
}
