//! # Server Configuration
//!
//! Built from environment variables at startup. The token signing secret is
//! mandatory and only ever enters the process through `FREX_TOKEN_SECRET` —
//! there is no default and no fallback literal.

use thiserror::Error;

use frex_auth::TokenTtls;

/// Environment variable holding the HMAC token signing secret.
pub const TOKEN_SECRET_VAR: &str = "FREX_TOKEN_SECRET";

/// Configuration errors at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds an unparsable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidVar {
        /// The offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to bind (default 3333).
    pub port: u16,
    /// HMAC token signing secret. Never logged.
    pub token_secret: Vec<u8>,
    /// Token lifetimes per login surface.
    pub ttls: TokenTtls,
    /// Initial administrator account, created at startup. Without one, a
    /// fresh in-memory deployment has no principal able to create shipments.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Initial administrator credentials.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    /// Display name (default "Administrator").
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// - `FREX_PORT` — TCP port, default 3333.
    /// - `FREX_TOKEN_SECRET` — required, non-empty.
    /// - `FREX_DRIVER_TOKEN_TTL_SECS` / `FREX_WEB_TOKEN_TTL_SECS` — optional
    ///   TTL overrides in seconds.
    /// - `FREX_ADMIN_EMAIL` + `FREX_ADMIN_PASSWORD` (+ optional
    ///   `FREX_ADMIN_NAME`) — bootstrap administrator; both or neither.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("FREX_PORT") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidVar {
                var: "FREX_PORT",
                reason: format!("{e}"),
            })?,
            Err(_) => 3333,
        };

        let token_secret = std::env::var(TOKEN_SECRET_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar(TOKEN_SECRET_VAR))?
            .into_bytes();

        let defaults = TokenTtls::default();
        let ttls = TokenTtls {
            driver_secs: ttl_var("FREX_DRIVER_TOKEN_TTL_SECS", defaults.driver_secs)?,
            web_secs: ttl_var("FREX_WEB_TOKEN_TTL_SECS", defaults.web_secs)?,
        };

        let bootstrap_admin = match (
            std::env::var("FREX_ADMIN_EMAIL").ok(),
            std::env::var("FREX_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: std::env::var("FREX_ADMIN_NAME")
                    .unwrap_or_else(|_| "Administrator".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingVar("FREX_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::MissingVar("FREX_ADMIN_EMAIL")),
        };

        Ok(Self {
            port,
            token_secret,
            ttls,
            bootstrap_admin,
        })
    }
}

fn ttl_var(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    let secs: i64 = raw.parse().map_err(|e| ConfigError::InvalidVar {
        var,
        reason: format!("{e}"),
    })?;
    if secs <= 0 {
        return Err(ConfigError::InvalidVar {
            var,
            reason: "TTL must be positive".to_string(),
        });
    }
    Ok(secs)
}
