//! Server settings loaded via OrthoConfig.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use pr_reviewer::domain::DEFAULT_MAX_REVIEWERS;
use pr_reviewer::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("max_reviewers must be at least 1")]
    MaxReviewers,
}

/// Runtime configuration for the review service.
///
/// Every field can be set with a `PR_REVIEWER_` environment variable, e.g.
/// `PR_REVIEWER_DATABASE_URL`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PR_REVIEWER")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on reviewers assigned to a new pull request.
    pub max_reviewers: Option<usize>,
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Seed for reproducible reviewer selection.
    pub random_seed: Option<u64>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn max_reviewers(&self) -> Result<usize, SettingsError> {
        match self.max_reviewers.unwrap_or(DEFAULT_MAX_REVIEWERS) {
            0 => Err(SettingsError::MaxReviewers),
            n => Ok(n),
        }
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }
}
