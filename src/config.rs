//! Engine configuration.
//!
//! Values come from built-in defaults, then an optional file, then `CAFE_*` environment
//! variables (`CAFE_CANCEL_GRACE_MINUTES=10`). The result is validated before use.

use crate::clients::LookupPolicy;
use crate::model::RevenuePolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub const ENV_PREFIX: &str = "CAFE";

/// Upper bound for any retry count; keeps placement bounded in time.
pub const MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long after placement a customer may self-cancel.
    pub cancel_grace_minutes: u32,
    /// Deadline for a single catalog lookup.
    pub catalog_timeout_ms: u64,
    /// Extra attempts after a timed-out or failed catalog lookup.
    pub catalog_retries: u32,
    /// Attempts at emptying the cart when it changes under a placement.
    pub checkout_retries: u32,
    pub mailbox_size: usize,
    /// Number of cart actors; carts are spread over them by owner.
    pub cart_shards: usize,
    pub revenue_policy: RevenuePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancel_grace_minutes: 15,
            catalog_timeout_ms: 2_000,
            catalog_retries: 1,
            checkout_retries: 3,
            mailbox_size: 32,
            cart_shards: 8,
            revenue_policy: RevenuePolicy::Broad,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl EngineConfig {
    /// Loads defaults, the optional file at `path`, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!(path = %path.display(), "Loading engine configuration file");
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let engine: EngineConfig = config.try_deserialize()?;
        engine.validate().map_err(|e| {
            error!(error = %e, "Engine configuration rejected");
            e
        })?;
        info!(?engine, "Engine configuration loaded");
        Ok(engine)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.cancel_grace_minutes == 0 {
            return Err(ConfigLoadError::Invalid(
                "cancel_grace_minutes must be at least 1".into(),
            ));
        }
        if self.catalog_timeout_ms == 0 {
            return Err(ConfigLoadError::Invalid(
                "catalog_timeout_ms must be at least 1".into(),
            ));
        }
        if self.mailbox_size == 0 {
            return Err(ConfigLoadError::Invalid(
                "mailbox_size must be at least 1".into(),
            ));
        }
        if self.cart_shards == 0 {
            return Err(ConfigLoadError::Invalid(
                "cart_shards must be at least 1".into(),
            ));
        }
        if self.checkout_retries == 0 {
            return Err(ConfigLoadError::Invalid(
                "checkout_retries must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("catalog_retries", self.catalog_retries),
            ("checkout_retries", self.checkout_retries),
        ] {
            if value > MAX_RETRIES {
                return Err(ConfigLoadError::Invalid(format!(
                    "{name} must be at most {MAX_RETRIES}, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn cancel_grace(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.cancel_grace_minutes))
    }

    pub fn lookup_policy(&self) -> LookupPolicy {
        LookupPolicy {
            timeout: Duration::from_millis(self.catalog_timeout_ms),
            retries: self.catalog_retries,
        }
    }
}
