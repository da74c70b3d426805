//! Runtime configuration.
//!
//! Every field but `base_url` has a default matching the stock front end.
//! The API origin has no sensible default, so `base_url` starts empty and
//! [`crate::SessionContext::from_config`] refuses to build without it.
//! [`RealmgateConfig::from_env`] overrides a few of them from the process
//! environment (and a `.env` file, if present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use realmgate_gateway::Messages;
use realmgate_guard::GuardPaths;

use crate::RealmgateError;

/// Base URL the HTTP client prefixes onto every path.
pub const ENV_BASE_URL: &str = "REALMGATE_BASE_URL";
/// Request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "REALMGATE_TIMEOUT_SECS";
/// JSON file holding the persisted tokens.
pub const ENV_STORAGE_PATH: &str = "REALMGATE_STORAGE_PATH";
/// Route the guard sends unauthorized admins to.
pub const ENV_FORBIDDEN_PATH: &str = "REALMGATE_FORBIDDEN_PATH";

/// Settings for a [`crate::SessionContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmgateConfig {
    /// Absolute API origin, e.g. `https://api.example.com`. Required by
    /// [`crate::SessionContext::from_config`]; unused with a custom transport.
    pub base_url: String,
    pub timeout: Duration,
    /// Where tokens persist. `None` keeps them in memory.
    pub storage_path: Option<PathBuf>,
    /// Login, forbidden, and redirect-parameter locations.
    pub paths: GuardPaths,
    /// Where a completed admin login lands without a pending redirect.
    pub admin_home: String,
    /// Where a completed account login lands without a pending redirect.
    pub account_home: String,
    pub messages: Messages,
}

impl Default for RealmgateConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(15),
            storage_path: None,
            paths: GuardPaths::default(),
            admin_home: "/admin".to_string(),
            account_home: "/".to_string(),
            messages: Messages::default(),
        }
    }
}

impl RealmgateConfig {
    /// Loads `.env` (if any) and reads overrides from the environment.
    ///
    /// # Errors
    /// Returns [`RealmgateError::Config`] if `REALMGATE_TIMEOUT_SECS` isn't
    /// a positive integer.
    pub fn from_env() -> Result<Self, RealmgateError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads overrides through `lookup` instead of the process environment.
    ///
    /// # Errors
    /// As [`RealmgateConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RealmgateError> {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base_url) = get(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| RealmgateError::Config(format!("invalid {ENV_TIMEOUT_SECS} value '{raw}': {e}")))?;
            if secs == 0 {
                return Err(RealmgateError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get(ENV_STORAGE_PATH) {
            config.storage_path = Some(PathBuf::from(path));
        }
        if let Some(forbidden) = get(ENV_FORBIDDEN_PATH) {
            config.paths.forbidden = forbidden;
        }
        Ok(config)
    }
}
