//! Credential resolution for outbound requests.
//!
//! Credentials are looked up right before each request is sent, so a rotated
//! token in the environment is picked up without restarting the process.

use crate::error::{HarvestError, HarvestResult};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Environment variable holding the Harvest account id.
pub const ACCOUNT_ID_VAR: &str = "HARVEST_ACCOUNT_ID";
/// Environment variable holding the personal access token.
pub const ACCESS_TOKEN_VAR: &str = "HARVEST_ACCESS_TOKEN";
/// Environment variable overriding the `User-Agent` identification string.
pub const USER_AGENT_VAR: &str = "HARVEST_USER_AGENT";

/// Identification string sent when no override is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("harvest-sdk/", env!("CARGO_PKG_VERSION"));

/// A resolved set of credentials for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_id: String,
    pub access_token: String,
    pub user_agent: String,
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            access_token: access_token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Values that must never show up in logs or tool output.
    pub fn secrets(&self) -> [&str; 2] {
        [self.access_token.as_str(), self.account_id.as_str()]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Source of the credentials attached to every request.
pub trait CredentialProvider: Send + Sync {
    /// Resolve the credentials to use for the next request.
    fn current(&self) -> HarvestResult<Credentials>;
}

/// Reads credentials from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    account_var: String,
    token_var: String,
    user_agent_var: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_vars(ACCOUNT_ID_VAR, ACCESS_TOKEN_VAR, USER_AGENT_VAR)
    }

    /// Read credentials from custom variable names.
    pub fn with_vars(
        account_var: impl Into<String>,
        token_var: impl Into<String>,
        user_agent_var: impl Into<String>,
    ) -> Self {
        Self {
            account_var: account_var.into(),
            token_var: token_var.into(),
            user_agent_var: user_agent_var.into(),
        }
    }

    /// Check that both mandatory variables are present.
    ///
    /// Meant to be called once at startup; later lookups do no validation.
    pub fn validate(&self) -> HarvestResult<()> {
        if read_var(&self.account_var).is_none() {
            return Err(HarvestError::MissingCredential(ACCOUNT_ID_VAR));
        }
        if read_var(&self.token_var).is_none() {
            return Err(HarvestError::MissingCredential(ACCESS_TOKEN_VAR));
        }
        Ok(())
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn current(&self) -> HarvestResult<Credentials> {
        Ok(Credentials {
            account_id: read_var(&self.account_var).unwrap_or_default(),
            access_token: read_var(&self.token_var).unwrap_or_default(),
            user_agent: read_var(&self.user_agent_var)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fixed credentials that can be swapped at runtime.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    inner: Arc<RwLock<Credentials>>,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credentials)),
        }
    }

    /// Replace the credentials used by subsequent requests.
    pub fn rotate(&self, credentials: Credentials) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = credentials;
    }
}

impl CredentialProvider for StaticCredentials {
    fn current(&self) -> HarvestResult<Credentials> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }
}
