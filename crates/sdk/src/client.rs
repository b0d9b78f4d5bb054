//! Main client for the Harvest SDK.

use crate::api::*;
use crate::config::{ClientConfig, RetryConfig, DEFAULT_BASE_URL};
use crate::credentials::{CredentialProvider, Credentials, EnvCredentials};
use crate::error::HarvestResult;
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the Harvest API.
#[derive(Clone)]
pub struct HarvestClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl HarvestClient {
    /// Create a new client builder.
    pub fn builder() -> HarvestClientBuilder {
        HarvestClientBuilder::new()
    }

    fn from_config(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> HarvestResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone(), credentials)?;

        Ok(Self { config, http })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credentials the next request would be sent with.
    pub fn current_credentials(&self) -> HarvestResult<Credentials> {
        self.http.credentials()
    }

    /// Get the project assignments API.
    pub fn project_assignments(&self) -> ProjectAssignmentsApi<'_> {
        ProjectAssignmentsApi::new(self)
    }

    /// Get the time entries API.
    pub fn time_entries(&self) -> TimeEntriesApi<'_> {
        TimeEntriesApi::new(self)
    }
}

/// Builder for creating a HarvestClient.
pub struct HarvestClientBuilder {
    base_url: String,
    timeout: Duration,
    retry_config: RetryConfig,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl HarvestClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            credentials: None,
        }
    }

    /// Override the base URL of the Harvest API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the credential provider. Defaults to reading the environment.
    pub fn credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Build the client.
    pub fn build(self) -> HarvestResult<HarvestClient> {
        let mut config = ClientConfig::new(Url::parse(&self.base_url)?);
        config.timeout = self.timeout;
        config.retry_config = self.retry_config;

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(EnvCredentials::new()));

        HarvestClient::from_config(config, credentials)
    }
}

impl Default for HarvestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
