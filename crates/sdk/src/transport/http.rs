//! HTTP transport layer for the Harvest SDK.

use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, Credentials};
use crate::error::{HarvestError, HarvestResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the Harvest account id.
pub const ACCOUNT_ID_HEADER: &str = "harvest-account-id";

/// HTTP transport for making API requests.
///
/// Authentication headers are attached to each request right before it is
/// sent, using whatever the credential provider returns at that moment.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(
        config: Arc<ClientConfig>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> HarvestResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Credentials the next request would be sent with.
    pub fn credentials(&self) -> HarvestResult<Credentials> {
        self.credentials.current()
    }

    /// Build a URL for the given path, relative to the API base.
    fn build_url(&self, path: &str) -> HarvestResult<url::Url> {
        let relative = path.trim_start_matches('/');
        Ok(self.config.base_url.join(relative)?)
    }

    /// Attach the current credentials to a request.
    fn authorize(&self, request: RequestBuilder) -> HarvestResult<RequestBuilder> {
        let credentials = self.credentials.current()?;

        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|_| HarvestError::Config("Access token is not a valid header value".to_string()))?;
        let account = header::HeaderValue::from_str(&credentials.account_id)
            .map_err(|_| HarvestError::Config("Account id is not a valid header value".to_string()))?;
        let user_agent = header::HeaderValue::from_str(&credentials.user_agent)
            .map_err(|_| HarvestError::Config("User agent is not a valid header value".to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::HeaderName::from_static(ACCOUNT_ID_HEADER), account);
        headers.insert(header::USER_AGENT, user_agent);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // `headers` replaces values set earlier, e.g. by `.json()`.
        Ok(request.headers(headers))
    }

    /// Send a request exactly once.
    async fn execute_once(&self, request_builder: RequestBuilder) -> HarvestResult<Response> {
        let response = self.authorize(request_builder)?.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(HarvestError::from_response(status, &body))
    }

    /// Send an idempotent request, retrying on transient failures.
    async fn execute_with_retry(&self, request_builder: RequestBuilder) -> HarvestResult<Response> {
        let retry_config = &self.config.retry_config;
        let mut attempts = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| HarvestError::Config("Request cannot be cloned".to_string()))?;

            match self.authorize(request)?.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    if attempts < retry_config.max_retries
                        && retry_config.should_retry_status(status)
                    {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            status = status,
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(HarvestError::from_response(status, &body));
                }
                Err(e) => {
                    if attempts < retry_config.max_retries && (e.is_timeout() || e.is_connect()) {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            "Request did not complete, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Decode a JSON body into the expected response shape.
    async fn decode<T: DeserializeOwned>(response: Response) -> HarvestResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> HarvestResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute_with_retry(self.client.get(url)).await?;
        Self::decode(response).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> HarvestResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request with query");

        let response = self
            .execute_with_retry(self.client.get(url).query(query))
            .await?;
        Self::decode(response).await
    }

    /// Execute a POST request. Never retried.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> HarvestResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request");

        let response = self.execute_once(self.client.post(url).json(body)).await?;
        Self::decode(response).await
    }

    /// Execute a PATCH request with a JSON body. Never retried.
    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> HarvestResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "PATCH request");

        let response = self.execute_once(self.client.patch(url).json(body)).await?;
        Self::decode(response).await
    }

    /// Execute a PATCH request without a body. Never retried.
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> HarvestResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "PATCH request (no body)");

        let response = self.execute_once(self.client.patch(url)).await?;
        Self::decode(response).await
    }
}
