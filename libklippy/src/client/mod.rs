//! HTTP client for Docker Registry v2 communication.
//!
//! A thin wrapper over reqwest that issues the handful of GET requests the
//! lookup pipeline needs. Every call is a single request; there is no retry
//! and no backoff.

use crate::auth::BearerToken;
use crate::error::{KlippyError, Result};
use crate::manifest::Manifest;
use crate::reference::ImageReference;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;


/// Header carrying the registry API version on `/v2/` responses.
pub const API_VERSION_HEADER: &str = "Docker-Distribution-API-Version";

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// What the registry said on its unauthenticated `/v2/` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    /// Typically "registry/2.0".
    pub api_version: Option<String>,
    /// The raw WWW-Authenticate header value, if the registry wants a token.
    pub challenge: Option<String>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libklippy::client::ClientConfig;
///
/// let config = ClientConfig::new().with_timeout(60);
/// assert_eq!(config.timeout_seconds, Some(60));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Request timeout in seconds. `None` leaves the transport default in place.
    pub timeout_seconds: Option<u64>,
}

impl ClientConfig {
    /// Creates a configuration that uses the transport defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// HTTP client for registry and token-issuer requests.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::client::Client;
    ///
    /// let client = Client::new().unwrap();
    /// assert!(client.config().timeout_seconds.is_none());
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let http_client = builder
            .build()
            .map_err(|e| KlippyError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issues a GET request, attaching the bearer token when there is one.
    pub async fn get(&self, url: &str, token: &BearerToken) -> Result<Response> {
        let mut request = self
            .http_client
            .get(url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(auth_header) = token.to_header_value() {
            request = request.header(AUTHORIZATION, auth_header);
        }

        request
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, url))
    }

    /// Calls the registry's `/v2/` endpoint without credentials.
    ///
    /// Any status is accepted: a 401 carrying a challenge is the normal answer
    /// from a registry that wants a token. Header values that are not plain
    /// ASCII are read as lossy UTF-8 rather than dropped.
    ///
    /// # Errors
    ///
    /// Returns [`KlippyError::Network`] if the registry cannot be reached.
    pub async fn check_version(&self, registry_url: &str) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", registry_url.trim_end_matches('/'));
        let response = self.get(&url, &BearerToken::none()).await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        };

        Ok(RegistryVersion {
            api_version: header(API_VERSION_HEADER),
            challenge: header(WWW_AUTHENTICATE.as_str()),
        })
    }

    /// Fetches the list of tags for the reference's repository.
    ///
    /// Tags come back in the order the registry lists them.
    ///
    /// # Errors
    ///
    /// Returns [`KlippyError::RegistryRequest`] on any status other than 200
    /// and [`KlippyError::ManifestDecode`] if the body is not a tag list.
    pub async fn fetch_tags(
        &self,
        reference: &ImageReference,
        token: &BearerToken,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/v2/{}/tags/list",
            reference.registry_url(),
            reference.repository()
        );
        debug!("Built v2 Registry URL [{}]", url);

        let response = self.get(&url, token).await?;
        let body = Self::read_ok_body(response, "tags", reference.repository()).await?;

        let tags: TagsResponse =
            serde_json::from_slice(&body).map_err(|e| KlippyError::manifest_decode("tag list", e))?;
        Ok(tags.tags.unwrap_or_default())
    }

    /// Fetches the manifest for the reference's tag or digest.
    ///
    /// # Errors
    ///
    /// Returns [`KlippyError::RegistryRequest`] on any status other than 200
    /// and [`KlippyError::ManifestDecode`] if the body is not a manifest.
    pub async fn fetch_manifest(
        &self,
        reference: &ImageReference,
        token: &BearerToken,
    ) -> Result<Manifest> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            reference.registry_url(),
            reference.repository(),
            reference.tag()
        );
        debug!("Built v2 Registry URL [{}]", url);

        let response = self.get(&url, token).await?;
        let body = Self::read_ok_body(response, "manifest", reference.repository()).await?;

        Manifest::from_slice(&body)
    }

    /// Reads the whole body of a 200 response, or turns the status into an error.
    async fn read_ok_body(response: Response, resource: &str, repository: &str) -> Result<Vec<u8>> {
        let status = response.status();
        if status != StatusCode::OK {
            debug!("HTTP Error [{}] from [{}]", status, response.url());
            return Err(KlippyError::registry_request(
                resource,
                repository,
                status.as_u16(),
            ));
        }

        let url = response.url().to_string();
        let body = response.bytes().await.map_err(|e| {
            KlippyError::network_with_source(format!("Failed to read response from {}", url), e)
        })?;
        Ok(body.to_vec())
    }

    /// Translates a reqwest error into a KlippyError.
    fn translate_reqwest_error(error: reqwest::Error, url: &str) -> KlippyError {
        if error.is_timeout() {
            KlippyError::network_with_source(format!("Request to {} timed out", url), error)
        } else if error.is_connect() {
            KlippyError::network_with_source(format!("Failed to connect to {}", url), error)
        } else if error.is_builder() {
            KlippyError::network_with_source(format!("Invalid request URL {}", url), error)
        } else {
            KlippyError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }
}
