//! Bearer token negotiation for Docker Registry v2.
//!
//! Registries that require a token answer `GET /v2/` with a
//! `WWW-Authenticate: Bearer realm="...",service="..."` challenge. The
//! negotiator reads that challenge, asks the token issuer for a read-only
//! `pull` token scoped to one repository, and hands the token back to the
//! caller. Tokens live for one invocation and are never stored.

use crate::client::{Client, RegistryVersion};
use crate::error::{KlippyError, Result};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// An opaque bearer token. Empty when the registry needs no authentication.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// A token for registries that need no authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::auth::BearerToken;
    ///
    /// let token = BearerToken::none();
    /// assert!(token.is_empty());
    /// assert_eq!(token.to_header_value(), None);
    /// ```
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Wraps a token handed out by a token issuer.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns true if no token was issued.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the Authorization header value, or `None` for an empty token.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::auth::BearerToken;
    ///
    /// let token = BearerToken::new("token123");
    /// assert_eq!(token.to_header_value().as_deref(), Some("Bearer token123"));
    /// ```
    pub fn to_header_value(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.0))
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({} bytes)", self.0.len())
    }
}

/// Information parsed from a WWW-Authenticate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// The authentication scheme (e.g., "Bearer")
    pub scheme: String,

    /// Token issuer URL
    pub realm: String,

    /// Audience the token is requested for
    pub service: String,

    /// Scope suggested by the registry, if any
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a WWW-Authenticate header value sent by `registry`.
    ///
    /// Example header: `Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:alpine:pull"`
    ///
    /// Keys may come in any order; keys other than `realm`, `service` and
    /// `scope` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`KlippyError::AuthChallenge`] if the header has no parameters
    /// or lacks a non-empty `realm` or `service`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::auth::AuthChallenge;
    ///
    /// let header = r#"Bearer realm="https://auth.example.com/token",service="registry""#;
    /// let challenge = AuthChallenge::parse("https://registry.example.com", header).unwrap();
    /// assert_eq!(challenge.realm, "https://auth.example.com/token");
    /// assert_eq!(challenge.service, "registry");
    /// ```
    pub fn parse(registry: &str, header: &str) -> Result<Self> {
        let header = header.trim();

        // Split scheme from parameters
        let (scheme, params) = header.split_once(' ').ok_or_else(|| {
            KlippyError::auth_challenge(registry, "Invalid WWW-Authenticate header format")
        })?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for param in params.split(',') {
            if let Some((key, value)) = param.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches(|c| c == '"' || c == ',');
                debug!("Header Key:[{}] Value:[{}]", key, value);

                match key {
                    "realm" => realm = Some(value.to_string()),
                    "service" => service = Some(value.to_string()),
                    "scope" => scope = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let realm = realm.filter(|r| !r.is_empty()).ok_or_else(|| {
            KlippyError::auth_challenge(registry, "No bearer server (realm) could be identified")
        })?;
        let service = service.filter(|s| !s.is_empty()).ok_or_else(|| {
            KlippyError::auth_challenge(registry, "No bearer service could be identified")
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            realm,
            service,
            scope,
        })
    }

    /// Builds the token issuer URL for a read-only pull of `repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::auth::AuthChallenge;
    ///
    /// let header = r#"Bearer realm="https://auth.docker.io/token",service="registry.docker.io""#;
    /// let challenge = AuthChallenge::parse("https://registry-1.docker.io", header).unwrap();
    /// assert_eq!(
    ///     challenge.token_url("library/nginx"),
    ///     "https://auth.docker.io/token?service=registry.docker.io&scope=repository:library/nginx:pull"
    /// );
    /// ```
    pub fn token_url(&self, repository: &str) -> String {
        format!(
            "{}?service={}&scope=repository:{}:pull",
            self.realm, self.service, repository
        )
    }
}

/// Body returned by a token issuer.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Runs the challenge/token exchange against a registry.
#[derive(Debug, Clone)]
pub struct Negotiator {
    client: Client,
}

impl Negotiator {
    /// Creates a negotiator that sends its requests through `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Obtains a pull token for `repository` on `registry_url`.
    ///
    /// Returns an empty token when the registry does not send a challenge.
    ///
    /// # Errors
    ///
    /// - [`KlippyError::Network`] if the registry or token issuer is unreachable
    /// - [`KlippyError::AuthChallenge`] if the challenge lacks a realm or service
    /// - [`KlippyError::TokenResponse`] if the issuer hands out no token
    pub async fn negotiate(&self, registry_url: &str, repository: &str) -> Result<BearerToken> {
        let version = self.client.check_version(registry_url).await?;
        self.negotiate_with(registry_url, repository, &version).await
    }

    /// Same as [`Negotiator::negotiate`] but reuses an earlier `/v2/` version check.
    pub async fn negotiate_with(
        &self,
        registry_url: &str,
        repository: &str,
        version: &RegistryVersion,
    ) -> Result<BearerToken> {
        match &version.api_version {
            Some(api_version) => debug!("Registry version [{}]", api_version),
            None => warn!("Unknown registry version for [{}]", registry_url),
        }

        let Some(header) = &version.challenge else {
            debug!("No WWW-Authenticate header from [{}], no token needed", registry_url);
            return Ok(BearerToken::none());
        };
        debug!("WWW-Authenticate header [{}]", header);

        let challenge = AuthChallenge::parse(registry_url, header)?;
        let url = challenge.token_url(repository);
        debug!("Built URL [{}]", url);

        self.fetch_token(&url).await
    }

    async fn fetch_token(&self, url: &str) -> Result<BearerToken> {
        let response = self.client.get(url, &BearerToken::none()).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KlippyError::token_response(
                format!("Authorisation server returned {}", status),
                Some(status.as_u16()),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            KlippyError::network_with_source("Failed to read authorisation server response", e)
        })?;
        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            KlippyError::token_response(
                format!("Unable to decode authorisation server response: {}", e),
                None,
            )
        })?;

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .or(parsed.access_token.filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                KlippyError::token_response(
                    "No token could be identified in the response from the authorisation server",
                    None,
                )
            })?;

        debug!("Token of [{}] bytes found", token.len());
        Ok(BearerToken::new(token))
    }
}
