//! Error types for klippy
//!
//! Every stage of the lookup pipeline (resolve, negotiate, fetch, decode)
//! reports failures through [`KlippyError`]. Errors are returned to the
//! immediate caller; nothing in the library retries or recovers locally.

use thiserror::Error;


/// Main error type for klippy operations
#[derive(Error, Debug)]
pub enum KlippyError {
    /// The image reference could not be split into registry, repository and tag
    #[error("Invalid image reference '{reference}': {message}")]
    ReferenceParse { reference: String, message: String },

    /// The registry's WWW-Authenticate challenge was missing a realm or service
    #[error("Authentication challenge error for registry [{registry}]: {message}")]
    AuthChallenge { registry: String, message: String },

    /// The token issuer did not hand out a usable token
    #[error("Token response error: {message}")]
    TokenResponse {
        message: String,
        status_code: Option<u16>,
    },

    /// A registry endpoint answered with something other than 200
    #[error("Unable to retrieve {resource} for image [{repository}] (status: {status_code})")]
    RegistryRequest {
        resource: String,
        repository: String,
        status_code: u16,
    },

    /// A registry response body was not the JSON shape we expected
    #[error("Failed to decode {what}: {message}")]
    ManifestDecode {
        what: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A layer's v1Compatibility document was not valid JSON
    #[error("Failed to decode history for layer {layer}: {source}")]
    HistoryDecode {
        layer: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Transport-level failure (connection, DNS, TLS, reading the body)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, bad values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for klippy operations
pub type Result<T> = std::result::Result<T, KlippyError>;

impl KlippyError {
    /// Creates a new reference parse error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::error::KlippyError;
    ///
    /// let err = KlippyError::reference_parse("", "reference is empty");
    /// assert!(matches!(err, KlippyError::ReferenceParse { .. }));
    /// ```
    pub fn reference_parse<R, M>(reference: R, message: M) -> Self
    where
        R: Into<String>,
        M: Into<String>,
    {
        Self::ReferenceParse {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Creates a new authentication challenge error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::error::KlippyError;
    ///
    /// let err = KlippyError::auth_challenge("https://registry.example", "no realm");
    /// assert!(matches!(err, KlippyError::AuthChallenge { .. }));
    /// ```
    pub fn auth_challenge<R, M>(registry: R, message: M) -> Self
    where
        R: Into<String>,
        M: Into<String>,
    {
        Self::AuthChallenge {
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new token response error.
    pub fn token_response<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::TokenResponse {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new registry request error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::error::KlippyError;
    ///
    /// let err = KlippyError::registry_request("tags", "library/nginx", 404);
    /// assert!(err.to_string().contains("library/nginx"));
    /// ```
    pub fn registry_request<S, R>(resource: S, repository: R, status_code: u16) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        Self::RegistryRequest {
            resource: resource.into(),
            repository: repository.into(),
            status_code,
        }
    }

    /// Creates a new decode error with the underlying serde error attached.
    pub fn manifest_decode<S: Into<String>>(what: S, source: serde_json::Error) -> Self {
        Self::ManifestDecode {
            what: what.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a decode error for a body that parsed but has the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::error::KlippyError;
    ///
    /// let err = KlippyError::unsupported_manifest("manifest", "schemaVersion 2");
    /// assert!(matches!(err, KlippyError::ManifestDecode { source: None, .. }));
    /// ```
    pub fn unsupported_manifest<S, M>(what: S, message: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::ManifestDecode {
            what: what.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new history decode error for the given layer index.
    pub fn history_decode(layer: usize, source: serde_json::Error) -> Self {
        Self::HistoryDecode { layer, source }
    }

    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::error::KlippyError;
    ///
    /// let err = KlippyError::network("connection refused");
    /// assert!(matches!(err, KlippyError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }
}

impl From<config::ConfigError> for KlippyError {
    fn from(err: config::ConfigError) -> Self {
        KlippyError::config_with_source("Failed to build configuration", None, err)
    }
}
