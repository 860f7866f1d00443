//! High-level API for the klippy library.
//!
//! [`Klippy`] runs the whole lookup pipeline for one reference per call:
//! resolve the reference, negotiate a token, fetch from the registry and,
//! for build commands, decode the manifest history. Nothing is carried over
//! between calls, so every method starts from the raw reference string.
//!
//! # Examples
//!
//! ```no_run
//! use libklippy::Klippy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let klippy = Klippy::new()?;
//!
//!     for tag in klippy.list_tags("library/nginx").await? {
//!         println!("{}", tag);
//!     }
//!
//!     for command in klippy.build_commands("library/nginx:1.21").await? {
//!         println!("{}", command.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::auth::{BearerToken, Negotiator};
use crate::client::{Client, ClientConfig};
use crate::config::Config;
use crate::error::Result;
use crate::history::{self, FormattedCommand};
use crate::manifest::Manifest;
use crate::reference::{HostLookup, ImageReference, Resolver, SystemLookup};
use serde::Serialize;
use tracing::info;


/// Summary of an image manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOverview {
    pub reference: ImageReference,
    pub name: String,
    pub tag: String,
    pub architecture: String,
    pub schema_version: u32,
    /// Layer blob sums in manifest order.
    pub layers: Vec<String>,
}

impl ImageOverview {
    fn from_manifest(reference: ImageReference, manifest: &Manifest) -> Self {
        Self {
            name: manifest.name.clone(),
            tag: manifest.tag.clone(),
            architecture: manifest.architecture.clone(),
            schema_version: manifest.schema_version,
            layers: manifest.blob_sums().into_iter().map(String::from).collect(),
            reference,
        }
    }
}

/// Outcome of [`Klippy::check_access`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    pub reference: ImageReference,
    /// Docker-Distribution-API-Version reported by the registry.
    pub api_version: Option<String>,
    /// True if the registry demanded a token and one was issued.
    pub token_issued: bool,
}

/// High-level interface for looking up images on a Docker Registry v2.
///
/// `Klippy` wires together the [`Resolver`], the [`Negotiator`] and the
/// registry [`Client`]. It is cheap to clone and holds no per-image state.
///
/// # Examples
///
/// ```no_run
/// use libklippy::Klippy;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let klippy = Klippy::builder()
///         .default_registry("https://mirror.example.com")
///         .timeout(30)
///         .build()?;
///
///     let overview = klippy.overview("team/app:v1").await?;
///     println!("{} layers", overview.layers.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Klippy<L = SystemLookup> {
    resolver: Resolver<L>,
    client: Client,
}

impl Klippy<SystemLookup> {
    /// Creates a `Klippy` with system DNS, the public registry fallback and
    /// transport defaults.
    pub fn new() -> Result<Self> {
        KlippyBuilder::new().build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder() -> KlippyBuilder<SystemLookup> {
        KlippyBuilder::new()
    }

    /// Creates a `Klippy` from loaded application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        KlippyBuilder::new().with_config(config).build()
    }
}

impl<L: HostLookup> Klippy<L> {
    /// Resolves a raw reference without touching the registry.
    pub async fn resolve(&self, reference: &str) -> Result<ImageReference> {
        self.resolver.resolve(reference).await
    }

    /// Obtains a pull token for an already resolved reference.
    pub async fn negotiate(&self, reference: &ImageReference) -> Result<BearerToken> {
        self.negotiator()
            .negotiate(reference.registry_url(), reference.repository())
            .await
    }

    /// Lists the tags of the reference's repository, in registry order.
    ///
    /// Any tag or digest on the reference is ignored.
    pub async fn list_tags(&self, reference: &str) -> Result<Vec<String>> {
        info!("Beginning tag lookup of image [{}]", reference);
        let resolved = self.resolve(reference).await?;
        let token = self.negotiate(&resolved).await?;
        self.client.fetch_tags(&resolved, &token).await
    }

    /// Fetches the manifest for the reference.
    pub async fn manifest(&self, reference: &str) -> Result<(ImageReference, Manifest)> {
        let resolved = self.resolve(reference).await?;
        let token = self.negotiate(&resolved).await?;
        let manifest = self.client.fetch_manifest(&resolved, &token).await?;
        Ok((resolved, manifest))
    }

    /// Summarises the manifest for the reference.
    pub async fn overview(&self, reference: &str) -> Result<ImageOverview> {
        info!("Beginning overview of image [{}]", reference);
        let (resolved, manifest) = self.manifest(reference).await?;
        Ok(ImageOverview::from_manifest(resolved, &manifest))
    }

    /// Reconstructs the build command of every layer, in manifest order.
    ///
    /// # Errors
    ///
    /// Fails on the first layer whose history entry cannot be decoded.
    pub async fn build_commands(&self, reference: &str) -> Result<Vec<FormattedCommand>> {
        info!("Beginning command lookup of image [{}]", reference);
        let (_, manifest) = self.manifest(reference).await?;
        history::decode_history(&manifest)
    }

    /// Checks that the reference resolves and that a pull token can be
    /// obtained for it.
    pub async fn check_access(&self, reference: &str) -> Result<AccessReport> {
        info!("Beginning lookup of image [{}]", reference);
        let resolved = self.resolve(reference).await?;
        let version = self.client.check_version(resolved.registry_url()).await?;
        let token = self
            .negotiator()
            .negotiate_with(resolved.registry_url(), resolved.repository(), &version)
            .await?;

        Ok(AccessReport {
            reference: resolved,
            api_version: version.api_version,
            token_issued: !token.is_empty(),
        })
    }

    /// Returns the registry used when a reference names no resolvable host.
    pub fn default_registry(&self) -> &str {
        self.resolver.default_registry()
    }

    fn negotiator(&self) -> Negotiator {
        Negotiator::new(self.client.clone())
    }
}

/// Builder for creating a `Klippy` instance with custom configuration.
#[derive(Debug, Clone)]
pub struct KlippyBuilder<L = SystemLookup> {
    lookup: L,
    default_registry: Option<String>,
    timeout_seconds: Option<u64>,
}

impl KlippyBuilder<SystemLookup> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            lookup: SystemLookup,
            default_registry: None,
            timeout_seconds: None,
        }
    }
}

impl Default for KlippyBuilder<SystemLookup> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: HostLookup> KlippyBuilder<L> {
    /// Set the registry used when a reference names no resolvable host.
    pub fn default_registry(mut self, url: impl Into<String>) -> Self {
        self.default_registry = Some(url.into());
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Take the registry and network settings from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.default_registry = Some(config.registry.default.clone());
        self.timeout_seconds = config.network.timeout;
        self
    }

    /// Replace the host lookup used to detect explicit registries.
    pub fn lookup<M: HostLookup>(self, lookup: M) -> KlippyBuilder<M> {
        KlippyBuilder {
            lookup,
            default_registry: self.default_registry,
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// Build the `Klippy` instance.
    pub fn build(self) -> Result<Klippy<L>> {
        let mut client_config = ClientConfig::new();
        if let Some(seconds) = self.timeout_seconds {
            client_config = client_config.with_timeout(seconds);
        }
        let client = Client::with_config(client_config)?;

        let mut resolver = Resolver::with_lookup(self.lookup);
        if let Some(registry) = self.default_registry {
            resolver = resolver.with_default_registry(registry);
        }

        Ok(Klippy { resolver, client })
    }
}
