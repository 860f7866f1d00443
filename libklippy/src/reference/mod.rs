//! Image reference resolution.
//!
//! Turns a free-form reference such as `library/nginx:1.21` or
//! `myregistry.example.com/team/app@sha256:...` into an [`ImageReference`]
//! that names a concrete registry endpoint. When the leading path segment
//! does not resolve as a host, the reference is assumed to live on the
//! public registry.

use crate::error::{KlippyError, Result};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};
use url::{Host, Url};


/// Registry used when a reference carries no resolvable registry host.
pub const DEFAULT_REGISTRY: &str = "https://registry-1.docker.io";

/// Tag used when a reference names neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

/// A fully resolved image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    registry_url: String,
    repository: String,
    tag: String,
    /// True when the reference was written `name@digest`.
    digest: bool,
}

impl ImageReference {
    /// Builds a reference from already-resolved parts.
    ///
    /// An empty `tag` is replaced with [`DEFAULT_TAG`] and a leading `/` is
    /// removed from `repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::reference::ImageReference;
    ///
    /// let reference = ImageReference::new("https://registry.example.com", "/team/app", "");
    /// assert_eq!(reference.repository(), "team/app");
    /// assert_eq!(reference.tag(), "latest");
    /// ```
    pub fn new(
        registry_url: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        let registry_url: String = registry_url.into();
        let repository: String = repository.into();
        let tag: String = tag.into();

        Self {
            registry_url: registry_url.trim_end_matches('/').to_string(),
            repository: repository.trim_start_matches('/').to_string(),
            tag: if tag.is_empty() {
                DEFAULT_TAG.to_string()
            } else {
                tag
            },
            digest: false,
        }
    }

    /// Builds a reference pinned by content digest (`name@digest`).
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::reference::ImageReference;
    ///
    /// let reference = ImageReference::with_digest(
    ///     "https://registry-1.docker.io",
    ///     "library/nginx",
    ///     "sha256:c5b1",
    /// );
    /// assert!(reference.is_digest());
    /// assert_eq!(reference.to_string(), "registry-1.docker.io/library/nginx@sha256:c5b1");
    /// ```
    pub fn with_digest(
        registry_url: impl Into<String>,
        repository: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            digest: true,
            ..Self::new(registry_url, repository, digest)
        }
    }

    /// Scheme and host of the registry, e.g. `https://registry-1.docker.io`.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Repository path without a leading slash, e.g. `library/nginx`.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag or digest to look up.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns true when the reference was given in `name@digest` form.
    pub fn is_digest(&self) -> bool {
        self.digest
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = self
            .registry_url
            .split_once("://")
            .map(|(_, host)| host)
            .unwrap_or(&self.registry_url);
        let separator = if self.is_digest() { '@' } else { ':' };
        write!(f, "{}/{}{}{}", host, self.repository, separator, self.tag)
    }
}

/// Decides whether a host name is a reachable registry candidate.
///
/// The resolver only consults this for domain names; IP literals are always
/// treated as explicit registries.
pub trait HostLookup {
    /// Returns true if `host` resolves to at least one address.
    fn resolves(&self, host: &str, port: u16) -> impl Future<Output = bool> + Send;
}

/// [`HostLookup`] backed by the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl HostLookup for SystemLookup {
    async fn resolves(&self, host: &str, port: u16) -> bool {
        match tokio::net::lookup_host((host, port)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                debug!("Unable to resolve [{}]: {}", host, e);
                false
            }
        }
    }
}

/// Resolves raw reference strings into [`ImageReference`]s.
#[derive(Debug, Clone)]
pub struct Resolver<L = SystemLookup> {
    lookup: L,
    default_registry: String,
}

impl Default for Resolver<SystemLookup> {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver<SystemLookup> {
    /// Creates a resolver that uses system DNS and the public registry fallback.
    pub fn new() -> Self {
        Self::with_lookup(SystemLookup)
    }
}

impl<L: HostLookup> Resolver<L> {
    /// Creates a resolver with a custom host lookup.
    pub fn with_lookup(lookup: L) -> Self {
        Self {
            lookup,
            default_registry: DEFAULT_REGISTRY.to_string(),
        }
    }

    /// Overrides the registry used when no explicit registry is found.
    pub fn with_default_registry(mut self, registry_url: impl Into<String>) -> Self {
        let registry_url: String = registry_url.into();
        self.default_registry = registry_url.trim().trim_end_matches('/').to_string();
        self
    }

    /// Returns the fallback registry URL.
    pub fn default_registry(&self) -> &str {
        &self.default_registry
    }

    /// Resolves `reference` into registry, repository and tag.
    ///
    /// # Errors
    ///
    /// Returns [`KlippyError::ReferenceParse`] when the reference is empty, has
    /// no repository component, or names an empty tag.
    pub async fn resolve(&self, reference: &str) -> Result<ImageReference> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(KlippyError::reference_parse(
                reference,
                "reference is empty",
            ));
        }

        let (registry_url, path) = match self.explicit_registry(reference).await {
            Some(url) => (
                url.origin().ascii_serialization(),
                path_after_host(reference).to_string(),
            ),
            None => {
                debug!(
                    "No resolvable registry in [{}], dropping back to [{}]",
                    reference, self.default_registry
                );
                let url = Url::parse(&self.default_registry)
                    .map_err(|e| KlippyError::reference_parse(reference, e.to_string()))?;
                let name = reference.trim_start_matches('/');
                let path = match url.path().trim_matches('/') {
                    "" => name.to_string(),
                    prefix => format!("{}/{}", prefix, name),
                };
                (url.origin().ascii_serialization(), path)
            }
        };

        let (repository, tag, digest) = split_path(reference, &path)?;
        debug!(
            "Registry [{}], Image [{}], Tag [{}]",
            registry_url, repository, tag
        );

        Ok(ImageReference {
            registry_url,
            repository: repository.to_string(),
            tag: tag.to_string(),
            digest,
        })
    }

    /// Returns the parsed URL if the reference starts with a usable registry host.
    async fn explicit_registry(&self, reference: &str) -> Option<Url> {
        let url = match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                let prefixed = format!("https://{}", reference);
                match Url::parse(&prefixed) {
                    Ok(url) => {
                        debug!("Reparsing modified URL [{}]", url);
                        url
                    }
                    Err(e) => {
                        debug!("[{}] is not a registry URL: {}", prefixed, e);
                        return None;
                    }
                }
            }
        };

        let port = url.port_or_known_default().unwrap_or(443);
        let resolvable = match url.host()? {
            Host::Domain(domain) => self.lookup.resolves(domain, port).await,
            Host::Ipv4(_) | Host::Ipv6(_) => true,
        };

        resolvable.then_some(url)
    }
}

/// Returns the text after the host of an explicit-registry reference.
///
/// The path is taken from the reference as written, so it is never
/// percent-encoded or dot-segment normalized.
fn path_after_host(reference: &str) -> &str {
    let without_scheme = reference
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(reference);
    without_scheme
        .split_once('/')
        .map(|(_, path)| path)
        .unwrap_or_default()
}

/// Splits a repository path into repository and tag.
///
/// The digest form (`name@digest`) takes precedence over the tag form
/// (`name:tag`), and the returned flag records which one was used. Extra
/// delimiters are tolerated: a warning is logged and the first two parts are
/// used.
fn split_path<'a>(reference: &str, path: &'a str) -> Result<(&'a str, &'a str, bool)> {
    let (name, tag, digest) = if path.contains('@') {
        let (name, tag) = split_parts(path, '@');
        (name, tag, true)
    } else if path.contains(':') {
        let (name, tag) = split_parts(path, ':');
        (name, tag, false)
    } else {
        debug!("Setting tag to \"{}\"", DEFAULT_TAG);
        (path, DEFAULT_TAG, false)
    };

    let repository = name.trim_start_matches('/');
    if repository.is_empty() {
        return Err(KlippyError::reference_parse(
            reference,
            "unable to parse namespace/image:tag",
        ));
    }
    if tag.is_empty() {
        return Err(KlippyError::reference_parse(reference, "tag is empty"));
    }

    Ok((repository, tag, digest))
}

fn split_parts(path: &str, delimiter: char) -> (&str, &str) {
    let mut parts = path.split(delimiter);
    let name = parts.next().unwrap_or_default();
    let tag = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        warn!(
            "Expecting only 2 parts to Namespace/project {} tag in [{}]",
            delimiter, path
        );
    }
    (name, tag)
}
