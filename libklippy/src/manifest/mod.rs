//! Docker image manifest (schema 1) data structures.
//!
//! A schema 1 manifest carries its build history as a list of JSON documents
//! embedded as strings (`v1Compatibility`). Decoding is therefore two-stage:
//! the outer [`Manifest`] is decoded from the registry response, and each
//! history entry is decoded on demand into a [`LayerBuildInfo`].

use crate::error::{KlippyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// The only manifest schema version klippy can read history from.
pub const SCHEMA_VERSION: u32 = 1;

/// Image manifest as returned by `/v2/<name>/manifests/<reference>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub architecture: String,
    /// Layer blobs in registry order.
    #[serde(default)]
    pub fs_layers: Vec<FsLayer>,
    /// One compatibility entry per layer, same order as `fs_layers`.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// JWS signatures. Kept as raw JSON and never verified.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<serde_json::Value>,
}

/// A content-addressed layer reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsLayer {
    pub blob_sum: String,
}

/// One raw history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// A JSON document encoded as a string.
    pub v1_compatibility: String,
}

impl Manifest {
    /// Decodes a manifest from a registry response body.
    ///
    /// Bodies whose `schemaVersion` is not [`SCHEMA_VERSION`] are rejected,
    /// since later schemas carry no `history` to read commands from.
    ///
    /// # Examples
    ///
    /// ```
    /// use libklippy::manifest::Manifest;
    ///
    /// let body = br#"{"schemaVersion":1,"name":"library/alpine","tag":"3.19",
    ///     "architecture":"amd64","fsLayers":[{"blobSum":"sha256:a3ed"}],
    ///     "history":[{"v1Compatibility":"{}"}]}"#;
    /// let manifest = Manifest::from_slice(body).unwrap();
    /// assert_eq!(manifest.blob_sums(), vec!["sha256:a3ed"]);
    /// ```
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| KlippyError::manifest_decode("manifest", e))?;

        if manifest.schema_version != SCHEMA_VERSION {
            return Err(KlippyError::unsupported_manifest(
                "manifest",
                format!(
                    "unsupported schemaVersion {} (expected {})",
                    manifest.schema_version, SCHEMA_VERSION
                ),
            ));
        }

        Ok(manifest)
    }

    /// Layer blob identifiers in the order the registry listed them.
    pub fn blob_sums(&self) -> Vec<&str> {
        self.fs_layers.iter().map(|l| l.blob_sum.as_str()).collect()
    }

    /// Decodes every history entry, in order.
    ///
    /// Fails on the first entry that is not valid JSON; no partial result is
    /// returned.
    pub fn decode_layers(&self) -> Result<Vec<LayerBuildInfo>> {
        self.history
            .iter()
            .enumerate()
            .map(|(layer, entry)| LayerBuildInfo::decode(layer, &entry.v1_compatibility))
            .collect()
    }
}

/// Build metadata decoded from a single `v1Compatibility` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerBuildInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// Engine version that built the layer. Informational only.
    #[serde(default)]
    pub docker_version: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub throwaway: bool,
    #[serde(default)]
    pub container_config: ContainerConfig,
}

/// The part of the container configuration that produced a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "Cmd", default)]
    cmd: Option<Vec<String>>,
}

impl ContainerConfig {
    /// Creates a config with the given command tokens.
    pub fn with_cmd<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: Some(cmd.into_iter().map(Into::into).collect()),
        }
    }

    /// Command tokens, empty when the registry sent none or `null`.
    pub fn cmd(&self) -> &[String] {
        self.cmd.as_deref().unwrap_or_default()
    }
}

impl LayerBuildInfo {
    /// Decodes one history entry. `layer` is only used in the error.
    pub fn decode(layer: usize, v1_compatibility: &str) -> Result<Self> {
        serde_json::from_str(v1_compatibility).map_err(|e| KlippyError::history_decode(layer, e))
    }
}
