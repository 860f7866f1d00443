//! Build command reconstruction from manifest history.
//!
//! Each schema 1 history entry records the command that produced its layer.
//! This module turns those records back into something that reads like the
//! Dockerfile instruction that was run.

use crate::error::Result;
use crate::manifest::{LayerBuildInfo, Manifest};
use serde::Serialize;


/// Marker the builder inserts in front of metadata-only instructions.
pub const NOP_MARKER: &str = "#(nop) ";

/// Text that replaces every `&&` so chained commands render one per line.
pub const CONTINUATION: &str = "\\\n       &&";

/// How a layer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// An executed shell command (`RUN`).
    Run,
    /// A metadata instruction such as `LABEL` or `ENV`.
    Metadata,
}

/// A human-readable build command for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedCommand {
    /// Index into the manifest history.
    pub layer: usize,
    pub kind: CommandKind,
    pub text: String,
}

/// Decodes the build commands of every layer in `manifest`.
///
/// The result follows the manifest's history order. Callers that want build
/// order have to reverse it themselves.
///
/// # Errors
///
/// Returns [`crate::error::KlippyError::HistoryDecode`] for the first history
/// entry that is not valid JSON.
///
/// # Examples
///
/// ```
/// use libklippy::history::{decode_history, CommandKind};
/// use libklippy::manifest::{HistoryEntry, Manifest};
///
/// let manifest = Manifest {
///     history: vec![HistoryEntry {
///         v1_compatibility: r##"{"container_config":{"Cmd":["/bin/sh","-c","#(nop) ","ENV A=b"]}}"##.to_string(),
///     }],
///     ..Default::default()
/// };
/// let commands = decode_history(&manifest).unwrap();
/// assert_eq!(commands[0].text, "ENV A=b");
/// assert_eq!(commands[0].kind, CommandKind::Metadata);
/// ```
pub fn decode_history(manifest: &Manifest) -> Result<Vec<FormattedCommand>> {
    let layers = manifest.decode_layers()?;
    Ok(layers
        .iter()
        .enumerate()
        .map(|(layer, info)| format_layer(layer, info))
        .collect())
}

/// Formats the command of a single decoded layer.
pub fn format_layer(layer: usize, info: &LayerBuildInfo) -> FormattedCommand {
    let (kind, text) = format_command(info.container_config.cmd());
    FormattedCommand { layer, kind, text }
}

/// Formats raw command tokens.
///
/// Tokens are joined with no separator, the NOP wrapper is stripped, tabs are
/// removed and each `&&` is moved onto its own line.
pub fn format_command(tokens: &[String]) -> (CommandKind, String) {
    let joined = tokens.concat();

    let (kind, command) = match joined.rsplit_once(NOP_MARKER) {
        Some((_, instruction)) => (CommandKind::Metadata, instruction.trim().to_string()),
        None => (CommandKind::Run, joined),
    };

    let command = command.replace('\t', "").replace("&&", CONTINUATION);
    (kind, command)
}
