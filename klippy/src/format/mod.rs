use crate::context::AppContext;
use libklippy::history::{CommandKind, FormattedCommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;

pub use libklippy::config::{ColorChoice, OutputFormat};

/// Decide whether to emit ANSI colors on stdout for a given choice.
///
/// `Auto` colors only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color(choice: ColorChoice) -> bool {
    color_for(choice, std::io::stdout().is_terminal(), no_color_set())
}

/// Same as [`should_color`], but for output written to stderr.
pub fn should_color_stderr(choice: ColorChoice) -> bool {
    color_for(choice, std::io::stderr().is_terminal(), no_color_set())
}

fn no_color_set() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

/// Resolves a choice against one stream's terminal state.
pub(crate) fn color_for(choice: ColorChoice, is_terminal: bool, no_color: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal && !no_color,
    }
}

/// Print an error message with optional coloring
pub fn error(ctx: &AppContext, message: &str) {
    eprintln!("{} {}", error_mark(ctx.use_color_stderr()), message);
}

/// Colorize a checkmark for success if colors are enabled
pub fn checkmark(color: bool) -> String {
    if color {
        format!("{}", "✓".green().bold())
    } else {
        "✓".to_string()
    }
}

/// Colorize an X mark for errors if colors are enabled
pub fn error_mark(color: bool) -> String {
    if color {
        format!("{}", "✗".red().bold())
    } else {
        "✗".to_string()
    }
}

/// Renders a build command.
///
/// Run commands are green and metadata instructions red; every `&&` that
/// starts a continuation line is white.
pub fn colorize_command(command: &FormattedCommand, color: bool) -> String {
    if !color {
        return command.text.clone();
    }

    let separator = "&&".white().to_string();
    command
        .text
        .split("&&")
        .map(|segment| match command.kind {
            CommandKind::Run => segment.green().to_string(),
            CommandKind::Metadata => segment.red().to_string(),
        })
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Trait for types that can be formatted for CLI output
pub trait Formattable: Serialize {
    /// Format the type for pretty (human-readable) output
    fn format_pretty(&self, color: bool) -> String;
}

/// Format a single item for output
pub fn format_output<T: Formattable>(
    item: &T,
    format: OutputFormat,
    color: bool,
) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(item.format_pretty(color)),
        OutputFormat::Json => serde_json::to_string_pretty(item)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(item).map_err(|e| format!("Failed to serialize to YAML: {}", e))
        }
    }
}
