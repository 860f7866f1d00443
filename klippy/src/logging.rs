//! Diagnostic logging to stderr.

use crate::context::AppContext;
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` when set, otherwise the context's level.
pub fn env_filter(ctx: &AppContext) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(ctx.log_filter()))
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init(ctx: &AppContext) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(ctx))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ctx.use_color_stderr())
        .try_init();
}
