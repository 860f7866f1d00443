use super::*;
use crate::context::AppContext;
use crate::format::OutputFormat;
use std::fmt::Display;
use tracing::debug;

/// Handle the image tags command
pub async fn handle_image_tags(ctx: &AppContext, reference: &str, format: Option<OutputFormat>) {
    let klippy = klippy_or_exit(ctx);
    match fetch_tags(&klippy, reference).await {
        Ok(tags) => emit(ctx, &tags, format),
        Err(e) => fail(ctx, e),
    }
}

/// Handle the image commands command
pub async fn handle_image_commands(
    ctx: &AppContext,
    reference: &str,
    format: Option<OutputFormat>,
) {
    let klippy = klippy_or_exit(ctx);
    match fetch_commands(&klippy, reference).await {
        Ok(commands) => emit(ctx, &commands, format),
        Err(e) => fail(ctx, e),
    }
}

/// Handle the image overview command
pub async fn handle_image_overview(
    ctx: &AppContext,
    reference: &str,
    format: Option<OutputFormat>,
) {
    let klippy = klippy_or_exit(ctx);
    match klippy.overview(reference).await {
        Ok(overview) => emit(ctx, &overview, format),
        Err(e) => fail(ctx, e),
    }
}

/// Handle the image check command
pub async fn handle_image_check(ctx: &AppContext, reference: &str, format: Option<OutputFormat>) {
    let klippy = klippy_or_exit(ctx);
    match klippy.check_access(reference).await {
        Ok(report) => emit(ctx, &report, format),
        Err(e) => fail(ctx, e),
    }
}

fn klippy_or_exit(ctx: &AppContext) -> Klippy {
    match ctx.klippy() {
        Ok(klippy) => {
            debug!("Default registry [{}]", klippy.default_registry());
            klippy
        }
        Err(e) => fail(ctx, e),
    }
}

fn emit<T: Formattable>(ctx: &AppContext, item: &T, format: Option<OutputFormat>) {
    match format::format_output(item, ctx.output_format(format), ctx.use_color()) {
        Ok(output) => println!("{}", output),
        Err(e) => fail(ctx, e),
    }
}

fn fail(ctx: &AppContext, error: impl Display) -> ! {
    format::error(ctx, &error.to_string());
    std::process::exit(1);
}
