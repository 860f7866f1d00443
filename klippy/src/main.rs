use clap::{CommandFactory, Parser, Subcommand};
use format::{ColorChoice, OutputFormat};
use std::path::PathBuf;

mod commands;
mod context;
mod format;
mod logging;

/// Klippy - Docker Registry image inspector
///
/// Lists the tags of an image, shows its manifest and reconstructs the
/// commands that built it, straight from a Docker Registry v2.
#[derive(Parser, Debug)]
#[command(name = "klippy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<ColorChoice>,

    /// Path to a YAML configuration file
    #[arg(long, global = true, env = context::CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// Lookup information about an image
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ImageCommands {
    /// List all tags of a specific image
    Tags {
        /// Image reference (e.g. library/nginx or registry.example.com/team/app)
        reference: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// List all commands used to build a specific image
    Commands {
        /// Image reference (name:tag or name@digest)
        reference: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Print an overview of the details of a specific image
    Overview {
        /// Image reference (name:tag or name@digest)
        reference: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Check that an image's registry is reachable and grants a pull token
    Check {
        /// Image reference (name:tag or name@digest)
        reference: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = match context::AppContext::build(
        cli.color,
        context::VerbosityLevel::from_count(cli.verbose),
        cli.config,
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&ctx);
    tracing::debug!("Resolved configuration: {:?}", ctx.config);

    match cli.command {
        Commands::Version => {
            commands::version::print_version();
        }
        Commands::Image { command } => match command {
            ImageCommands::Tags { reference, format } => {
                commands::image::handlers::handle_image_tags(&ctx, &reference, format).await;
            }
            ImageCommands::Commands { reference, format } => {
                commands::image::handlers::handle_image_commands(&ctx, &reference, format).await;
            }
            ImageCommands::Overview { reference, format } => {
                commands::image::handlers::handle_image_overview(&ctx, &reference, format).await;
            }
            ImageCommands::Check { reference, format } => {
                commands::image::handlers::handle_image_check(&ctx, &reference, format).await;
            }
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
