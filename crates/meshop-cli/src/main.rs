//! Meshop CLI - translate legacy mesh values files into control plane specs

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
mod error;
mod exit_codes;

use config::{CliConfig, OutputFormat};
use error::CliError;

#[derive(Parser)]
#[command(name = "meshop")]
#[command(author = "Meshop Contributors")]
#[command(version)]
#[command(about = "Translate legacy mesh values files into control plane specs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (defaults to ~/.config/meshop/config.yaml)
    #[arg(long, global = true, env = "MESHOP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a legacy values file into a control plane spec
    Translate {
        /// Values file to translate
        values: PathBuf,

        /// Schema version of the values file (e.g. 1.3)
        #[arg(long = "schema-version")]
        schema_version: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Write the spec to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print how each feature area's enablement was decided
        #[arg(short, long)]
        verbose: bool,
    },

    /// List supported schema versions
    Versions,

    /// Print the mapping rules of a schema version
    Rules {
        /// Schema version (defaults to the configured or newest version)
        #[arg(long = "schema-version")]
        schema_version: Option<String>,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Translate {
            values,
            schema_version,
            output,
            out,
            verbose,
        } => commands::translate::run(
            &values,
            schema_version.as_deref(),
            output,
            out.as_deref(),
            verbose,
            &config,
        ),

        Commands::Versions => commands::versions::run(&config),

        Commands::Rules { schema_version } => {
            commands::rules::run(schema_version.as_deref(), &config)
        }
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here, on stdout
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };
    init_logging(cli.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => report(err),
    };
    std::process::exit(code);
}

fn report(err: CliError) -> i32 {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    code
}
