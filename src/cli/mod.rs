//! Command-line interface.
//!
//! ```text
//! farescout search --origin Johannesburg --destination Athens \
//!     --depart "June 15, 2026" --return "June 29, 2026" --readme
//! farescout render --input response.json --output README.md
//! farescout config-check
//! ```

pub mod commands;
pub mod error;
pub mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use error::{CliError, CliResult};
pub use utils::{display_error_with_suggestions, offers_table, print_response};

use commands::render::RenderOptions;
use commands::search::SearchOptions;

/// Farescout CLI.
#[derive(Parser, Debug)]
#[command(name = "farescout")]
#[command(about = "Cheapest round-trip fares via a cloud browser and a web agent")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// .env file with platform and agent secrets
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Console log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for the cheapest round-trip fare
    Search {
        /// Departure city or airport
        #[arg(long)]
        origin: Option<String>,

        /// Arrival city or airport
        #[arg(long)]
        destination: Option<String>,

        /// Outbound date, as the site should read it
        #[arg(long)]
        depart: Option<String>,

        /// Return date
        #[arg(long = "return")]
        return_date: Option<String>,

        /// JSON request file (origin, destination, departDate, returnDate)
        #[arg(long, conflicts_with_all = ["origin", "destination", "depart", "return_date"])]
        request: Option<PathBuf>,

        /// Flight site (google_flights, kayak, skyscanner)
        #[arg(long)]
        site: Option<String>,

        /// Extraction mode (structured, free_text)
        #[arg(long)]
        mode: Option<String>,

        /// Maximum attempts
        #[arg(long)]
        attempts: Option<u32>,

        /// Write the README snapshot (to the configured path if none given)
        #[arg(long, num_args = 0..=1)]
        readme: Option<Option<PathBuf>>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a saved search response as Markdown
    Render {
        /// Response JSON file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show resolved configuration and environment status
    ConfigCheck,
}

/// Dispatch a parsed command line. Returns the process exit code.
pub async fn run(cli: Cli) -> CliResult<i32> {
    let config = cli.config.as_deref();
    let env_file = cli.env_file.as_deref();

    match cli.command {
        Commands::Search {
            origin,
            destination,
            depart,
            return_date,
            request,
            site,
            mode,
            attempts,
            readme,
            json,
        } => {
            let options = SearchOptions {
                origin,
                destination,
                depart,
                return_date,
                request_file: request,
                site: site
                    .map(|s| s.parse())
                    .transpose()
                    .map_err(|e: anyhow::Error| CliError::InvalidInput(e.to_string()))?,
                mode: mode
                    .map(|m| m.parse())
                    .transpose()
                    .map_err(|e: anyhow::Error| CliError::InvalidInput(e.to_string()))?,
                attempts,
                readme,
                json,
            };
            commands::search::execute_search(config, env_file, options).await
        }
        Commands::Render { input, output } => {
            commands::render::execute_render(config, RenderOptions { input, output })?;
            Ok(0)
        }
        Commands::ConfigCheck => commands::config::execute_config_check(config, env_file),
    }
}
