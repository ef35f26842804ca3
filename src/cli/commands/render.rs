//! Render command - README snapshot from saved search JSON

use chrono::Utc;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::error::{CliError, CliResult};
use crate::config::ConfigurationLoader;
use crate::report::{render_markdown_titled, write_report};
use crate::search::SearchResponse;

/// Options for the render command
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Response JSON; stdin when unset
    pub input: Option<PathBuf>,
    /// Report destination; stdout when unset
    pub output: Option<PathBuf>,
}

/// Parse a saved `SearchResponse`.
pub fn parse_response(payload: &str) -> CliResult<SearchResponse> {
    serde_json::from_str(payload)
        .map_err(|e| CliError::InvalidInput(format!("not a search response: {}", e)))
}

/// Run the render command.
pub fn execute_render(config_path: Option<&Path>, options: RenderOptions) -> CliResult<()> {
    let payload = match &options.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let response = parse_response(&payload)?;
    let loader = ConfigurationLoader::new(config_path)?;
    let markdown = render_markdown_titled(&response, &loader.config.report.title, Utc::now());

    match &options.output {
        Some(path) => {
            write_report(path, &markdown)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", markdown),
    }

    Ok(())
}
