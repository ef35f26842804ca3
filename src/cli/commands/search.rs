//! Search command - run one fare search end to end

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::print_response;
use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::observability::Logger;
use crate::orchestration::{
    ExtractionMode, RetryController, SiteTarget, StepSequencer,
};
use crate::remote::{AgentRuntimeClient, BrowserPlatformClient};
use crate::report::{render_markdown_titled, write_report};
use crate::search::{SearchRequest, SearchResponse};
use crate::session::SessionManager;

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub depart: Option<String>,
    pub return_date: Option<String>,
    /// JSON request file, used instead of the route flags
    pub request_file: Option<PathBuf>,
    pub site: Option<SiteTarget>,
    pub mode: Option<ExtractionMode>,
    pub attempts: Option<u32>,
    /// `Some(None)` writes to the configured report path
    pub readme: Option<Option<PathBuf>>,
    pub json: bool,
}

/// Build the request from a JSON file or the route flags.
pub fn build_request(options: &SearchOptions) -> CliResult<SearchRequest> {
    if let Some(path) = &options.request_file {
        let payload = std::fs::read_to_string(path).map_err(|e| {
            CliError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        })?;
        return Ok(SearchRequest::from_json(&payload)?);
    }

    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    Ok(SearchRequest::new(
        field(&options.origin),
        field(&options.destination),
        field(&options.depart),
        field(&options.return_date),
    )?)
}

/// Run the search command. Returns the process exit code.
pub async fn execute_search(
    config_path: Option<&Path>,
    env_file: Option<&Path>,
    options: SearchOptions,
) -> CliResult<i32> {
    let request = build_request(&options)?;

    let env = EnvironmentLoader::new(env_file);
    let missing = env.missing_required();
    if !missing.is_empty() {
        return Err(CliError::MissingEnvironment(
            missing.into_iter().map(String::from).collect(),
        ));
    }
    let (api_key, project_id) = match (env.api_key(), env.project_id()) {
        (Some(key), Some(project)) => (key, project),
        _ => return Err(CliError::ConfigError("platform credentials unavailable".to_string())),
    };

    let loader = ConfigurationLoader::new(config_path)?;
    let config = &loader.config;

    let site = match options.site {
        Some(site) => site,
        None => loader.site()?,
    };
    let mode = match options.mode {
        Some(mode) => mode,
        None => loader.extraction_mode()?,
    };

    let platform = BrowserPlatformClient::new(
        &config.platform.api_base,
        api_key,
        project_id,
        loader.request_timeout(),
    )?;
    let endpoint = env
        .agent_endpoint()
        .unwrap_or_else(|| config.agent.endpoint.clone());
    let mut agent = AgentRuntimeClient::new(endpoint, &config.agent.model, loader.request_timeout())?;
    if let Some(key) = env.agent_api_key() {
        agent = agent.with_api_key(key);
    }

    let logger = Logger::new(loader.log_file().as_deref(), Some(&config.logging.log_level))?;
    info!("Search log: {}", logger.log_file().display());

    let sessions = SessionManager::new(Arc::new(platform), loader.session_options())
        .with_inspector_template(loader.inspector_template());
    let sequencer = StepSequencer::new(Arc::new(agent))
        .with_site(site)
        .with_mode(mode)
        .with_results_timeout(loader.results_timeout());
    let controller = RetryController::new(sessions, sequencer, loader.normalizer())
        .with_max_attempts(options.attempts.unwrap_or_else(|| loader.max_attempts()))
        .with_backoff(Arc::new(loader.backoff()))
        .with_logger(Arc::new(logger));

    let result = controller.execute(&request).await;
    let response = result.to_response();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    if let Some(readme) = &options.readme {
        let path = readme.clone().unwrap_or_else(|| loader.report_output_path());
        write_snapshot(&response, &config.report.title, &path)?;
        if !options.json {
            println!("Report written to {}", path.display());
        }
    }

    Ok(if response.success { 0 } else { 1 })
}

fn write_snapshot(response: &SearchResponse, title: &str, path: &Path) -> CliResult<()> {
    let markdown = render_markdown_titled(response, title, Utc::now());
    write_report(path, &markdown)?;
    Ok(())
}
