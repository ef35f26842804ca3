//! Markdown search log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::search::{SearchError, SearchRequest, SearchResult};

/// Logger for fare searches.
///
/// Creates a markdown-formatted log file recording each search, its attempts,
/// the sessions it used and the final outcome.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("farescout-logs");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "search_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Fare Search Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        matches!(self.log_level.as_str(), "DEBUG" | "TRACE")
    }

    /// Log the start of a search.
    ///
    /// # Arguments
    /// * `search_id` - Identifier correlating all entries of one search.
    /// * `request` - The request being searched.
    /// * `max_attempts` - Attempt bound for this search.
    pub fn log_search_start(
        &self,
        search_id: &str,
        request: &SearchRequest,
        max_attempts: u32,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "## Search Started - {}\n\n**Search:** {}\n**Route:** {}\n**Dates:** {} to {}\n**Max attempts:** {}\n\n",
            now.to_rfc3339(),
            search_id,
            request.route(),
            request.depart_date,
            request.return_date,
            max_attempts
        );

        if self.is_debug() {
            content.push_str(&format!(
                "**Request:**\n```json\n{}\n```\n\n",
                serde_json::to_string_pretty(request).unwrap_or_default()
            ));
        }

        self.append_to_log(&content)?;
        debug!(search_id, "Search log opened at {}", self.log_file.display());
        Ok(())
    }

    /// Log the start of one attempt.
    pub fn log_attempt_start(&self, attempt: u32, max_attempts: u32) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Attempt {}/{} - {}\n\n",
            attempt,
            max_attempts,
            now.to_rfc3339()
        );
        self.append_to_log(&content)
    }

    /// Log a failed attempt.
    ///
    /// # Arguments
    /// * `attempt` - The attempt that failed (1-based).
    /// * `error` - What went wrong.
    /// * `retry_in` - Backoff before the next attempt, if there is one.
    pub fn log_attempt_failure(
        &self,
        attempt: u32,
        error: &SearchError,
        retry_in: Option<Duration>,
    ) -> Result<()> {
        let next = match retry_in {
            Some(delay) => format!("retrying in {}s", delay.as_secs_f64()),
            None => "no further attempts".to_string(),
        };
        let content = format!(
            "**Attempt {} failed** ({}): {}\n\n**Next:** {}\n\n",
            attempt,
            error.kind(),
            error,
            next
        );
        self.append_to_log(&content)
    }

    /// Log a session lifecycle event (acquired, released).
    pub fn log_session_event(&self, session_id: &str, event: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "- Session `{}` {} at {}\n\n",
            session_id,
            event,
            now.to_rfc3339()
        );
        self.append_to_log(&content)
    }

    /// Log the final outcome of a search.
    pub fn log_search_result(&self, result: &SearchResult) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = match result {
            SearchResult::Success(success) => {
                let cheapest = success.cheapest();
                let mut content = format!(
                    "### Search Succeeded - {}\n\n**Offers:** {}\n**Cheapest:** {} - {} - {}\n",
                    now.to_rfc3339(),
                    success.offers().len(),
                    cheapest.airline,
                    cheapest.price,
                    cheapest.duration
                );
                if let Some(url) = &success.inspector_url {
                    content.push_str(&format!("**Inspector:** {}\n", url));
                }
                content.push_str("\n---\n\n");
                content
            }
            SearchResult::Failure(failure) => format!(
                "### Search Failed - {}\n\n**Attempts:** {}\n**Error:** {}\n\n---\n\n",
                now.to_rfc3339(),
                failure.attempts_exhausted,
                failure.message
            ),
        };

        self.append_to_log(&content)?;
        match result {
            SearchResult::Success(_) => info!("Search result written to {}", self.log_file.display()),
            SearchResult::Failure(failure) => error!("Search failed: {}", failure.message),
        }
        Ok(())
    }

    /// Log an error outside the search flow (configuration, output).
    pub fn log_error(&self, message: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Error - {}\n\n**Error:** {}\n\n",
            now.to_rfc3339(),
            message
        );
        self.append_to_log(&content)
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
