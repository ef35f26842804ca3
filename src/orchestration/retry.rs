//! Retry controller - whole-sequence retries with backoff

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::normalize::Normalizer;
use super::sequencer::StepSequencer;
use crate::observability::Logger;
use crate::search::{
    SearchError, SearchFailure, SearchRequest, SearchResult, SearchResultOf, SearchSuccess,
};
use crate::session::{SessionLease, SessionManager};

/// Delay before the attempt following `attempt` (1-based).
///
/// Implementations must be non-decreasing in `attempt`.
pub trait BackoffPolicy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

impl<F> BackoffPolicy for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// `attempt × unit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    unit: Duration,
}

impl LinearBackoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl BackoffPolicy for LinearBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt)
    }
}

/// Default number of attempts per search
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runs searches: acquire, sequence, normalize, release, and retry from
/// scratch on any failure.
///
/// No error escapes [`RetryController::execute`]; exhausted attempts come
/// back as [`SearchResult::Failure`].
pub struct RetryController {
    sessions: SessionManager,
    sequencer: StepSequencer,
    normalizer: Normalizer,
    max_attempts: u32,
    backoff: Arc<dyn BackoffPolicy>,
    logger: Option<Arc<Logger>>,
}

impl RetryController {
    /// Controller with 3 attempts and 5s linear backoff
    pub fn new(sessions: SessionManager, sequencer: StepSequencer, normalizer: Normalizer) -> Self {
        Self {
            sessions,
            sequencer,
            normalizer,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Arc::new(LinearBackoff::default()),
            logger: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Mirror progress into a Markdown session log
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run a search with the configured attempt bound and backoff.
    pub async fn execute(&self, request: &SearchRequest) -> SearchResult {
        self.execute_with(request, self.max_attempts, self.backoff.as_ref())
            .await
    }

    /// Run a search with an explicit attempt bound and backoff.
    ///
    /// A bound of 0 is treated as 1. Invalid requests fail before any
    /// session is acquired, with `attempts_exhausted == 0`.
    pub async fn execute_with(
        &self,
        request: &SearchRequest,
        max_attempts: u32,
        backoff: &dyn BackoffPolicy,
    ) -> SearchResult {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Rejecting search request");
            let result = SearchResult::Failure(SearchFailure {
                request: request.clone(),
                message: e.to_string(),
                attempts_exhausted: 0,
            });
            self.note(|logger| logger.log_search_result(&result));
            return result;
        }

        let max_attempts = max_attempts.max(1);
        let search_id = uuid::Uuid::new_v4().to_string();
        info!(
            %search_id,
            route = %request.route(),
            site = %self.sequencer.site(),
            max_attempts,
            "Starting fare search"
        );
        self.note(|logger| logger.log_search_start(&search_id, request, max_attempts));

        let mut attempts = 0;
        let mut last_error: Option<SearchError> = None;

        for attempt in 1..=max_attempts {
            attempts = attempt;
            info!(%search_id, attempt, max_attempts, "Search attempt");
            self.note(|logger| logger.log_attempt_start(attempt, max_attempts));

            match self.attempt(request).await {
                Ok(success) => {
                    info!(
                        %search_id,
                        attempt,
                        offers = success.offers().len(),
                        cheapest = %success.cheapest().price,
                        "Fare search succeeded"
                    );
                    let result = SearchResult::Success(success);
                    self.note(|logger| logger.log_search_result(&result));
                    return result;
                }
                Err(e) => {
                    let retry_in = if attempt < max_attempts && e.is_retryable() {
                        Some(backoff.delay(attempt))
                    } else {
                        None
                    };
                    warn!(
                        %search_id,
                        attempt,
                        kind = e.kind(),
                        error = %e,
                        retry_in_secs = retry_in.map(|d| d.as_secs_f64()),
                        "Search attempt failed"
                    );
                    self.note(|logger| logger.log_attempt_failure(attempt, &e, retry_in));
                    let retryable = e.is_retryable();
                    last_error = Some(e);

                    match retry_in {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None if !retryable => break,
                        None => {}
                    }
                }
            }
        }

        let result = SearchResult::Failure(SearchFailure {
            request: request.clone(),
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "search did not run".to_string()),
            attempts_exhausted: attempts,
        });
        self.note(|logger| logger.log_search_result(&result));
        result
    }

    /// One attempt on a fresh session. The session is released before this
    /// returns, whatever the outcome.
    async fn attempt(&self, request: &SearchRequest) -> SearchResultOf<SearchSuccess> {
        let lease = self.sessions.acquire(request).await?;
        let session_id = lease.id().to_string();
        self.note(|logger| logger.log_session_event(&session_id, "acquired"));

        let outcome = self.run_on(&lease, request).await;

        lease.release().await;
        self.note(|logger| logger.log_session_event(&session_id, "released"));
        outcome
    }

    async fn run_on(
        &self,
        lease: &SessionLease,
        request: &SearchRequest,
    ) -> SearchResultOf<SearchSuccess> {
        let raw = self.sequencer.run(lease, request).await?;
        let offers = self.normalizer.normalize(raw)?;
        Ok(SearchSuccess {
            request: request.clone(),
            offers,
            session_ref: lease.id().to_string(),
            inspector_url: self.sessions.inspector_url(lease),
        })
    }

    /// Session log writes never fail a search.
    fn note<F>(&self, write: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                warn!(error = %e, "Failed to write session log");
            }
        }
    }
}
