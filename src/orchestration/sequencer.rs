//! Step sequencer - runs the search plan against one session

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::plan::{ExtractionMode, PlanStep, SearchPlan, SiteTarget, StepAction};
use crate::search::{Offer, SearchError, SearchRequest, SearchResultOf};
use crate::session::Session;

/// Remote action and extraction capability of the web agent.
#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    /// Load a URL in the session's page
    async fn navigate(&self, session: &Session, url: &str) -> SearchResultOf<()> {
        self.perform_action(session, &format!("Navigate to {}", url))
            .await
    }

    /// Carry out one natural-language action
    async fn perform_action(&self, session: &Session, instruction: &str) -> SearchResultOf<()>;

    /// Block until the described condition holds on the page
    async fn wait_for_condition(
        &self,
        session: &Session,
        condition: &str,
        timeout: Duration,
    ) -> SearchResultOf<()>;

    /// Schema-constrained extraction of offers
    async fn extract_structured(
        &self,
        session: &Session,
        instruction: &str,
        schema: &Value,
    ) -> SearchResultOf<Vec<Offer>>;

    /// Free-text answer from the agent
    async fn extract_free_text(&self, session: &Session, instruction: &str)
        -> SearchResultOf<String>;
}

/// Output of the final plan step
#[derive(Debug, Clone, PartialEq)]
pub enum RawExtraction {
    Structured(Vec<Offer>),
    FreeText(String),
}

/// JSON Schema describing the offer list requested from the agent
pub fn offer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "flights": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "airline": { "type": "string" },
                        "price": { "type": "string", "description": "Price with currency symbol, e.g. $538" },
                        "duration": { "type": "string", "description": "Total travel time, e.g. 15h 20m" },
                        "stops": { "type": "integer", "minimum": 0 },
                        "departureTime": { "type": "string" },
                        "arrivalTime": { "type": "string" }
                    },
                    "required": ["airline", "price", "duration"]
                }
            }
        },
        "required": ["flights"]
    })
}

/// Runs the plan step by step. No step is retried on its own; the first
/// failure aborts the sequence.
pub struct StepSequencer {
    automation: Arc<dyn BrowserAutomation>,
    site: SiteTarget,
    mode: ExtractionMode,
    results_timeout: Duration,
}

impl StepSequencer {
    /// Sequencer with Google Flights, structured extraction and a 45s wait
    pub fn new(automation: Arc<dyn BrowserAutomation>) -> Self {
        Self {
            automation,
            site: SiteTarget::default(),
            mode: ExtractionMode::default(),
            results_timeout: Duration::from_secs(45),
        }
    }

    pub fn with_site(mut self, site: SiteTarget) -> Self {
        self.site = site;
        self
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_results_timeout(mut self, timeout: Duration) -> Self {
        self.results_timeout = timeout;
        self
    }

    pub fn site(&self) -> SiteTarget {
        self.site
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Plan this sequencer would run for a request
    pub fn plan(&self, request: &SearchRequest) -> SearchPlan {
        SearchPlan::for_request(self.site, request, self.mode, self.results_timeout)
    }

    /// Execute the full plan and return what the last step extracted.
    pub async fn run(
        &self,
        session: &Session,
        request: &SearchRequest,
    ) -> SearchResultOf<RawExtraction> {
        let plan = self.plan(request);
        let total = plan.steps().len();
        let mut extraction = None;

        for (index, planned) in plan.steps().iter().enumerate() {
            debug!(
                session_id = session.id(),
                step = planned.step.name(),
                "Step {}/{}",
                index + 1,
                total
            );

            let step = planned.step;
            match &planned.action {
                StepAction::Navigate { url } => {
                    self.automation
                        .navigate(session, url)
                        .await
                        .map_err(|e| attribute(step, e))?;
                }
                StepAction::Act { instruction } => {
                    self.automation
                        .perform_action(session, instruction)
                        .await
                        .map_err(|e| attribute(step, e))?;
                }
                StepAction::Wait { condition, timeout } => {
                    let wait = self.automation.wait_for_condition(session, condition, *timeout);
                    match tokio::time::timeout(*timeout, wait).await {
                        Ok(outcome) => outcome.map_err(|e| attribute(step, e))?,
                        Err(_) => {
                            return Err(SearchError::Timeout {
                                step: step.name().to_string(),
                                seconds: timeout.as_secs(),
                            })
                        }
                    }
                }
                StepAction::ExtractStructured { instruction } => {
                    let offers = self
                        .automation
                        .extract_structured(session, instruction, &offer_schema())
                        .await
                        .map_err(|e| attribute(step, e))?;
                    extraction = Some(RawExtraction::Structured(offers));
                }
                StepAction::ExtractFreeText { instruction } => {
                    let text = self
                        .automation
                        .extract_free_text(session, instruction)
                        .await
                        .map_err(|e| attribute(step, e))?;
                    extraction = Some(RawExtraction::FreeText(text));
                }
            }
        }

        extraction.ok_or_else(|| SearchError::step(PlanStep::Extract.name(), "plan produced no extraction"))
    }
}

/// Tag a collaborator error with the step it happened in.
fn attribute(step: PlanStep, error: SearchError) -> SearchError {
    match error {
        SearchError::Timeout { seconds, .. } => SearchError::Timeout {
            step: step.name().to_string(),
            seconds,
        },
        SearchError::StepExecution { message, .. } => SearchError::step(step.name(), message),
        other => SearchError::step(step.name(), other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedAutomation {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        hang_on_wait: bool,
    }

    impl ScriptedAutomation {
        fn record(&self, call: String) -> SearchResultOf<()> {
            let fail = self.fail_on.map(|needle| call.contains(needle)).unwrap_or(false);
            self.calls.lock().unwrap().push(call);
            if fail {
                Err(SearchError::step("remote", "element not interactable"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl BrowserAutomation for ScriptedAutomation {
        async fn navigate(&self, _session: &Session, url: &str) -> SearchResultOf<()> {
            self.record(format!("goto {}", url))
        }

        async fn perform_action(&self, _session: &Session, instruction: &str) -> SearchResultOf<()> {
            self.record(format!("act {}", instruction))
        }

        async fn wait_for_condition(
            &self,
            _session: &Session,
            condition: &str,
            _timeout: Duration,
        ) -> SearchResultOf<()> {
            self.record(format!("wait {}", condition))?;
            if self.hang_on_wait {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn extract_structured(
            &self,
            _session: &Session,
            instruction: &str,
            schema: &Value,
        ) -> SearchResultOf<Vec<Offer>> {
            assert!(schema["properties"]["flights"].is_object());
            self.record(format!("extract {}", instruction))?;
            Ok(vec![Offer::new("Turkish Airlines", "$538", "15h")])
        }

        async fn extract_free_text(
            &self,
            _session: &Session,
            instruction: &str,
        ) -> SearchResultOf<String> {
            self.record(format!("text {}", instruction))?;
            Ok("CHEAPEST FLIGHT: Turkish Airlines - $538 - 15h".to_string())
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap()
    }

    fn session() -> Session {
        Session::new("sess_1", "wss://connect.example")
    }

    #[tokio::test]
    async fn test_runs_every_step_in_order() {
        let automation = Arc::new(ScriptedAutomation::default());
        let sequencer = StepSequencer::new(automation.clone());

        let raw = sequencer.run(&session(), &request()).await.unwrap();
        assert_eq!(
            raw,
            RawExtraction::Structured(vec![Offer::new("Turkish Airlines", "$538", "15h")])
        );

        let calls = automation.calls.lock().unwrap();
        assert_eq!(calls.len(), 10);
        assert!(calls[0].starts_with("goto https://www.google.com/travel/flights"));
        assert!(calls[8].starts_with("wait "));
        assert!(calls[9].starts_with("extract "));
    }

    #[tokio::test]
    async fn test_free_text_mode() {
        let automation = Arc::new(ScriptedAutomation::default());
        let sequencer = StepSequencer::new(automation).with_mode(ExtractionMode::FreeText);

        let raw = sequencer.run(&session(), &request()).await.unwrap();
        assert!(matches!(raw, RawExtraction::FreeText(text) if text.starts_with("CHEAPEST")));
    }

    #[tokio::test]
    async fn test_failure_aborts_sequence() {
        let automation = Arc::new(ScriptedAutomation {
            fail_on: Some("Search button"),
            ..Default::default()
        });
        let sequencer = StepSequencer::new(automation.clone());

        let err = sequencer.run(&session(), &request()).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::step("submit", "element not interactable")
        );
        // Nothing after submit ran
        assert_eq!(automation.calls.lock().unwrap().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_wait_is_bounded() {
        let automation = Arc::new(ScriptedAutomation {
            hang_on_wait: true,
            ..Default::default()
        });
        let sequencer =
            StepSequencer::new(automation.clone()).with_results_timeout(Duration::from_secs(45));

        let err = sequencer.run(&session(), &request()).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Timeout {
                step: "wait_for_results".to_string(),
                seconds: 45
            }
        );
        assert_eq!(automation.calls.lock().unwrap().len(), 9);
    }
}
