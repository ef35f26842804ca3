//! Agent runtime client.
//!
//! The runtime attaches an LLM web agent to a platform session (by connect
//! URL) and exposes act/wait/extract over HTTP. Every call answers with a
//! `{success, result?, error?}` envelope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::error_body;
use crate::orchestration::BrowserAutomation;
use crate::search::{Offer, SearchError, SearchResultOf};
use crate::session::Session;

/// Step name used until the sequencer attributes the error
const REMOTE: &str = "remote";

/// Response envelope of the agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEnvelope {
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentEnvelope {
    /// Payload of a successful call; the agent's error message otherwise.
    pub fn into_result(self) -> SearchResultOf<Value> {
        if self.success {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(SearchError::step(
                REMOTE,
                self.error
                    .unwrap_or_else(|| "agent reported failure without a message".to_string()),
            ))
        }
    }
}

/// Offers from an extraction payload: `{"flights": [...]}` or a bare array.
pub fn offers_from_payload(payload: Value) -> SearchResultOf<Vec<Offer>> {
    let list = match payload {
        Value::Object(mut map) => map.remove("flights").unwrap_or(Value::Null),
        other => other,
    };
    match list {
        Value::Null => Ok(Vec::new()),
        list => serde_json::from_value(list)
            .map_err(|e| SearchError::step(REMOTE, format!("malformed extraction: {}", e))),
    }
}

/// HTTP client for the agent runtime.
pub struct AgentRuntimeClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl AgentRuntimeClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `endpoint` - Runtime base URL.
    /// * `model` - Model the agent should use.
    /// * `timeout` - Per-request timeout for act and extract calls.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> SearchResultOf<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::step(REMOTE, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
        })
    }

    /// Set the model provider key forwarded to the runtime.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body shared by every call
    pub fn body(&self, session: &Session, instruction: &str) -> Value {
        json!({
            "sessionId": session.id(),
            "connectUrl": session.connect_url(),
            "instruction": instruction,
            "model": self.model,
        })
    }

    async fn call(&self, path: &str, body: Value, timeout: Option<Duration>) -> SearchResultOf<Value> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, "Agent runtime call");

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::step(REMOTE, format!("{} timed out", path))
            } else {
                SearchError::step(REMOTE, format!("HTTP request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(SearchError::step(REMOTE, error_body(response).await));
        }

        let envelope: AgentEnvelope = response
            .json()
            .await
            .map_err(|e| SearchError::step(REMOTE, format!("Failed to parse agent response: {}", e)))?;

        envelope.into_result()
    }
}

#[async_trait]
impl BrowserAutomation for AgentRuntimeClient {
    async fn navigate(&self, session: &Session, url: &str) -> SearchResultOf<()> {
        let mut body = self.body(session, &format!("Navigate to {}", url));
        body["url"] = json!(url);
        self.call("act", body, None).await.map(|_| ())
    }

    async fn perform_action(&self, session: &Session, instruction: &str) -> SearchResultOf<()> {
        self.call("act", self.body(session, instruction), None)
            .await
            .map(|_| ())
    }

    async fn wait_for_condition(
        &self,
        session: &Session,
        condition: &str,
        timeout: Duration,
    ) -> SearchResultOf<()> {
        let mut body = self.body(session, condition);
        body["timeoutMs"] = json!(timeout.as_millis() as u64);
        // Backstop only. Under `StepSequencer` the step bound of `timeout`
        // ends the wait first and reports it as a step timeout.
        self.call("wait", body, Some(timeout + Duration::from_secs(5)))
            .await
            .map(|_| ())
    }

    async fn extract_structured(
        &self,
        session: &Session,
        instruction: &str,
        schema: &Value,
    ) -> SearchResultOf<Vec<Offer>> {
        let mut body = self.body(session, instruction);
        body["schema"] = schema.clone();
        let payload = self.call("extract", body, None).await?;
        offers_from_payload(payload)
    }

    async fn extract_free_text(
        &self,
        session: &Session,
        instruction: &str,
    ) -> SearchResultOf<String> {
        let payload = self
            .call("extract-text", self.body(session, instruction), None)
            .await?;
        match payload {
            Value::String(text) => Ok(text),
            Value::Object(mut map) => match map.remove("text") {
                Some(Value::String(text)) => Ok(text),
                _ => Err(SearchError::step(REMOTE, "extract-text returned no text")),
            },
            Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }
}
