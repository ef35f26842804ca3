//! HTTP adapters for the remote collaborators.
//!
//! - [`BrowserPlatformClient`] provisions and releases cloud browsers
//! - [`AgentRuntimeClient`] drives the LLM web agent against a session

pub mod agent;
pub mod platform;

pub use agent::{AgentEnvelope, AgentRuntimeClient};
pub use platform::BrowserPlatformClient;

/// Read a failed response body for the error message, truncated.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        let snippet: String = body.chars().take(300).collect();
        format!("HTTP {} - {}", status, snippet)
    }
}
