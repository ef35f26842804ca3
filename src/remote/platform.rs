//! Cloud browser platform client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use super::error_body;
use crate::search::{SearchError, SearchResultOf};
use crate::session::{Session, SessionOptions, SessionProvisioner};

const API_KEY_HEADER: &str = "X-BB-API-Key";

/// Session as returned by `POST /v1/sessions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    id: String,
    connect_url: String,
}

/// REST client for the browser platform.
pub struct BrowserPlatformClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
    project_id: String,
}

impl BrowserPlatformClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `api_base` - Platform base URL (e.g. `https://api.browserbase.com`).
    /// * `api_key` - Sent as `X-BB-API-Key`.
    /// * `project_id` - Project every session is created under.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        timeout: Duration,
    ) -> SearchResultOf<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::provisioning(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/sessions", self.api_base)
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/v1/sessions/{}", self.api_base, session_id)
    }

    /// Body of a session creation request
    pub fn create_body(&self, options: &SessionOptions) -> Value {
        let mut browser_settings = Map::new();
        if options.stealth {
            browser_settings.insert("stealth".to_string(), json!(true));
        }
        if let Some(profile_id) = &options.profile_id {
            browser_settings.insert("context".to_string(), json!({ "id": profile_id }));
        }

        let mut body = Map::new();
        body.insert("projectId".to_string(), json!(self.project_id));
        body.insert("browserSettings".to_string(), Value::Object(browser_settings));
        if let Some(pool_id) = &options.pool_id {
            body.insert("poolId".to_string(), json!(pool_id));
        }
        if let Some(region) = &options.region {
            body.insert("region".to_string(), json!(region));
        }
        Value::Object(body)
    }

    /// Body of a release request
    pub fn release_body(&self) -> Value {
        json!({
            "projectId": self.project_id,
            "status": "REQUEST_RELEASE",
        })
    }
}

#[async_trait]
impl SessionProvisioner for BrowserPlatformClient {
    async fn create(&self, options: &SessionOptions) -> SearchResultOf<Session> {
        let response = self
            .http_client
            .post(self.sessions_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.create_body(options))
            .send()
            .await
            .map_err(|e| SearchError::provisioning(format!("Session request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SearchError::provisioning(format!(
                "Session creation rejected: {}",
                error_body(response).await
            )));
        }

        let created: CreatedSession = response.json().await.map_err(|e| {
            SearchError::provisioning(format!("Failed to parse session response: {}", e))
        })?;

        debug!(session_id = %created.id, "Platform created session");
        Ok(Session::new(created.id, created.connect_url))
    }

    async fn delete(&self, session_id: &str) -> SearchResultOf<()> {
        let response = self
            .http_client
            .post(self.session_url(session_id))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.release_body())
            .send()
            .await
            .map_err(|e| SearchError::provisioning(format!("Release request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SearchError::provisioning(format!(
                "Session release rejected: {}",
                error_body(response).await
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BrowserPlatformClient {
        BrowserPlatformClient::new(
            "https://api.browserbase.com/",
            "bb_key",
            "proj_1",
            Duration::from_secs(60),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.api_base(), "https://api.browserbase.com");
        assert_eq!(client.sessions_url(), "https://api.browserbase.com/v1/sessions");
        assert_eq!(
            client.session_url("sess_9"),
            "https://api.browserbase.com/v1/sessions/sess_9"
        );
    }

    #[test]
    fn test_create_body_minimal() {
        let body = client().create_body(&SessionOptions::default());
        assert_eq!(body, json!({ "projectId": "proj_1", "browserSettings": {} }));
    }

    #[test]
    fn test_create_body_with_pool_and_profile() {
        let options = SessionOptions {
            pool_id: Some("pool_a".to_string()),
            profile_id: Some("ctx_b".to_string()),
            stealth: true,
            region: Some("us-west-2".to_string()),
        };
        let body = client().create_body(&options);
        assert_eq!(body["poolId"], "pool_a");
        assert_eq!(body["region"], "us-west-2");
        assert_eq!(body["browserSettings"]["stealth"], true);
        assert_eq!(body["browserSettings"]["context"]["id"], "ctx_b");
    }

    #[test]
    fn test_release_body_and_session_parse() {
        assert_eq!(
            client().release_body(),
            json!({ "projectId": "proj_1", "status": "REQUEST_RELEASE" })
        );

        let created: CreatedSession = serde_json::from_value(json!({
            "id": "sess_1",
            "connectUrl": "wss://connect.browserbase.com/?id=sess_1",
            "status": "RUNNING"
        }))
        .unwrap();
        assert_eq!(created.id, "sess_1");
        assert!(created.connect_url.starts_with("wss://"));
    }
}
