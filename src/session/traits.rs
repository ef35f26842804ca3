//! Remote browser handles and the provisioning seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::search::SearchResultOf;

/// Handle to one remote browser.
///
/// Deliberately not `Clone`: a session belongs to exactly one attempt.
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    id: String,
    connect_url: String,
}

impl Session {
    pub fn new(id: impl Into<String>, connect_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connect_url: connect_url.into(),
        }
    }

    /// Platform-assigned session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Control endpoint (CDP websocket) for the browser
    pub fn connect_url(&self) -> &str {
        &self.connect_url
    }
}

/// How a browser should be provisioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Warm browser pool to draw from
    pub pool_id: Option<String>,
    /// Persisted browser profile (cookies, consent banners)
    pub profile_id: Option<String>,
    /// Ask the platform for fingerprint hardening
    pub stealth: bool,
    /// Preferred datacenter region
    pub region: Option<String>,
}

/// Browser provisioning service.
#[async_trait]
pub trait SessionProvisioner: Send + Sync {
    /// Allocate a browser. Quota or pool exhaustion surfaces as
    /// `SearchError::Provisioning`.
    async fn create(&self, options: &SessionOptions) -> SearchResultOf<Session>;

    /// Tear the browser down.
    async fn delete(&self, session_id: &str) -> SearchResultOf<()>;
}
