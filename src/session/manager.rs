//! Session lifecycle: acquire, lease, guaranteed release

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::traits::{Session, SessionOptions, SessionProvisioner};
use crate::search::{SearchError, SearchRequest, SearchResultOf};

/// Placeholder substituted with the session id in inspector URL templates
pub const SESSION_ID_PLACEHOLDER: &str = "{session_id}";

struct Inner {
    provisioner: Arc<dyn SessionProvisioner>,
    live: Mutex<HashSet<String>>,
}

impl Inner {
    /// Forget the session; true if it was still live.
    fn retire(&self, session_id: &str) -> bool {
        match self.live.lock() {
            Ok(mut live) => live.remove(session_id),
            Err(poisoned) => poisoned.into_inner().remove(session_id),
        }
    }

    async fn release(self: &Arc<Self>, session_id: &str) {
        if !self.retire(session_id) {
            debug!(session_id, "Session already released");
            return;
        }

        let mut pending = PendingDelete {
            inner: Arc::clone(self),
            session_id: Some(session_id.to_string()),
        };
        let outcome = self.provisioner.delete(session_id).await;
        pending.session_id = None;

        match outcome {
            Ok(()) => info!(session_id, "Released browser session"),
            Err(e) => warn!(session_id, error = %e, "Failed to release browser session"),
        }
    }

    /// Hand the delete of an already retired session to the runtime.
    fn spawn_delete(self: Arc<Self>, session_id: String) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match self.provisioner.delete(&session_id).await {
                        Ok(()) => info!(%session_id, "Released browser session in background"),
                        Err(e) => {
                            warn!(%session_id, error = %e, "Background session release failed")
                        }
                    }
                });
            }
            Err(_) => warn!(%session_id, "No runtime to release session, browser leaked"),
        }
    }
}

/// Retired session whose delete has not completed yet.
///
/// Dropped with the id still set means the release future was cancelled
/// mid-delete, so the delete moves to the background.
struct PendingDelete {
    inner: Arc<Inner>,
    session_id: Option<String>,
}

impl Drop for PendingDelete {
    fn drop(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            warn!(%session_id, "Session release interrupted, releasing in background");
            Arc::clone(&self.inner).spawn_delete(session_id);
        }
    }
}

/// Owns every remote browser acquired for searches.
///
/// Pool, profile and stealth settings are explicit configuration. The
/// manager never retries provisioning on its own.
pub struct SessionManager {
    inner: Arc<Inner>,
    options: SessionOptions,
    inspector_template: Option<String>,
}

impl SessionManager {
    /// Create a manager over a provisioning service
    pub fn new(provisioner: Arc<dyn SessionProvisioner>, options: SessionOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                provisioner,
                live: Mutex::new(HashSet::new()),
            }),
            options,
            inspector_template: None,
        }
    }

    /// Set the inspector URL template (must contain `{session_id}`)
    pub fn with_inspector_template(mut self, template: impl Into<String>) -> Self {
        self.inspector_template = Some(template.into());
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Allocate a browser for one attempt.
    pub async fn acquire(&self, request: &SearchRequest) -> SearchResultOf<SessionLease> {
        debug!(
            route = %request.route(),
            pool = self.options.pool_id.as_deref().unwrap_or("-"),
            "Acquiring browser session"
        );

        let session = self
            .inner
            .provisioner
            .create(&self.options)
            .await
            .map_err(|e| match e {
                SearchError::Provisioning { .. } => e,
                other => SearchError::provisioning(other.to_string()),
            })?;

        {
            let mut live = match self.inner.live.lock() {
                Ok(live) => live,
                Err(poisoned) => poisoned.into_inner(),
            };
            live.insert(session.id().to_string());
        }

        info!(session_id = session.id(), "Acquired browser session");
        Ok(SessionLease {
            session,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Release a session. Safe to call any number of times; never fails.
    pub async fn release(&self, session: &Session) {
        self.inner.release(session.id()).await;
    }

    /// Diagnostic URL for a session, if a template is configured
    pub fn inspector_url(&self, session: &Session) -> Option<String> {
        self.inspector_template
            .as_ref()
            .map(|template| template.replace(SESSION_ID_PLACEHOLDER, session.id()))
    }

    /// Number of sessions acquired and not yet released
    pub fn live_count(&self) -> usize {
        match self.inner.live.lock() {
            Ok(live) => live.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// A session checked out for one attempt.
///
/// Call [`SessionLease::release`] when the attempt ends. If the lease is
/// dropped while still live (a cancelled future, a panic), the delete is
/// handed to the tokio runtime instead.
pub struct SessionLease {
    session: Session,
    inner: Arc<Inner>,
}

impl SessionLease {
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Release the browser and consume the lease.
    pub async fn release(self) {
        self.inner.release(self.session.id()).await;
    }
}

impl Deref for SessionLease {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        // Already released through `release`
        if !self.inner.retire(self.session.id()) {
            return;
        }

        let session_id = self.session.id().to_string();
        warn!(%session_id, "Session lease dropped while live, releasing in background");
        Arc::clone(&self.inner).spawn_delete(session_id);
    }
}
