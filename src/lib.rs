//! Farescout - cheapest round-trip fares through a remote web agent
//!
//! Farescout drives an LLM web agent inside a cloud browser to search a
//! flight site, and turns whatever the agent manages to extract into a
//! stable result:
//!
//! - **`search`** - Request, offer and result types, price comparison
//! - **`session`** - Remote browser lifecycle with guaranteed release
//! - **`orchestration`** - Search plan, step sequencer, retries, normalization
//! - **`observability`** - Markdown search log and tracing setup
//! - **`config`** - TOML configuration and `.env` secrets
//! - **`remote`** - HTTP adapters for the browser platform and agent runtime
//! - **`report`** - README snapshot rendering
//! - **`cli`** - The `farescout` command line
//!
//! # Features
//!
//! The core (`search`, `session`, `orchestration`, `observability::Logger`)
//! is always built. Adapters and surfaces are feature-gated:
//!
//! ```toml
//! [dependencies]
//! farescout = { version = "0.3", default-features = false, features = ["remote"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use farescout::prelude::*;
//! use std::sync::Arc;
//!
//! async fn example(
//!     provisioner: Arc<dyn SessionProvisioner>,
//!     automation: Arc<dyn BrowserAutomation>,
//! ) {
//!     let sessions = SessionManager::new(provisioner, SessionOptions::default());
//!     let sequencer = StepSequencer::new(automation);
//!     let controller = RetryController::new(sessions, sequencer, Normalizer::default());
//!
//!     let request =
//!         SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap();
//!     match controller.execute(&request).await {
//!         SearchResult::Success(found) => println!("Cheapest: {}", found.cheapest().price),
//!         SearchResult::Failure(failed) => eprintln!("{}", failed.message),
//!     }
//! }
//! ```

/// Search data model
pub mod search;

/// Remote browser sessions
pub mod session;

/// Search orchestration
pub mod orchestration;

/// Search log and tracing
pub mod observability;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// HTTP collaborators (enabled with the `remote` feature)
#[cfg(feature = "remote")]
pub mod remote;

/// README snapshot (enabled with the `report` feature)
#[cfg(feature = "report")]
pub mod report;

/// Command line (enabled with the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::search::{
        Offer, OfferSet, SearchError, SearchFailure, SearchRequest, SearchResponse, SearchResult,
        SearchResultOf, SearchSuccess,
    };

    pub use crate::session::{
        Session, SessionLease, SessionManager, SessionOptions, SessionProvisioner,
    };

    pub use crate::orchestration::{
        BackoffPolicy, BrowserAutomation, ExtractionMode, LinearBackoff, Normalizer,
        RawExtraction, RetryController, SiteTarget, StepSequencer,
    };

    pub use crate::observability::Logger;

    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "remote")]
    pub use crate::remote::{AgentRuntimeClient, BrowserPlatformClient};

    #[cfg(feature = "report")]
    pub use crate::report::render_markdown;
}
