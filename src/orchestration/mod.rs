//! Search orchestration - the core of a fare search
//!
//! This module coordinates a multi-step, partially unreliable remote agent
//! session and turns its output into a stable result:
//! - Fixed search plan per site and extraction mode
//! - Step sequencing against one browser session
//! - Whole-sequence retries with non-decreasing backoff
//! - Normalization of structured or free-text extraction
//!
//! ## Flow
//!
//! ```text
//! SearchRequest ─▶ SessionManager::acquire ─▶ StepSequencer::run
//!                                               │
//!                  SessionLease::release ◀─ Normalizer::normalize
//! ```
//!
//! [`RetryController`] wraps the whole flow. Every retry starts again from
//! navigation on a fresh session; there is no partial resumption.

pub mod normalize;
pub mod plan;
pub mod retry;
pub mod sequencer;

// Re-export main types
pub use normalize::{parse_free_text, FreeTextParse, Normalizer, DEFAULT_FAILURE_MARKERS};
pub use plan::{ExtractionMode, PlanStep, PlannedStep, SearchPlan, SiteTarget, StepAction};
pub use retry::{BackoffPolicy, LinearBackoff, RetryController, DEFAULT_MAX_ATTEMPTS};
pub use sequencer::{offer_schema, BrowserAutomation, RawExtraction, StepSequencer};
