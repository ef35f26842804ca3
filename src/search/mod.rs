//! Search data model: requests, offers, outcomes
//!
//! - [`SearchRequest`] - validated route and dates
//! - [`Offer`] - one extracted flight option, price kept as display text
//! - [`OfferSet`] - offers plus the designated cheapest one
//! - [`SearchResult`] - success or failure outcome, never an error
//! - [`SearchResponse`] - the JSON shape handed to callers and reports

pub mod errors;
pub mod offer;
pub mod request;
pub mod result;

pub use errors::{SearchError, SearchResultOf};
pub use offer::{cheapest_index, derived_price, Offer};
pub use request::SearchRequest;
pub use result::{
    OfferSet, SearchData, SearchFailure, SearchResponse, SearchResult, SearchSuccess,
};
