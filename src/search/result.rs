//! Search outcomes and their wire form

use serde::{Deserialize, Serialize};

use super::errors::{SearchError, SearchResultOf};
use super::offer::{cheapest_index, Offer};
use super::request::SearchRequest;

/// Non-empty list of offers with a designated cheapest one.
///
/// The cheapest offer is stored as an index, so it is always a member of
/// the list.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSet {
    offers: Vec<Offer>,
    cheapest: usize,
}

impl OfferSet {
    /// Pick the cheapest offer by derived price.
    pub fn from_offers(offers: Vec<Offer>) -> SearchResultOf<Self> {
        if offers.is_empty() {
            return Err(SearchError::empty("extraction returned no offers"));
        }
        let cheapest = cheapest_index(&offers).ok_or_else(|| {
            SearchError::empty(format!(
                "none of the {} offers has a comparable price",
                offers.len()
            ))
        })?;
        Ok(Self { offers, cheapest })
    }

    /// Use an explicitly designated cheapest offer.
    ///
    /// An equal offer already in the list is reused; otherwise the designated
    /// offer is appended.
    pub fn with_designated(mut offers: Vec<Offer>, designated: Offer) -> Self {
        let cheapest = match offers.iter().position(|offer| *offer == designated) {
            Some(index) => index,
            None => {
                offers.push(designated);
                offers.len() - 1
            }
        };
        Self { offers, cheapest }
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn cheapest(&self) -> &Offer {
        &self.offers[self.cheapest]
    }

    pub fn cheapest_index(&self) -> usize {
        self.cheapest
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

/// Successful search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSuccess {
    pub request: SearchRequest,
    pub offers: OfferSet,
    /// Session that produced the offers
    pub session_ref: String,
    /// Diagnostic URL for the session, when the platform provides one
    pub inspector_url: Option<String>,
}

impl SearchSuccess {
    pub fn offers(&self) -> &[Offer] {
        self.offers.offers()
    }

    pub fn cheapest(&self) -> &Offer {
        self.offers.cheapest()
    }
}

/// Search that ran out of attempts
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFailure {
    pub request: SearchRequest,
    /// Message of the last error seen
    pub message: String,
    pub attempts_exhausted: u32,
}

impl SearchFailure {
    /// Convert into the terminal error for callers that want a `Result`.
    pub fn into_error(self) -> SearchError {
        SearchError::ExhaustedRetries {
            attempts: self.attempts_exhausted,
            last_error: self.message,
        }
    }
}

/// Outcome of a search. Always well-formed, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Success(SearchSuccess),
    Failure(SearchFailure),
}

impl SearchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn request(&self) -> &SearchRequest {
        match self {
            Self::Success(success) => &success.request,
            Self::Failure(failure) => &failure.request,
        }
    }

    /// Success payload, or the exhausted-retries error.
    pub fn into_result(self) -> SearchResultOf<SearchSuccess> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) => Err(failure.into_error()),
        }
    }

    /// Wire form of this result
    pub fn to_response(&self) -> SearchResponse {
        SearchResponse::from(self)
    }
}

/// JSON response returned to callers and fed to the report renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SearchData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Echo of the request on failure, so reports can still name the route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_params: Option<SearchRequest>,
}

/// Success payload of a [`SearchResponse`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub search_params: SearchRequest,
    pub all_flights: Vec<Offer>,
    pub cheapest_flight: Offer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_inspector_url: Option<String>,
}

impl SearchResponse {
    /// Route parameters, whichever branch carries them
    pub fn params(&self) -> Option<&SearchRequest> {
        self.data
            .as_ref()
            .map(|data| &data.search_params)
            .or(self.search_params.as_ref())
    }
}

impl From<&SearchResult> for SearchResponse {
    fn from(result: &SearchResult) -> Self {
        match result {
            SearchResult::Success(success) => Self {
                success: true,
                data: Some(SearchData {
                    search_params: success.request.clone(),
                    all_flights: success.offers().to_vec(),
                    cheapest_flight: success.cheapest().clone(),
                    session_inspector_url: success.inspector_url.clone(),
                }),
                error: None,
                message: None,
                search_params: None,
            },
            SearchResult::Failure(failure) => Self {
                success: false,
                data: None,
                error: Some(failure.message.clone()),
                message: Some(format!(
                    "Flight search failed after {} attempt{}",
                    failure.attempts_exhausted,
                    if failure.attempts_exhausted == 1 { "" } else { "s" }
                )),
                search_params: Some(failure.request.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap()
    }

    #[test]
    fn test_offer_set_picks_minimum() {
        let set = OfferSet::from_offers(vec![
            Offer::new("Emirates", "$995", "19h"),
            Offer::new("Turkish Airlines", "$538", "15h"),
            Offer::new("Qatar Airways", "$612", "17h"),
        ])
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.cheapest().airline, "Turkish Airlines");
        assert_eq!(set.cheapest_index(), 1);
    }

    #[test]
    fn test_offer_set_rejects_empty_and_incomparable() {
        assert!(matches!(
            OfferSet::from_offers(vec![]),
            Err(SearchError::EmptyResult { .. })
        ));
        assert!(matches!(
            OfferSet::from_offers(vec![Offer::new("Emirates", "sold out", "19h")]),
            Err(SearchError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_designated_offer_is_member() {
        let listed = Offer::new("Turkish Airlines", "$538", "15h");
        let set = OfferSet::with_designated(
            vec![Offer::new("Emirates", "$995", "19h"), listed.clone()],
            listed.clone(),
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.cheapest(), &listed);

        let outsider = Offer::new("Ethiopian", "$501", "22h");
        let set = OfferSet::with_designated(vec![listed], outsider.clone());
        assert_eq!(set.len(), 2);
        assert_eq!(set.cheapest(), &outsider);
        assert_eq!(set.cheapest_index(), 1);
    }

    #[test]
    fn test_success_response_shape() {
        let result = SearchResult::Success(SearchSuccess {
            request: request(),
            offers: OfferSet::from_offers(vec![Offer::new("Turkish Airlines", "$538", "15h")])
                .unwrap(),
            session_ref: "sess_123".to_string(),
            inspector_url: Some("https://www.browserbase.com/sessions/sess_123".to_string()),
        });

        let json = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["searchParams"]["departDate"], "June 15, 2026");
        assert_eq!(json["data"]["allFlights"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["cheapestFlight"]["price"], "$538");
        assert_eq!(
            json["data"]["sessionInspectorUrl"],
            "https://www.browserbase.com/sessions/sess_123"
        );
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_response_shape() {
        let result = SearchResult::Failure(SearchFailure {
            request: request(),
            message: "Step 'submit' failed: detached".to_string(),
            attempts_exhausted: 3,
        });

        let response = result.to_response();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Step 'submit' failed: detached"));
        assert_eq!(
            response.message.as_deref(),
            Some("Flight search failed after 3 attempts")
        );
        assert_eq!(response.params().unwrap().origin, "Johannesburg");

        let err = result.into_result().unwrap_err();
        assert!(matches!(err, SearchError::ExhaustedRetries { attempts: 3, .. }));
    }
}
