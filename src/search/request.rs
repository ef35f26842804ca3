//! Search request payload

use serde::{Deserialize, Serialize};

use super::errors::{SearchError, SearchResultOf};

/// A round-trip fare search.
///
/// Dates are natural-language strings handed to the agent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    pub return_date: String,
}

impl SearchRequest {
    /// Build a request, checking that every field is present.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        depart_date: impl Into<String>,
        return_date: impl Into<String>,
    ) -> SearchResultOf<Self> {
        let request = Self {
            origin: origin.into(),
            destination: destination.into(),
            depart_date: depart_date.into(),
            return_date: return_date.into(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Parse a JSON payload and validate it.
    pub fn from_json(payload: &str) -> SearchResultOf<Self> {
        let request: Self = serde_json::from_str(payload)
            .map_err(|e| SearchError::invalid_request(format!("malformed payload: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    /// Reject requests with blank fields.
    pub fn validate(&self) -> SearchResultOf<()> {
        let fields = [
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("departDate", &self.depart_date),
            ("returnDate", &self.return_date),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SearchError::invalid_request(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// "Origin → Destination"
    pub fn route(&self) -> String {
        format!("{} → {}", self.origin, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request() {
        let request =
            SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap();
        assert_eq!(request.route(), "Johannesburg → Athens");
        assert_eq!(request.depart_date, "June 15, 2026");
    }

    #[test]
    fn test_blank_fields_rejected() {
        let err = SearchRequest::new("Johannesburg", "  ", "June 15, 2026", "").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("destination"));
        assert!(message.contains("returnDate"));
        assert!(!message.contains("origin"));
    }

    #[test]
    fn test_from_json_uses_camel_case() {
        let request = SearchRequest::from_json(
            r#"{"origin":"JNB","destination":"ATH","departDate":"June 15","returnDate":"June 29"}"#,
        )
        .unwrap();
        assert_eq!(request.return_date, "June 29");

        let err = SearchRequest::from_json(r#"{"origin":"JNB"}"#).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest { .. }));
    }
}
