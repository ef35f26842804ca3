//! Result normalizer - raw extraction to a canonical offer set

use regex::Regex;
use std::sync::OnceLock;

use super::plan::PlanStep;
use super::sequencer::RawExtraction;
use crate::search::{Offer, OfferSet, SearchError, SearchResultOf};

/// Phrases the agent uses when it gave up on the page
pub const DEFAULT_FAILURE_MARKERS: [&str; 3] =
    ["unable to recover", "browser issues", "could not complete"];

const SEPARATOR: &str = r"\s+[-–—]\s+";
const PRICE: &str = r"(?P<price>[^-–—]*?\d[^-–—]*?)";

fn cheapest_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*CHEAPEST\s+FLIGHT\s*:\s*(?P<airline>.+?){sep}{price}{sep}(?P<duration>.+?)\s*$",
            sep = SEPARATOR,
            price = PRICE
        ))
        .expect("cheapest pattern is valid")
    })
}

fn numbered_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"^\s*\d+\.\s+(?P<airline>.+?){sep}{price}{sep}(?P<duration>.+?)\s*$",
            sep = SEPARATOR,
            price = PRICE
        ))
        .expect("numbered pattern is valid")
    })
}

/// Offers found in a free-text answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeTextParse {
    /// Offer from the `CHEAPEST FLIGHT:` line, if there was one
    pub cheapest: Option<Offer>,
    /// Numbered offers in document order
    pub offers: Vec<Offer>,
}

/// Trim a captured field and any `_`/`__` emphasis around it.
fn field(captures: &regex::Captures<'_>, name: &str) -> String {
    captures[name].trim().trim_matches('_').trim().to_string()
}

fn offer_from(captures: &regex::Captures<'_>) -> Offer {
    Offer::new(
        field(captures, "airline"),
        field(captures, "price"),
        field(captures, "duration"),
    )
}

/// Parse the agent's free-text answer.
///
/// Markdown emphasis (`*`, `_`) is stripped first; lines matching neither template are
/// ignored.
pub fn parse_free_text(text: &str) -> FreeTextParse {
    let mut parsed = FreeTextParse::default();

    for raw_line in text.lines() {
        let line: String = raw_line.chars().filter(|c| !matches!(c, '*' | '`')).collect();

        if let Some(captures) = cheapest_pattern().captures(&line) {
            if parsed.cheapest.is_none() {
                parsed.cheapest = Some(offer_from(&captures));
            }
        } else if let Some(captures) = numbered_pattern().captures(&line) {
            parsed.offers.push(offer_from(&captures));
        }
    }

    parsed
}

/// Turns raw extractions into offer sets.
#[derive(Debug, Clone)]
pub struct Normalizer {
    failure_markers: Vec<String>,
    require_cheapest_marker: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            failure_markers: DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect(),
            require_cheapest_marker: true,
        }
    }
}

impl Normalizer {
    pub fn new(failure_markers: Vec<String>, require_cheapest_marker: bool) -> Self {
        Self {
            failure_markers,
            require_cheapest_marker,
        }
    }

    pub fn failure_markers(&self) -> &[String] {
        &self.failure_markers
    }

    pub fn requires_cheapest_marker(&self) -> bool {
        self.require_cheapest_marker
    }

    /// Normalize the last step's output.
    pub fn normalize(&self, raw: RawExtraction) -> SearchResultOf<OfferSet> {
        match raw {
            RawExtraction::Structured(offers) => OfferSet::from_offers(offers),
            RawExtraction::FreeText(text) => self.normalize_free_text(&text),
        }
    }

    fn normalize_free_text(&self, text: &str) -> SearchResultOf<OfferSet> {
        let lowered = text.to_lowercase();
        if let Some(marker) = self
            .failure_markers
            .iter()
            .filter(|marker| !marker.trim().is_empty())
            .find(|marker| lowered.contains(&marker.to_lowercase()))
        {
            return Err(SearchError::step(
                PlanStep::Extract.name(),
                format!("agent reported failure ('{}')", marker),
            ));
        }

        let parsed = parse_free_text(text);
        if parsed.offers.is_empty() && parsed.cheapest.is_none() {
            return Err(SearchError::empty("agent answer contained no flight lines"));
        }

        match parsed.cheapest {
            Some(cheapest) => Ok(OfferSet::with_designated(parsed.offers, cheapest)),
            None if self.require_cheapest_marker => Err(SearchError::step(
                PlanStep::Extract.name(),
                "agent answer is missing the CHEAPEST FLIGHT line",
            )),
            None => OfferSet::from_offers(parsed.offers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "Here are the flights I found:\n\
        1. Turkish Airlines - $538 - 15h 10m\n\
        2. **Qatar Airways** - $612 - 17h 45m\n\
        3. Air France - KLM - $701 - 14h 5m\n\
        Prices may change.\n\
        CHEAPEST FLIGHT: Turkish Airlines - $538 - 15h 10m";

    #[test]
    fn test_parse_free_text() {
        let parsed = parse_free_text(ANSWER);
        assert_eq!(parsed.offers.len(), 3);
        assert_eq!(parsed.offers[1].airline, "Qatar Airways");
        assert_eq!(parsed.offers[2].airline, "Air France - KLM");
        assert_eq!(parsed.offers[2].price, "$701");
        assert_eq!(
            parsed.cheapest,
            Some(Offer::new("Turkish Airlines", "$538", "15h 10m"))
        );
    }

    #[test]
    fn test_cheapest_line_wins_verbatim() {
        let text = "1. Emirates - $480 - 19h\nCHEAPEST FLIGHT: Ethiopian - $599 - 21h";
        let set = Normalizer::default()
            .normalize(RawExtraction::FreeText(text.to_string()))
            .unwrap();
        assert_eq!(set.cheapest(), &Offer::new("Ethiopian", "$599", "21h"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_cheapest_line_reuses_listed_offer() {
        let set = Normalizer::default()
            .normalize(RawExtraction::FreeText(ANSWER.to_string()))
            .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.cheapest_index(), 0);
    }

    #[test]
    fn test_no_lines_is_empty_result() {
        for normalizer in [Normalizer::default(), Normalizer::new(vec![], false)] {
            let err = normalizer
                .normalize(RawExtraction::FreeText("I looked at the page.".to_string()))
                .unwrap_err();
            assert!(matches!(err, SearchError::EmptyResult { .. }));
        }
    }

    #[test]
    fn test_failure_marker_overrides_parsed_lines() {
        let text = format!("{}\nSorry, I was unable to recover from Browser Issues.", ANSWER);
        let err = Normalizer::default()
            .normalize(RawExtraction::FreeText(text))
            .unwrap_err();
        assert!(matches!(err, SearchError::StepExecution { ref step, .. } if step == "extract"));
    }

    #[test]
    fn test_missing_marker_strict_and_lenient() {
        let text = "1. Emirates - $995 - 19h\n2. Turkish Airlines - $538 - 15h";

        let err = Normalizer::default()
            .normalize(RawExtraction::FreeText(text.to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CHEAPEST FLIGHT"));

        let set = Normalizer::new(vec![], false)
            .normalize(RawExtraction::FreeText(text.to_string()))
            .unwrap();
        assert_eq!(set.cheapest().airline, "Turkish Airlines");
    }

    #[test]
    fn test_dash_variants_and_noise() {
        let text = "1. Emirates – $995 – 19h\n\
            2) Not a listed format - $1 - 1h\n\
            - Lufthansa - $480 - 12h\n\
            3. Lufthansa — €480 — 12h 30m\n\
            CHEAPEST FLIGHT: Lufthansa — €480 — 12h 30m";
        let parsed = parse_free_text(text);
        assert_eq!(parsed.offers.len(), 2);
        assert_eq!(parsed.offers[0].price, "$995");
        assert_eq!(parsed.offers[1].duration, "12h 30m");
        assert_eq!(parsed.cheapest.unwrap().price, "€480");
    }

    #[test]
    fn test_underscore_emphasis() {
        let text = "1. _Emirates_ - $995 - 19h\n\
            2. __Turkish Airlines__ - _$538_ - 15h 10m\n\
            3. Air_Link - $701 - 14h\n\
            CHEAPEST FLIGHT: __Turkish Airlines__ - $538 - _15h 10m_";
        let parsed = parse_free_text(text);
        assert_eq!(parsed.offers[0].airline, "Emirates");
        assert_eq!(parsed.offers[1], Offer::new("Turkish Airlines", "$538", "15h 10m"));
        assert_eq!(parsed.offers[2].airline, "Air_Link");

        let set = Normalizer::default()
            .normalize(RawExtraction::FreeText(text.to_string()))
            .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.cheapest_index(), 1);
    }

    #[test]
    fn test_structured_passthrough() {
        let offers = vec![
            Offer::new("Emirates", "$995", "19h"),
            Offer::new("Turkish Airlines", "$538", "15h"),
            Offer::new("Ethiopian", "$538", "21h"),
        ];
        let set = Normalizer::default()
            .normalize(RawExtraction::Structured(offers.clone()))
            .unwrap();
        assert_eq!(set.offers(), offers.as_slice());
        assert_eq!(set.cheapest_index(), 1);

        let err = Normalizer::default()
            .normalize(RawExtraction::Structured(vec![]))
            .unwrap_err();
        assert!(matches!(err, SearchError::EmptyResult { .. }));
    }
}
