//! Flight offers and price comparison

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One flight option as the agent reported it.
///
/// `price` stays display text (currency symbol included); use
/// [`Offer::derived_price`] when a comparable number is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub airline: String,
    pub price: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

impl Offer {
    /// Offer with only the mandatory fields set
    pub fn new(
        airline: impl Into<String>,
        price: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            airline: airline.into(),
            price: price.into(),
            duration: duration.into(),
            stops: None,
            departure_time: None,
            arrival_time: None,
        }
    }

    /// Set the number of stops
    pub fn with_stops(mut self, stops: u32) -> Self {
        self.stops = Some(stops);
        self
    }

    /// Set departure and arrival times
    pub fn with_times(mut self, departure: impl Into<String>, arrival: impl Into<String>) -> Self {
        self.departure_time = Some(departure.into());
        self.arrival_time = Some(arrival.into());
        self
    }

    /// Numeric magnitude of the display price
    pub fn derived_price(&self) -> Option<f64> {
        derived_price(&self.price)
    }
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d[\d.,]*(?:[ \u{a0}]\d[\d.,]*)*").expect("price pattern is valid")
    })
}

/// Extract the numeric magnitude from a display price.
///
/// The first run of digits wins. Commas and spaces are read as thousands
/// separators and a dot as the decimal mark, unless the run only makes sense
/// the other way round (`"1.234,50"`, `"€1.234"`). A lone separator followed
/// by exactly three digits is a thousands separator. Returns `None` when there are no digits.
pub fn derived_price(text: &str) -> Option<f64> {
    let run = price_pattern().find(text)?.as_str();
    let run: String = run
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_end_matches(['.', ','])
        .to_string();

    let normalized = match (run.rfind(','), run.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => run.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => run.replace(',', ""),
        (Some(comma), None) => {
            let decimals = run.len() - comma - 1;
            if decimals == 3 || run.matches(',').count() > 1 {
                run.replace(',', "")
            } else {
                run.replace(',', ".")
            }
        }
        (None, Some(dot)) if run.matches('.').count() > 1 || run.len() - dot - 1 == 3 => {
            run.replace('.', "")
        }
        _ => run,
    };

    normalized.parse::<f64>().ok()
}

/// Index of the offer with the lowest derived price.
///
/// Offers whose price has no numeric part are skipped; ties keep the
/// earliest offer.
pub fn cheapest_index(offers: &[Offer]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, offer) in offers.iter().enumerate() {
        let Some(price) = offer.derived_price() else {
            continue;
        };
        match best {
            Some((_, lowest)) if price >= lowest => {}
            _ => best = Some((index, price)),
        }
    }
    best.map(|(index, _)| index)
}
