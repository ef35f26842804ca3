//! README snapshot of a search response.
//!
//! The renderer is pure: it takes the wire-form [`SearchResponse`] and a
//! timestamp, so a snapshot can be regenerated from saved JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::search::{Offer, SearchResponse};

/// Heading used when no title is configured
pub const DEFAULT_TITLE: &str = "Flight Price Tracker";

/// Render a response with the default title.
pub fn render_markdown(response: &SearchResponse, generated_at: DateTime<Utc>) -> String {
    render_markdown_titled(response, DEFAULT_TITLE, generated_at)
}

/// Render a response as a Markdown document.
///
/// Successful responses list every offer and highlight the cheapest one;
/// failed responses embed the error text verbatim.
pub fn render_markdown_titled(
    response: &SearchResponse,
    title: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!("# {}\n\n", title);

    if let Some(params) = response.params() {
        out.push_str(&format!("**Route:** {}\n\n", params.route()));
        out.push_str(&format!(
            "**Dates:** {} to {}\n\n",
            params.depart_date, params.return_date
        ));
    }

    match (&response.data, response.success) {
        (Some(data), true) => {
            out.push_str("**Status:** ok\n\n");
            out.push_str(&format!(
                "## Cheapest flight\n\n> **{}**: **{}** ({})\n\n",
                cell(&data.cheapest_flight.airline),
                cell(&data.cheapest_flight.price),
                cell(&data.cheapest_flight.duration)
            ));

            out.push_str(&format!("## All flights ({})\n\n", data.all_flights.len()));
            out.push_str(&offers_table(&data.all_flights, &data.cheapest_flight));

            if let Some(url) = &data.session_inspector_url {
                out.push_str(&format!("\n[Session replay]({})\n", url));
            }
        }
        _ => {
            out.push_str("**Status:** failed\n\n");
            if let Some(message) = &response.message {
                out.push_str(&format!("{}\n\n", message));
            }
            out.push_str(&format!(
                "```text\n{}\n```\n",
                response.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    out.push_str(&format!(
        "\n_Last updated: {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

fn offers_table(offers: &[Offer], cheapest: &Offer) -> String {
    let mut table = String::from("| # | Airline | Price | Duration | Stops |\n|---|---|---|---|---|\n");
    let mut highlighted = false;

    for (index, offer) in offers.iter().enumerate() {
        let stops = offer
            .stops
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        // Only the first matching row is highlighted
        let is_cheapest = !highlighted && offer == cheapest;
        highlighted |= is_cheapest;

        if is_cheapest {
            table.push_str(&format!(
                "| {} | **{}** | **{}** | **{}** | {} |\n",
                index + 1,
                cell(&offer.airline),
                cell(&offer.price),
                cell(&offer.duration),
                stops
            ));
        } else {
            table.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                index + 1,
                cell(&offer.airline),
                cell(&offer.price),
                cell(&offer.duration),
                stops
            ));
        }
    }

    table
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Write a rendered report, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cell_escaping() {
        assert_eq!(cell("Air France | KLM"), "Air France \\| KLM");
        assert_eq!(cell("two\nlines"), "two lines");
    }

    #[test]
    fn test_duplicate_cheapest_highlighted_once() {
        let cheap = Offer::new("Turkish Airlines", "$538", "15h");
        let table = offers_table(&[cheap.clone(), cheap.clone()], &cheap);
        assert_eq!(table.matches("**Turkish Airlines**").count(), 1);
    }

    #[test]
    fn test_timestamp_format() {
        let response = SearchResponse {
            success: false,
            data: None,
            error: None,
            message: None,
            search_params: None,
        };
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 8, 30, 0).unwrap();
        let md = render_markdown(&response, at);
        assert!(md.starts_with("# Flight Price Tracker\n"));
        assert!(md.contains("**Status:** failed"));
        assert!(md.contains("unknown error"));
        assert!(md.contains("_Last updated: 2026-06-01 08:30:00 UTC_"));
    }
}
