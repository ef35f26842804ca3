//! Integration test for README snapshot rendering

use chrono::{TimeZone, Utc};
use farescout::report::{render_markdown, render_markdown_titled, write_report};
use farescout::search::{
    Offer, OfferSet, SearchFailure, SearchRequest, SearchResponse, SearchResult, SearchSuccess,
};

fn request() -> SearchRequest {
    SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap()
}

fn success_response() -> SearchResponse {
    let offers = OfferSet::from_offers(vec![
        Offer::new("Emirates", "$995", "19h 5m").with_stops(1),
        Offer::new("Turkish Airlines", "$538", "15h 10m").with_stops(1),
        Offer::new("Air France | KLM", "$877", "19h 40m"),
    ])
    .unwrap();

    SearchResult::Success(SearchSuccess {
        request: request(),
        offers,
        session_ref: "sess_1".to_string(),
        inspector_url: Some("https://www.browserbase.com/sessions/sess_1".to_string()),
    })
    .to_response()
}

#[test]
fn test_success_report() {
    let at = Utc.with_ymd_and_hms(2026, 5, 20, 6, 0, 0).unwrap();
    let markdown = render_markdown(&success_response(), at);

    assert!(markdown.starts_with("# Flight Price Tracker\n"));
    assert!(markdown.contains("**Route:** Johannesburg → Athens"));
    assert!(markdown.contains("**Dates:** June 15, 2026 to June 29, 2026"));
    assert!(markdown.contains("**Status:** ok"));
    assert!(markdown.contains("> **Turkish Airlines**: **$538** (15h 10m)"));
    assert!(markdown.contains("## All flights (3)"));
    assert!(markdown.contains("| 1 | Emirates | $995 | 19h 5m | 1 |"));
    assert!(markdown.contains("| 2 | **Turkish Airlines** | **$538** | **15h 10m** | 1 |"));
    assert!(markdown.contains("| 3 | Air France \\| KLM | $877 | 19h 40m | - |"));
    assert!(markdown.contains("[Session replay](https://www.browserbase.com/sessions/sess_1)"));
    assert!(markdown.contains("_Last updated: 2026-05-20 06:00:00 UTC_"));
}

#[test]
fn test_failure_report_embeds_error_verbatim() {
    let response = SearchResult::Failure(SearchFailure {
        request: request(),
        message: "Step 'wait_for_results' timed out after 45s".to_string(),
        attempts_exhausted: 3,
    })
    .to_response();

    let at = Utc.with_ymd_and_hms(2026, 5, 20, 6, 0, 0).unwrap();
    let markdown = render_markdown_titled(&response, "JNB → ATH fares", at);

    assert!(markdown.starts_with("# JNB → ATH fares\n"));
    assert!(markdown.contains("**Route:** Johannesburg → Athens"));
    assert!(markdown.contains("**Status:** failed"));
    assert!(markdown.contains("Flight search failed after 3 attempts"));
    assert!(markdown.contains("```text\nStep 'wait_for_results' timed out after 45s\n```"));
    assert!(!markdown.contains("## All flights"));
}

#[test]
fn test_report_from_saved_json() {
    let json = serde_json::to_string(&success_response()).unwrap();
    let restored: SearchResponse = serde_json::from_str(&json).unwrap();

    let at = Utc.with_ymd_and_hms(2026, 5, 20, 6, 0, 0).unwrap();
    assert_eq!(
        render_markdown(&restored, at),
        render_markdown(&success_response(), at)
    );
}

#[test]
fn test_write_report_creates_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("docs").join("README.md");

    write_report(&path, "# Flight Price Tracker\n").unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# Flight Price Tracker\n"
    );
}
