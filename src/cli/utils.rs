//! Shared utility functions for CLI commands

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::search::{Offer, SearchResponse};

/// Display a user-friendly error message with suggestions
pub fn display_error_with_suggestions<E: std::fmt::Display>(error: &E, context: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), context);
    eprintln!("   {}", error.to_string().red());

    let error_str = error.to_string().to_lowercase();
    if error_str.contains("browserbase_api_key") || error_str.contains("browserbase_project_id") {
        eprintln!("{}", "💡 Suggestions:".blue());
        eprintln!("   • Export the variables or pass --env-file with a .env file");
        eprintln!("   • Run 'farescout config-check' to see what is missing");
    } else if error_str.contains("no such file or directory") {
        eprintln!("{}", "💡 Suggestions:".blue());
        eprintln!("   • Check that the file path is correct");
        eprintln!("   • Paths in farescout.toml may use ~ for the home directory");
    } else if error_str.contains("invalid input") || error_str.contains("missing required field") {
        eprintln!("{}", "💡 Suggestions:".blue());
        eprintln!("   • Pass --origin, --destination, --depart and --return");
        eprintln!("   • Or pass --request with a JSON file (origin, destination, departDate, returnDate)");
    } else if error_str.contains("connection") || error_str.contains("timed out") {
        eprintln!("{}", "💡 Suggestions:".blue());
        eprintln!("   • Check that the agent runtime endpoint is reachable");
        eprintln!("   • Try again in a few moments");
    }
}

/// Truncate text with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Offers as a terminal table; the cheapest row is marked with ★.
pub fn offers_table(offers: &[Offer], cheapest: &Offer) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "#", "Airline", "Price", "Duration", "Stops"]);

    let mut marked = false;
    for (index, offer) in offers.iter().enumerate() {
        let is_cheapest = !marked && offer == cheapest;
        marked |= is_cheapest;
        table.add_row(vec![
            Cell::new(if is_cheapest { "★" } else { "" }),
            Cell::new(index + 1),
            Cell::new(truncate_with_ellipsis(&offer.airline, 40)),
            Cell::new(&offer.price),
            Cell::new(&offer.duration),
            Cell::new(offer.stops.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
        ]);
    }

    table
}

/// Human-readable rendering of a response on stdout/stderr
pub fn print_response(response: &SearchResponse) {
    if let Some(params) = response.params() {
        println!(
            "{} {} ({} to {})",
            "✈".cyan(),
            params.route().bold(),
            params.depart_date,
            params.return_date
        );
    }

    match &response.data {
        Some(data) if response.success => {
            println!("{}", offers_table(&data.all_flights, &data.cheapest_flight));
            println!(
                "{} {} - {} - {}",
                "Cheapest:".green().bold(),
                data.cheapest_flight.airline,
                data.cheapest_flight.price.bold(),
                data.cheapest_flight.duration
            );
            if let Some(url) = &data.session_inspector_url {
                println!("{} {}", "Session replay:".dimmed(), url);
            }
        }
        _ => {
            eprintln!(
                "{} {}",
                "❌".red(),
                response.message.as_deref().unwrap_or("Flight search failed").red().bold()
            );
            if let Some(error) = &response.error {
                eprintln!("   {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Emirates", 20), "Emirates");
        assert_eq!(truncate_with_ellipsis("Air France - KLM Royal Dutch", 10), "Air Fra...");
        assert_eq!(truncate_with_ellipsis("Ñandú Aéreo", 8), "Ñandú...");
    }

    #[test]
    fn test_offers_table_marks_cheapest_once() {
        let cheap = Offer::new("Turkish Airlines", "$538", "15h");
        let offers = vec![
            Offer::new("Emirates", "$995", "19h").with_stops(1),
            cheap.clone(),
            cheap.clone(),
        ];
        let rendered = offers_table(&offers, &cheap).to_string();
        assert_eq!(rendered.matches('★').count(), 1);
        assert!(rendered.contains("Emirates"));
        assert!(rendered.contains("$995"));
    }
}
