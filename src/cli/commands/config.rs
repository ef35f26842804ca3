//! Config-check command - show resolved configuration and secrets status

use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use std::path::Path;

use crate::cli::error::CliResult;
use crate::config::{
    ConfigurationLoader, EnvironmentLoader, AGENT_API_KEY_VAR, AGENT_ENDPOINT_VAR, API_KEY_VAR,
    PROJECT_ID_VAR,
};

const SHOWN_KEYS: [&str; 14] = [
    "platform.api_base",
    "platform.pool_id",
    "platform.profile_id",
    "platform.stealth",
    "platform.region",
    "platform.request_timeout_seconds",
    "agent.endpoint",
    "agent.model",
    "search.site",
    "search.extraction_mode",
    "search.max_attempts",
    "search.results_timeout_seconds",
    "search.require_cheapest_marker",
    "report.output_path",
];

/// Resolved value of a configuration key for display
pub fn display_value(loader: &ConfigurationLoader, key: &str) -> String {
    loader
        .get_string(key)
        .or_else(|| loader.get_u64(key).map(|v| v.to_string()))
        .or_else(|| loader.get_bool(key).map(|v| v.to_string()))
        .unwrap_or_else(|| "(unset)".to_string())
}

/// Run the config-check command. Returns the process exit code.
pub fn execute_config_check(config_path: Option<&Path>, env_file: Option<&Path>) -> CliResult<i32> {
    let env = EnvironmentLoader::new(env_file);
    let loader = ConfigurationLoader::new(config_path)?;
    let mut healthy = true;

    println!("{}", "🔧 Configuration".bold());
    match &loader.config_path {
        Some(path) => println!("Configuration file: {}", path.display()),
        None => println!("Configuration file: {}", "(none found, using defaults)".yellow()),
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Key", "Value"]);
    for key in SHOWN_KEYS {
        table.add_row(vec![key.to_string(), display_value(&loader, key)]);
    }
    println!("{}", table);

    if let Err(e) = loader.site() {
        println!("  {} {:#}", "✗".red(), e);
        healthy = false;
    }
    if let Err(e) = loader.extraction_mode() {
        println!("  {} {:#}", "✗".red(), e);
        healthy = false;
    }

    println!("\n{}", "🔑 Environment".bold());
    let checks = [
        (API_KEY_VAR, env.api_key().is_some(), true),
        (PROJECT_ID_VAR, env.project_id().is_some(), true),
        (AGENT_API_KEY_VAR, env.agent_api_key().is_some(), false),
        (AGENT_ENDPOINT_VAR, env.agent_endpoint().is_some(), false),
    ];
    for (var, present, required) in checks {
        if present {
            println!("  {} {}", "✓".green(), var);
        } else if required {
            println!("  {} {} (required)", "✗".red(), var);
            healthy = false;
        } else {
            println!("  {} {} (optional)", "-".dimmed(), var);
        }
    }

    if healthy {
        println!("\n{}", "Configuration is valid".green());
        Ok(0)
    } else {
        println!("\n{}", "Configuration has problems".red());
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn test_display_value() {
        let loader = ConfigurationLoader::from_config(Configuration::default());
        assert_eq!(display_value(&loader, "search.site"), "google_flights");
        assert_eq!(display_value(&loader, "search.max_attempts"), "3");
        assert_eq!(display_value(&loader, "platform.stealth"), "false");
        assert_eq!(display_value(&loader, "platform.pool_id"), "(unset)");
    }
}
