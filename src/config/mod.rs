//! Configuration management.
//!
//! TOML files carry behaviour (site, attempts, timeouts, pool and profile);
//! secrets come from the environment via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use farescout::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let loader = ConfigurationLoader::new(Some(Path::new("farescout.toml"))).unwrap();
//!
//! println!("Max attempts: {}", loader.max_attempts());
//! println!("Missing secrets: {:?}", env.missing_required());
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    expand_path, AgentConfig, Configuration, ConfigurationLoader, LoggingConfig, PlatformConfig,
    ReportConfig, SearchConfig, DEFAULT_CONFIG_FILE,
};
pub use self::environment::{
    EnvironmentLoader, AGENT_API_KEY_VAR, AGENT_ENDPOINT_VAR, API_KEY_VAR, PROJECT_ID_VAR,
};
