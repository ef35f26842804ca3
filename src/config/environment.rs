//! Environment variable loading and management.
//!
//! Secrets live in the environment (or an explicit `.env` file), never in the
//! TOML configuration.

use std::env;
use std::path::Path;

pub const API_KEY_VAR: &str = "BROWSERBASE_API_KEY";
pub const PROJECT_ID_VAR: &str = "BROWSERBASE_PROJECT_ID";
pub const AGENT_API_KEY_VAR: &str = "AGENT_API_KEY";
pub const AGENT_ENDPOINT_VAR: &str = "FARESCOUT_AGENT_ENDPOINT";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Only an explicit path is loaded.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
                }
            } else {
                tracing::warn!(".env file not found: {}", path.display());
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file that was requested, if any
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Cloud browser platform API key
    pub fn api_key(&self) -> Option<String> {
        non_empty(API_KEY_VAR)
    }

    /// Cloud browser platform project
    pub fn project_id(&self) -> Option<String> {
        non_empty(PROJECT_ID_VAR)
    }

    /// Key for the agent runtime's model provider
    pub fn agent_api_key(&self) -> Option<String> {
        non_empty(AGENT_API_KEY_VAR)
    }

    /// Overrides `[agent].endpoint` when set
    pub fn agent_endpoint(&self) -> Option<String> {
        non_empty(AGENT_ENDPOINT_VAR)
    }

    /// Required variables that are not set
    pub fn missing_required(&self) -> Vec<&'static str> {
        [API_KEY_VAR, PROJECT_ID_VAR]
            .into_iter()
            .filter(|var| non_empty(var).is_none())
            .collect()
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // One test touches the process environment so runs don't race.
    #[test]
    fn test_env_file_and_overrides() {
        env::remove_var(AGENT_ENDPOINT_VAR);
        let env_loader = EnvironmentLoader::default();
        assert!(env_loader.env_file().is_none());
        assert_eq!(env_loader.agent_endpoint(), None);

        env::set_var(AGENT_ENDPOINT_VAR, "  ");
        assert_eq!(env_loader.agent_endpoint(), None);

        let temp_dir = tempdir().unwrap();
        let env_path = temp_dir.path().join(".env");
        std::fs::write(
            &env_path,
            "FARESCOUT_TEST_PROJECT=proj_123\nFARESCOUT_AGENT_ENDPOINT=http://agent:3000\n",
        )
        .unwrap();
        env::remove_var(AGENT_ENDPOINT_VAR);

        let env_loader = EnvironmentLoader::new(Some(&env_path));
        assert_eq!(env_loader.env_file(), Some(env_path.to_string_lossy().as_ref()));
        assert_eq!(env::var("FARESCOUT_TEST_PROJECT").unwrap(), "proj_123");
        assert_eq!(
            env_loader.agent_endpoint(),
            Some("http://agent:3000".to_string())
        );

        env::remove_var(AGENT_ENDPOINT_VAR);
        env::remove_var("FARESCOUT_TEST_PROJECT");
    }

    #[test]
    fn test_missing_env_file_is_tolerated() {
        let env_loader = EnvironmentLoader::new(Some(Path::new("/nonexistent/.env")));
        assert_eq!(env_loader.env_file(), Some("/nonexistent/.env"));
    }
}
