// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; there is no runtime reload.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Gemini API key for question generation (optional; the
    /// generation endpoint fails with 502 when unset)
    pub gemini_api_key: Option<String>,
    /// Gemini model used for question generation
    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        env::remove_var("GCP_PROJECT_ID");
        env::remove_var("PORT");
        env::remove_var("GEMINI_API_KEY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "local-dev");
        assert_eq!(config.port, 8080);
        assert!(config.gemini_api_key.is_none());
    }
}
