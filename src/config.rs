use anyhow::{Context, Result};

use crate::validation::DEFAULT_SECTIONS;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Server
    pub port: u16,

    // Content
    pub content_sections: Vec<String>,
    pub content_write_retries: u32,

    // Admin
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Content
            content_sections: std::env::var("CONTENT_SECTIONS")
                .ok()
                .map(|v| parse_sections(&v))
                .filter(|sections| !sections.is_empty())
                .unwrap_or_else(|| DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()),
            content_write_retries: std::env::var("CONTENT_WRITE_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            // Admin - an empty key means writes are open
            admin_api_key: std::env::var("ADMIN_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        })
    }
}

fn parse_sections(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "PORT",
        "CONTENT_SECTIONS",
        "CONTENT_WRITE_RETRIES",
        "ADMIN_API_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/content");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "postgres://localhost/content");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.port, 8080);
        assert_eq!(config.content_write_retries, 3);
        assert_eq!(config.content_sections.len(), DEFAULT_SECTIONS.len());
        assert!(config.admin_api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://db/content");
        std::env::set_var("PORT", "3000");
        std::env::set_var("CONTENT_SECTIONS", "home,contact");
        std::env::set_var("CONTENT_WRITE_RETRIES", "5");
        std::env::set_var("ADMIN_API_KEY", "s3cret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.content_sections, vec!["home".to_string(), "contact".to_string()]);
        assert_eq!(config.content_write_retries, 5);
        assert_eq!(config.admin_api_key.as_deref(), Some("s3cret"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_database_url() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    #[serial]
    fn test_blank_api_key_is_unset() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://db/content");
        std::env::set_var("ADMIN_API_KEY", "   ");

        assert!(Config::from_env().unwrap().admin_api_key.is_none());

        clear_env();
    }

    #[test]
    fn test_parse_sections_trims_and_skips_blanks() {
        assert_eq!(
            parse_sections(" home, contact ,,privacy "),
            vec!["home".to_string(), "contact".to_string(), "privacy".to_string()]
        );
        assert!(parse_sections(" , ").is_empty());
    }
}
