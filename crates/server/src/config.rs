//! Server configuration from the environment.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_RESEND_URL: &str = "https://api.resend.com";
pub const DEFAULT_FROM: &str = "Studio Website <onboarding@resend.dev>";
pub const DEFAULT_TO: &str = "hello@example.com";
pub const DEFAULT_SITE_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Without a key, emails are logged instead of sent
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub email_from: String,
    pub email_to: String,
    pub team_data_url: Option<String>,
    pub site_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT {raw:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            port,
            resend_api_key: get("RESEND_API_KEY"),
            resend_api_url: get("RESEND_API_URL")
                .unwrap_or_else(|| DEFAULT_RESEND_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            email_from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_FROM.to_string()),
            email_to: get("EMAIL_TO").unwrap_or_else(|| DEFAULT_TO.to_string()),
            team_data_url: get("TEAM_DATA_URL"),
            site_dir: PathBuf::from(get("SITE_DIR").unwrap_or_else(|| DEFAULT_SITE_DIR.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert!(config.resend_api_key.is_none());
        assert!(config.team_data_url.is_none());
        assert_eq!(config.site_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("RESEND_API_KEY", "re_123"),
            ("RESEND_API_URL", "http://localhost:9000/"),
            ("EMAIL_TO", "studio@example.com"),
            ("TEAM_DATA_URL", "https://cdn.example.com/team.json"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.resend_api_key.as_deref(), Some("re_123"));
        assert_eq!(config.resend_api_url, "http://localhost:9000");
        assert_eq!(config.email_to, "studio@example.com");
        assert!(config.team_data_url.is_some());
    }

    #[test]
    fn test_blank_and_invalid_values() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "abc"), ("RESEND_API_KEY", "  ")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.resend_api_key.is_none());
    }
}
