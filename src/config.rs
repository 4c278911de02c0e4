use std::env;
use url::Url;

/// Connection settings for an n8n instance, read from the environment.
///
/// The library [`Client`](crate::api::Client) itself never touches the
/// environment; this is the collaborator that does.
#[derive(Debug, Clone)]
pub struct N8nConfig {
    pub api_key: String,
    pub host: Url,
}

impl N8nConfig {
    /// Read `N8N_HOST` and `N8N_API_KEY`. Users often paste the full API URL
    /// from the n8n settings screen, so a trailing `/api/v1` (or `/v1`) is
    /// stripped from the host.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("N8N_API_KEY")?;
        let mut host = env::var("N8N_HOST")?;
        host = host.trim_end_matches('/').to_string();
        if host.ends_with("/api/v1") {
            host = host.trim_end_matches("/api/v1").to_string();
        } else if host.ends_with("/v1") {
            host = host.trim_end_matches("/v1").to_string();
        }
        let host = Url::parse(&host)?;
        Ok(Self { api_key, host })
    }

    /// Build an API client from these settings.
    pub fn client(&self) -> crate::error::Result<crate::api::Client> {
        crate::api::Client::new(self.host.as_str(), self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use temp_env::with_vars;

    #[test]
    #[serial]
    fn reads_from_env() {
        with_vars(
            [
                ("N8N_API_KEY", Some("test-key")),
                ("N8N_HOST", Some("http://localhost")),
            ],
            || {
                let cfg = N8nConfig::from_env().unwrap();
                assert_eq!(cfg.api_key, "test-key");
                assert_eq!(cfg.host.as_str(), "http://localhost/");
                assert!(cfg.client().is_ok());
            },
        );
    }

    #[test]
    #[serial]
    fn strips_existing_api_paths() {
        with_vars(
            [
                ("N8N_API_KEY", Some("test-key")),
                ("N8N_HOST", Some("http://localhost/api/v1")),
            ],
            || {
                let cfg = N8nConfig::from_env().unwrap();
                assert_eq!(cfg.host.as_str(), "http://localhost/");
            },
        );
    }

    #[test]
    #[serial]
    fn missing_vars_error() {
        with_vars(
            [("N8N_API_KEY", None::<&str>), ("N8N_HOST", None)],
            || {
                assert!(N8nConfig::from_env().is_err());
            },
        );
    }
}
