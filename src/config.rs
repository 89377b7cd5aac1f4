use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

/// Application configuration, loaded from `config.toml` (if present) with
/// environment variable overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the Judge.me API.
    pub base_url: String,
    /// Default shop domain applied when the request omits `shop_domain`.
    pub shop_domain: Option<String>,
    /// Default API token applied when the request omits `api_token`.
    pub api_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://judge.me".to_string(),
            shop_domain: None,
            api_token: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            let contents = std::fs::read_to_string(CONFIG_FILE)
                .with_context(|| format!("Failed to read {}", CONFIG_FILE))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", CONFIG_FILE))?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.server.port = port;
        }
        if let Ok(base_url) = std::env::var("JUDGEME_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Ok(shop_domain) = std::env::var("SHOP_DOMAIN") {
            self.upstream.shop_domain = Some(shop_domain);
        }
        if let Ok(api_token) = std::env::var("API_TOKEN") {
            self.upstream.api_token = Some(api_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.base_url, "https://judge.me");
        assert!(config.upstream.shop_domain.is_none());
        assert!(config.upstream.api_token.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [upstream]
            shop_domain = "example.myshopify.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.upstream.shop_domain.as_deref(),
            Some("example.myshopify.com")
        );
        assert_eq!(config.upstream.base_url, "https://judge.me");
    }
}
