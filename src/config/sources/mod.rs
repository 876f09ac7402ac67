//! Config file reading and format-specific deserialization.
//!
//! Provides [`FileSource`](file_source::FileSource) for reading a config
//! file from disk and the [`parse_config_str`] helper that picks the
//! deserializer from the file extension. YAML, JSON, and TOML support
//! are each gated by a cargo feature.

pub mod file_source;

use crate::config::model::Config;
use crate::error::GrafanaProxyError;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, GrafanaProxyError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => parse_yaml(content).map_err(|e| GrafanaProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| GrafanaProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| GrafanaProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(GrafanaProxyError::UnsupportedFormat(other.to_string())),
    }
}

/// An empty YAML document deserializes to `()`, not a mapping, so it is
/// treated as an empty config instead of a parse error.
#[cfg(feature = "yaml")]
fn parse_yaml(content: &str) -> Result<Config, serde_yml::Error> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_nested_keys() {
        let content = "grafana:\n  url: https://grafana.example.com\n  datasource: 3\n  key: secret\nserver:\n  address: 0.0.0.0:9090\nlog:\n  level: debug\n";
        let config = parse_config_str("yaml", content, "grafana-proxy.yaml").unwrap();
        assert_eq!(config.grafana.url, "https://grafana.example.com");
        assert_eq!(config.grafana.datasource, 3);
        assert_eq!(config.grafana.key, "secret");
        assert_eq!(config.server.address, "0.0.0.0:9090");
        assert_eq!(config.log.level, "debug");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn empty_yaml_is_default_config() {
        let config = parse_config_str("yml", "\n", "grafana-proxy.yml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_sections() {
        let content = "[grafana]\nurl = \"http://grafana:3000\"\ndatasource = 2\n\n[server]\naddress = \"127.0.0.1:8081\"\n";
        let config = parse_config_str("toml", content, "grafana-proxy.toml").unwrap();
        assert_eq!(config.grafana.url, "http://grafana:3000");
        assert_eq!(config.grafana.datasource, 2);
        assert_eq!(config.server.address, "127.0.0.1:8081");
        assert_eq!(config.log.level, "info");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_parse_error_names_the_file() {
        let err = parse_config_str("json", "{", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn unsupported_format_returns_error() {
        let result = parse_config_str("xml", "<grafana/>", "grafana-proxy.xml");
        assert!(matches!(
            result,
            Err(GrafanaProxyError::UnsupportedFormat(ref ext)) if ext == "xml"
        ));
    }
}
