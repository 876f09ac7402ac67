//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for values that
//! would only fail later at startup or on the first request: a malformed
//! upstream URL, a listen address without a port, or an API key that
//! cannot be carried in an HTTP header. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use axum::http::HeaderValue;
use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate the upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_upstream_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().map_or(true, str::is_empty) {
                Err(format!("'{url}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate a `host:port` listen address. Host names are allowed and an
/// empty host means all interfaces.
pub fn validate_listen_address(address: &str) -> Result<(), String> {
    if address.is_empty() {
        return Err("address cannot be empty".into());
    }
    match address.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => Ok(()),
        Some((_, port)) => Err(format!("'{port}' is not a valid port")),
        None => Err(format!("'{address}' has no port")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_upstream_url(&config.grafana.url) {
        errors.push(ValidationError {
            field: "grafana.url".into(),
            message: msg,
            suggestion: if config.grafana.url.contains("://") {
                None
            } else {
                Some(format!("did you mean 'http://{}'?", config.grafana.url))
            },
        });
    }

    if HeaderValue::from_str(&format!("Bearer {}", config.grafana.key)).is_err() {
        errors.push(ValidationError {
            field: "grafana.key".into(),
            message: "contains characters not allowed in an HTTP header".into(),
            suggestion: Some("check for stray newlines around the token".into()),
        });
    }

    if let Err(msg) = validate_listen_address(&config.server.address) {
        errors.push(ValidationError {
            field: "server.address".into(),
            message: msg,
            suggestion: Some("use host:port, e.g. localhost:8080".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let timeout = if config.grafana.timeout == 0 {
        "none".to_string()
    } else {
        format!("{}ms", config.grafana.timeout)
    };
    let cacerts = if config.grafana.cacerts.is_empty() {
        "system roots"
    } else {
        config.grafana.cacerts.as_str()
    };

    let lines = [
        format!("  upstream:   {}", config.grafana.url),
        format!("  datasource: {}", config.grafana.datasource),
        format!(
            "  api key:    {}",
            if config.grafana.key.is_empty() {
                "(empty)"
            } else {
                "set"
            }
        ),
        format!("  ca certs:   {cacerts}"),
        format!("  timeout:    {timeout}"),
        format!("  listen:     {}", config.server.address),
        format!("  log level:  {:?}", config.log.level()),
    ];

    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn invalid_url_fails() {
        let mut config = Config::default();
        config.grafana.url = "not a url".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "grafana.url");
        assert!(errors[0].message.contains("not a valid URL"));
    }

    #[test]
    fn missing_scheme_suggests_http() {
        let mut config = Config::default();
        config.grafana.url = "grafana.local".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'http://grafana.local'?")
        );
    }

    #[test]
    fn non_http_scheme_fails() {
        let mut config = Config::default();
        config.grafana.url = "ftp://grafana.local".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn key_with_newline_fails() {
        let mut config = Config::default();
        config.grafana.key = "abc\n".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "grafana.key"));
    }

    #[test]
    fn listen_address_needs_port() {
        assert!(validate_listen_address("localhost:8080").is_ok());
        assert!(validate_listen_address("[::1]:8080").is_ok());
        assert!(validate_listen_address("localhost").is_err());
        assert!(validate_listen_address("localhost:http").is_err());
        assert!(validate_listen_address("").is_err());
        assert!(validate_listen_address(":8080").is_ok());
    }

    #[test]
    fn errors_are_collected_together() {
        let mut config = Config::default();
        config.grafana.url = "nope".into();
        config.server.address = "nowhere".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn report_mentions_upstream_and_datasource() {
        let mut config = Config::default();
        config.grafana.datasource = 7;
        let report = format_validation_report("grafana-proxy.yaml", &config);
        assert!(report.starts_with("grafana-proxy.yaml is valid"));
        assert!(report.contains("datasource: 7"));
        assert!(report.contains("ca certs:   system roots"));
    }
}
