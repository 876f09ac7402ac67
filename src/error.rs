//! Unified error types for grafana-proxy.
//!
//! Defines [`GrafanaProxyError`] (the main crate error enum) and
//! [`ValidationError`] for config validation failures. Both use
//! `thiserror` for `Display` and `Error` derives. Error messages
//! include contextual hints to guide the user toward a fix.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GrafanaProxyError {
    #[error("No config file found (looked for {}).\n\n  Provide --config <file> or create ./grafana-proxy.yaml", format_paths(.searched))]
    NoConfigFile { searched: Vec<PathBuf> },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid value for {var}: '{value}' ({message})")]
    EnvOverride {
        var: String,
        value: String,
        message: String,
    },

    #[error("Invalid upstream URL '{url}': {source}")]
    TargetUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid grafana.key: the token cannot be used in an Authorization header")]
    InvalidApiKey,

    #[error("Cannot read CA certificates at {}: {source}", path.display())]
    CertPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported CA certificate path {} (expected a regular file or a directory)", path.display())]
    UnsupportedCertPath { path: PathBuf },

    #[error("Failed to load system root certificates: {0}")]
    SystemRoots(String),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Upstream did not respond within {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u64 },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
