//! `grafana-proxy validate`: check the configuration without serving.
//!
//! Loads the config exactly as `run` would (file plus `GP_*` overrides),
//! builds the upstream target, and loads the trust store, then reports
//! the result as human-readable text or machine-readable JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{self, validation};
use crate::error::GrafanaProxyError;
use crate::proxy::ProxyTarget;
use crate::tls::{self, TrustSource};

pub async fn execute(args: &ValidateArgs) -> Result<(), GrafanaProxyError> {
    let loaded = match config::load(args.config.as_deref()).await {
        Ok(loaded) => loaded,
        Err(GrafanaProxyError::ConfigValidation { errors }) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} config has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "field": e.field,
                                "message": e.message,
                                "suggestion": e.suggestion,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(GrafanaProxyError::ConfigValidation { errors });
        }
        Err(e) => return Err(e),
    };

    let config = &loaded.config;
    let target = ProxyTarget::from_config(&config.grafana)?;
    let trust = tls::load_trust_store(&config.grafana.cacerts)?;

    let source = match trust.source() {
        TrustSource::System => "system".to_string(),
        TrustSource::File(path) | TrustSource::Directory(path) => path.display().to_string(),
    };

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&loaded.path.display().to_string(), config)
            );
            println!("  target:     {target}");
            println!(
                "  trust:      {} certs from {source} ({} files rejected)",
                trust.len(),
                trust.rejected().len()
            );
            if !loaded.env_overrides.is_empty() {
                println!("  from env:   {}", loaded.env_overrides.join(", "));
            }
        }
        ValidateFormat::Json => {
            let rejected: Vec<String> = trust
                .rejected()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "config": loaded.path.display().to_string(),
                    "target": target.to_string(),
                    "listen": config.server.address,
                    "trust": {
                        "source": source,
                        "certs": trust.len(),
                        "rejected": rejected,
                    },
                    "env_overrides": loaded.env_overrides,
                })
            );
        }
    }

    Ok(())
}
