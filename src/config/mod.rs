//! Configuration loading and validation.
//!
//! Resolves the config file (explicit `--config` path or auto-detected
//! `grafana-proxy.*` in the working directory), parses it, layers the
//! `GP_*` environment overrides on top, and validates the result. The
//! loaded [`Config`] is immutable for the lifetime of the process.

pub mod env;
pub mod model;
pub mod sources;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::GrafanaProxyError;
use model::Config;
use sources::file_source::FileSource;

/// Base name of the auto-detected config file.
pub const CONFIG_NAME: &str = "grafana-proxy";

const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// Keys whose value came from the environment instead of the file.
    pub env_overrides: Vec<&'static str>,
}

/// Load the config using the process environment for overrides.
pub async fn load(explicit: Option<&Path>) -> Result<LoadedConfig, GrafanaProxyError> {
    load_with_env(explicit, Path::new("."), |key| std::env::var(key).ok()).await
}

/// Load the config from `explicit` or by searching `search_dir`, resolving
/// environment overrides through `lookup`.
pub async fn load_with_env<F>(
    explicit: Option<&Path>,
    search_dir: &Path,
    lookup: F,
) -> Result<LoadedConfig, GrafanaProxyError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = resolve_file(explicit, search_dir).await?;
    let mut config = FileSource::new(path.clone()).load().await?;
    let env_overrides = env::apply_overrides(&mut config, lookup)?;

    if let Err(errors) = validation::validate(&config) {
        return Err(GrafanaProxyError::ConfigValidation { errors });
    }

    Ok(LoadedConfig {
        config,
        path,
        env_overrides,
    })
}

async fn resolve_file(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<PathBuf, GrafanaProxyError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates: Vec<PathBuf> = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| search_dir.join(format!("{CONFIG_NAME}.{ext}")))
        .collect();

    for path in &candidates {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(path.clone());
        }
    }

    Err(GrafanaProxyError::NoConfigFile {
        searched: candidates,
    })
}
