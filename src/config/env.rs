//! Environment variable overrides layered on top of the config file.
//!
//! Every config key maps to `GP_<KEY>` with dots replaced by underscores
//! and upper-cased, so `grafana.url` becomes `GP_GRAFANA_URL`. A set
//! variable always wins over the file value, even when empty.

use super::model::Config;
use crate::error::GrafanaProxyError;

pub const ENV_PREFIX: &str = "GP";

type Setter = fn(&mut Config, &str, String) -> Result<(), GrafanaProxyError>;

/// Every key that can be overridden, in the order overrides are applied.
const OVERRIDES: &[(&str, Setter)] = &[
    ("grafana.url", |c: &mut Config, _: &str, v: String| {
        c.grafana.url = v;
        Ok(())
    }),
    ("grafana.cacerts", |c: &mut Config, _: &str, v: String| {
        c.grafana.cacerts = v;
        Ok(())
    }),
    ("grafana.datasource", |c: &mut Config, var: &str, v: String| {
        c.grafana.datasource = parse_number(var, &v)?;
        Ok(())
    }),
    ("grafana.key", |c: &mut Config, _: &str, v: String| {
        c.grafana.key = v;
        Ok(())
    }),
    ("grafana.timeout", |c: &mut Config, var: &str, v: String| {
        c.grafana.timeout = parse_number(var, &v)?;
        Ok(())
    }),
    ("server.address", |c: &mut Config, _: &str, v: String| {
        c.server.address = v;
        Ok(())
    }),
    ("log.level", |c: &mut Config, _: &str, v: String| {
        c.log.level = v;
        Ok(())
    }),
];

/// Keys that can be overridden from the environment.
pub fn keys() -> impl Iterator<Item = &'static str> {
    OVERRIDES.iter().map(|(key, _)| *key)
}

/// Environment variable name for a dotted config key.
#[must_use]
pub fn env_key(key: &str) -> String {
    format!("{ENV_PREFIX}_{}", key.replace('.', "_").to_uppercase())
}

fn parse_number(var: &str, value: &str) -> Result<u64, GrafanaProxyError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| GrafanaProxyError::EnvOverride {
            var: var.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Apply overrides found through `lookup` and return the keys that were set.
///
/// `lookup` receives the environment variable name; production callers pass
/// `|k| std::env::var(k).ok()`.
pub fn apply_overrides<F>(
    config: &mut Config,
    lookup: F,
) -> Result<Vec<&'static str>, GrafanaProxyError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    for (key, set) in OVERRIDES {
        let var = env_key(key);
        if let Some(value) = lookup(&var) {
            set(config, &var, value)?;
            applied.push(*key);
        }
    }

    Ok(applied)
}
