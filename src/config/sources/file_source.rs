//! Async file-based config source.
//!
//! [`FileSource`] reads the config file through Tokio and hands the
//! content to [`parse_config_str`] using the file extension to pick the
//! format.

use std::path::{Path, PathBuf};

use super::parse_config_str;
use crate::config::model::Config;
use crate::error::GrafanaProxyError;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }

    async fn read_content(&self) -> Result<String, GrafanaProxyError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GrafanaProxyError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                GrafanaProxyError::Io(e)
            }
        })
    }

    pub async fn load(&self) -> Result<Config, GrafanaProxyError> {
        let content = self.read_content().await?;
        parse_config_str(self.extension(), &content, &self.path.display().to_string())
    }
}
