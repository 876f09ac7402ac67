//! Trust store construction for outbound TLS to the upstream.
//!
//! [`load_trust_store`] builds a [`TrustStore`] from one of three sources:
//! the platform roots (empty path), a single PEM bundle, or every `*.pem`
//! file directly inside a directory. The path itself is inspected without
//! following symlinks.
//!
//! PEM files that yield no usable certificate are skipped with a warning
//! and listed in [`TrustStore::rejected`]. I/O errors abort the whole load
//! and no partially filled store is returned.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use rustls::{ClientConfig, RootCertStore};

use crate::error::GrafanaProxyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustSource {
    System,
    File(PathBuf),
    Directory(PathBuf),
}

impl TrustSource {
    /// Classify `path` using `lstat` semantics.
    pub fn resolve(path: &str) -> Result<Self, GrafanaProxyError> {
        if path.is_empty() {
            return Ok(Self::System);
        }

        let path = PathBuf::from(path);
        let metadata = fs::symlink_metadata(&path).map_err(|source| GrafanaProxyError::CertPath {
            path: path.clone(),
            source,
        })?;

        let file_type = metadata.file_type();
        if file_type.is_file() {
            Ok(Self::File(path))
        } else if file_type.is_dir() {
            Ok(Self::Directory(path))
        } else {
            Err(GrafanaProxyError::UnsupportedCertPath { path })
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrustStore {
    roots: RootCertStore,
    source: TrustSource,
    rejected: Vec<PathBuf>,
}

impl TrustStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[must_use]
    pub const fn source(&self) -> &TrustSource {
        &self.source
    }

    /// PEM files that contained no usable certificate.
    #[must_use]
    pub fn rejected(&self) -> &[PathBuf] {
        &self.rejected
    }

    #[must_use]
    pub const fn roots(&self) -> &RootCertStore {
        &self.roots
    }

    /// Client TLS config verifying servers against this store.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .with_root_certificates(Arc::new(self.roots.clone()))
            .with_no_client_auth()
    }
}

pub fn load_trust_store(path: &str) -> Result<TrustStore, GrafanaProxyError> {
    let source = TrustSource::resolve(path)?;
    let mut roots = RootCertStore::empty();
    let mut rejected = Vec::new();

    match &source {
        TrustSource::System => {
            tracing::info!("using system root CA certs");
            add_system_roots(&mut roots)?;
        }
        TrustSource::File(file) => {
            tracing::info!(file = %file.display(), "loading CA certs from file");
            add_pem_file(&mut roots, &mut rejected, file)?;
        }
        TrustSource::Directory(dir) => {
            tracing::info!(dir = %dir.display(), "loading CA certs from directory");
            for file in pem_files(dir)? {
                add_pem_file(&mut roots, &mut rejected, &file)?;
            }
        }
    }

    tracing::info!(
        certs = roots.len(),
        rejected_files = rejected.len(),
        "trust store ready"
    );

    Ok(TrustStore {
        roots,
        source,
        rejected,
    })
}

fn add_system_roots(roots: &mut RootCertStore) -> Result<(), GrafanaProxyError> {
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        tracing::warn!(error = %err, "failed to load a system root certificate");
    }
    if native.certs.is_empty() && !native.errors.is_empty() {
        let reasons: Vec<String> = native.errors.iter().map(ToString::to_string).collect();
        return Err(GrafanaProxyError::SystemRoots(reasons.join("; ")));
    }

    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    tracing::debug!(added, ignored, "loaded system root certificates");
    Ok(())
}

/// Direct children of `dir` whose name ends in `.pem`, sorted by name.
fn pem_files(dir: &Path) -> Result<Vec<PathBuf>, GrafanaProxyError> {
    let cert_path_err = |source| GrafanaProxyError::CertPath {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(cert_path_err)? {
        let entry = entry.map_err(cert_path_err)?;
        if entry.file_name().to_string_lossy().ends_with(".pem") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn add_pem_file(
    roots: &mut RootCertStore,
    rejected: &mut Vec<PathBuf>,
    path: &Path,
) -> Result<(), GrafanaProxyError> {
    let data = fs::read(path).map_err(|source| GrafanaProxyError::CertPath {
        path: path.to_path_buf(),
        source,
    })?;

    let mut malformed = 0usize;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut data.as_slice())
        .filter_map(|item| item.map_err(|_| malformed += 1).ok())
        .collect();

    let (added, ignored) = roots.add_parsable_certificates(certs);
    let ignored = ignored + malformed;

    if added == 0 {
        tracing::warn!(
            file = %path.display(),
            ignored,
            "no usable CA certificates in PEM file, skipping"
        );
        rejected.push(path.to_path_buf());
    } else {
        tracing::debug!(file = %path.display(), added, ignored, "added CA certificates");
    }
    Ok(())
}
