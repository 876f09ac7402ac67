//! Shared fixtures: a fake Grafana upstream, a TLS variant of it, and a
//! running proxy wired to either.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

use grafana_proxy::config::model::GrafanaConfig;
use grafana_proxy::proxy::ProxyTarget;
use grafana_proxy::server::{self, AppState};
use grafana_proxy::tls::{load_trust_store, TrustStore};

/// What the fake upstream saw.
#[derive(Debug, Deserialize)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl Echo {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    Json(serde_json::json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "headers": seen,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn teapot() -> impl IntoResponse {
    (
        StatusCode::IM_A_TEAPOT,
        [("x-upstream", "grafana"), ("proxy-authenticate", "Basic")],
        "short and stout",
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

/// Plain HTTP upstream echoing every request it receives as JSON.
pub async fn start_upstream() -> SocketAddr {
    let router = Router::new()
        .route("/api/datasources/proxy/{id}/teapot", get(teapot))
        .route("/api/datasources/proxy/{id}/slow", get(slow))
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub struct TestCert {
    pub cert: CertificateDer<'static>,
    pub key: PrivateKeyDer<'static>,
    pub pem: String,
}

/// Self-signed certificate valid for `localhost` and `127.0.0.1`.
pub fn self_signed() -> TestCert {
    let generated =
        rcgen::generate_simple_self_signed(vec!["localhost".into(), "127.0.0.1".into()]).unwrap();
    TestCert {
        cert: generated.cert.der().clone(),
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(generated.key_pair.serialize_der())),
        pem: generated.cert.pem(),
    }
}

/// Write `pem` into a fresh temp dir and return the dir with the file path.
pub fn write_pem(pem: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ca.pem");
    std::fs::write(&path, pem).unwrap();
    (dir, path)
}

/// Trust store holding a throwaway certificate. Good enough for plain
/// HTTP upstreams where it is never consulted.
pub fn unused_trust_store() -> (tempfile::TempDir, TrustStore) {
    let (dir, path) = write_pem(&self_signed().pem);
    let store = load_trust_store(path.to_str().unwrap()).unwrap();
    (dir, store)
}

/// HTTPS upstream answering `<uri> <authorization>` as plain text.
pub async fn start_tls_upstream(cert: &TestCert) -> SocketAddr {
    let _ = rustls::crypto::ring::default_provider().install_default();
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert.cert.clone()], cert.key.clone_key())
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((tcp, _)) = listener.accept().await else {
                break;
            };
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(tls) = acceptor.accept(tcp).await else {
                    return;
                };
                let service = service_fn(|req: hyper::Request<Incoming>| async move {
                    let auth = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body = format!("{} {auth}", req.uri());
                    Ok::<_, Infallible>(hyper::Response::new(Full::new(Bytes::from(body))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(tls), service)
                    .await;
            });
        }
    });
    addr
}

pub fn grafana(url: String, datasource: u64, key: &str, timeout: u64) -> GrafanaConfig {
    GrafanaConfig {
        url,
        cacerts: String::new(),
        datasource,
        key: key.into(),
        timeout,
    }
}

/// Serve the proxy on an ephemeral port. Dropping the sender shuts it down.
pub async fn start_proxy(
    grafana: &GrafanaConfig,
    trust: &TrustStore,
) -> (SocketAddr, oneshot::Sender<()>) {
    let target = ProxyTarget::from_config(grafana).unwrap();
    let state = Arc::new(AppState::new(target, trust, grafana.timeout));
    let router = server::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    (addr, shutdown_tx)
}
