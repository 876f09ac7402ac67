//! Reverse proxy dispatch to the Grafana datasource endpoint.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every request, rewrites it with the [`director`], sends it over the
//! shared HTTP client, and streams the upstream response back. Transport
//! failures become `502 Bad Gateway` (`504` on timeout) and are never
//! retried.

pub mod director;
pub mod headers;
pub mod target;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

use crate::error::GrafanaProxyError;
use crate::server::AppState;

pub use target::ProxyTarget;

pub async fn forward_handler(State(state): State<Arc<AppState>>, mut req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    if let Err(e) = director::rewrite(&state.target, &mut req) {
        tracing::error!(
            method = %method,
            path = %path,
            error = %e,
            "failed to rewrite request"
        );
        return StatusCode::BAD_GATEWAY.into_response();
    }
    headers::strip_hop_by_hop(req.headers_mut());
    if let Some(ip) = client_ip.as_deref() {
        headers::append_forwarded_for(req.headers_mut(), ip);
    }

    let upstream = req.uri().clone();
    tracing::debug!(method = %method, path = %path, upstream = %upstream, "forwarding request");

    match send_upstream(&state, req).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            headers::strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            let status = match e {
                GrafanaProxyError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            tracing::error!(
                method = %method,
                path = %path,
                upstream = %upstream,
                client = client_ip.as_deref().unwrap_or("-"),
                status = status.as_u16(),
                error = %e,
                "upstream request failed"
            );
            status.into_response()
        }
    }
}

async fn send_upstream(
    state: &AppState,
    req: Request,
) -> Result<hyper::Response<Incoming>, GrafanaProxyError> {
    let pending = state.http_client.request(req);
    let result = match state.timeout {
        Some(timeout) => tokio::time::timeout(timeout, pending).await.map_err(|_| {
            GrafanaProxyError::UpstreamTimeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        })?,
        None => pending.await,
    };
    result.map_err(|e| GrafanaProxyError::HttpRequest {
        source: Box::new(e),
    })
}
