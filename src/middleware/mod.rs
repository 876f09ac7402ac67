//! Tower middleware layers.
//!
//! [`access_log`] emits one structured `handled request` record per
//! request once the proxied response is ready.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

/// Where a request came from, preferring proxy-supplied headers over the
/// socket address.
#[must_use]
pub fn client_origin(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    ["x-real-ip", "x-forwarded-for"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .find(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| remote.map(|addr| addr.to_string()))
        .unwrap_or_default()
}

/// Declared request body length. `0` without a body, `-1` when a body is
/// chunked or the header is unparsable.
fn content_length(headers: &HeaderMap) -> i64 {
    match headers.get(header::CONTENT_LENGTH) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(-1),
        None if headers.contains_key(header::TRANSFER_ENCODING) => -1,
        None => 0,
    }
}

pub async fn access_log(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = req.uri().path().to_string();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let origin = client_origin(req.headers(), remote);
    let length = content_length(req.headers());
    let agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let response = next.run(req).await;

    tracing::info!(
        origin = %origin,
        length,
        agent = %agent,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "handled request"
    );
    response
}
