//! Rewrites an inbound request so it targets the upstream datasource.
//!
//! The rewrite is a pure function of the [`ProxyTarget`] and the request:
//! scheme and authority are replaced, the inbound path is appended to the
//! datasource proxy path, query strings are merged, and the bearer token
//! replaces whatever `Authorization` the client sent.

use axum::http::{header, HeaderValue, Request, Uri};

use super::target::{merge_query, single_joining_slash, ProxyTarget};
use crate::error::GrafanaProxyError;

pub fn rewrite<B>(target: &ProxyTarget, req: &mut Request<B>) -> Result<(), GrafanaProxyError> {
    let path = single_joining_slash(target.path(), req.uri().path());
    let query = merge_query(target.query(), req.uri().query().unwrap_or(""));
    let path_and_query = if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    };

    let uri = Uri::builder()
        .scheme(target.scheme().clone())
        .authority(target.authority().clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| GrafanaProxyError::UriParse {
            source: Box::new(e),
        })?;
    *req.uri_mut() = uri;

    let headers = req.headers_mut();
    headers.insert(header::HOST, target.host().clone());
    if !headers.contains_key(header::USER_AGENT) {
        // Present but empty, so no client default gets filled in.
        headers.insert(header::USER_AGENT, HeaderValue::from_static(""));
    }
    headers.insert(header::AUTHORIZATION, target.authorization().clone());

    Ok(())
}
