//! The fixed upstream a proxy instance forwards to.
//!
//! [`ProxyTarget`] is computed once from config: the Grafana base URL
//! joined with `/api/datasources/proxy/<id>/`, split into the pieces
//! the director needs, plus the precomputed `Authorization` value.

use axum::http::uri::{Authority, Scheme};
use axum::http::HeaderValue;
use url::Url;

use crate::config::model::GrafanaConfig;
use crate::error::GrafanaProxyError;

/// Concatenate `a` and `b` with exactly one `/` between them.
#[must_use]
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{a}{}", &b[1..]),
        (false, false) => format!("{a}/{b}"),
        _ => format!("{a}{b}"),
    }
}

/// Combine two raw query strings, joining with `&` only when both are set.
#[must_use]
pub fn merge_query(target: &str, inbound: &str) -> String {
    if target.is_empty() || inbound.is_empty() {
        format!("{target}{inbound}")
    } else {
        format!("{target}&{inbound}")
    }
}

/// Path under the Grafana base URL that proxies to datasource `id`.
#[must_use]
pub fn datasource_proxy_path(id: u64) -> String {
    format!("/api/datasources/proxy/{id}/")
}

#[derive(Debug, Clone)]
pub struct ProxyTarget {
    url: Url,
    scheme: Scheme,
    authority: Authority,
    host: HeaderValue,
    authorization: HeaderValue,
}

impl ProxyTarget {
    /// Join the datasource path onto the path portion of `grafana.url`.
    /// Any query on the base URL is kept and merged into every request.
    pub fn from_config(grafana: &GrafanaConfig) -> Result<Self, GrafanaProxyError> {
        let mut url = parse_url(&grafana.url)?;
        let joined = single_joining_slash(url.path(), &datasource_proxy_path(grafana.datasource));
        url.set_path(&joined);
        Self::from_url(url, &grafana.key)
    }

    /// Build a target from the full upstream URL and the bearer token.
    pub fn new(upstream: &str, key: &str) -> Result<Self, GrafanaProxyError> {
        Self::from_url(parse_url(upstream)?, key)
    }

    fn from_url(url: Url, key: &str) -> Result<Self, GrafanaProxyError> {

        let uri_err = |e: axum::http::Error| GrafanaProxyError::UriParse {
            source: Box::new(e),
        };
        let scheme: Scheme = url
            .scheme()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| uri_err(e.into()))?;
        let authority: Authority = url[url::Position::BeforeHost..url::Position::AfterPort]
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| uri_err(e.into()))?;
        let host = HeaderValue::from_str(authority.as_str())
            .map_err(|e: axum::http::header::InvalidHeaderValue| uri_err(e.into()))?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| GrafanaProxyError::InvalidApiKey)?;
        authorization.set_sensitive(true);

        Ok(Self {
            url,
            scheme,
            authority,
            host,
            authorization,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    #[must_use]
    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value for the outbound `Host` header.
    #[must_use]
    pub const fn host(&self) -> &HeaderValue {
        &self.host
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    #[must_use]
    pub fn query(&self) -> &str {
        self.url.query().unwrap_or("")
    }

    #[must_use]
    pub const fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }
}

fn parse_url(raw: &str) -> Result<Url, GrafanaProxyError> {
    Url::parse(raw).map_err(|source| GrafanaProxyError::TargetUrl {
        url: raw.to_string(),
        source,
    })
}

impl std::fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
