//! grafana-proxy is a single-upstream HTTP reverse proxy for Grafana.
//!
//! Every inbound request is rewritten to target
//! `<grafana.url>/api/datasources/proxy/<id>/<path>` and sent with an
//! `Authorization: Bearer <grafana.key>` header, so clients can query a
//! datasource without holding the Grafana API key themselves.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate).
//! - [`config`] -- Config file loading, `GP_*` environment overrides, and
//!   validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- Per-request access log.
//! - [`proxy`] -- Request rewriting (director) and streaming dispatch to the
//!   upstream.
//! - [`server`] -- Axum router, shared immutable state, HTTP client, and
//!   graceful shutdown.
//! - [`tls`] -- Trust store for outbound TLS (system roots, PEM file, or
//!   directory of PEM files).
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file formats _(enabled by default)_ |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod server;
pub mod tls;
