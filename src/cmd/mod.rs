//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to [`run`] (also the
//! default when no subcommand is given) or [`validate`].

pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::GrafanaProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), GrafanaProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        None => run::execute(cli.run).await,
    }
}

/// Short commit hash embedded by the build script, `unknown` outside git.
#[must_use]
pub const fn build_id() -> &'static str {
    env!("GRAFANA_PROXY_GIT_SHORT")
}
