//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser and the [`Commands`] enum.
//! Running the binary without a subcommand starts the proxy, so
//! `grafana-proxy -c proxy.yaml` and `grafana-proxy run -c proxy.yaml`
//! are equivalent.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "grafana-proxy",
    version,
    about = "Reverse proxy to a Grafana datasource with an injected API key",
    args_conflicts_with_subcommands = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        grafana-proxy                        Start with ./grafana-proxy.yaml\n  \
        grafana-proxy -c proxy.toml          Start with a specific config\n  \
        grafana-proxy validate               Check config and CA certs\n\n  \
        Every config key can be overridden with GP_<KEY>, e.g. GP_GRAFANA_KEY."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server (default)
    Run(RunArgs),

    /// Validate the config and CA certificates without starting
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Explicit config file (.yaml, .yml, .json, .toml)
    #[arg(short, long, env = "GP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Explicit config file (.yaml, .yml, .json, .toml)
    #[arg(short, long, env = "GP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_runs_with_top_level_args() {
        let cli = Cli::try_parse_from(["grafana-proxy", "-c", "proxy.toml", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.config, Some(PathBuf::from("proxy.toml")));
        assert!(cli.run.json);
    }

    #[test]
    fn explicit_run_subcommand() {
        let cli = Cli::try_parse_from(["grafana-proxy", "run", "--config", "a.yaml"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.config, Some(PathBuf::from("a.yaml")));
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn validate_subcommand_with_json_format() {
        let cli = Cli::try_parse_from(["grafana-proxy", "validate", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Validate(ValidateArgs {
                format: ValidateFormat::Json,
                ..
            }))
        ));
    }

    #[test]
    fn pretty_and_json_conflict() {
        assert!(Cli::try_parse_from(["grafana-proxy", "--pretty", "--json"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
