use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = grafana_proxy::cli::Cli::parse();
    if let Err(e) = grafana_proxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
