use clap::Parser;
use stream_annotate::cli::Args;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("starting stream-annotate {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = stream_annotate::run(args).await {
        error!("{err}");
        std::process::exit(err.exit_code());
    }
}
