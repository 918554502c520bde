use anyhow::Result;
use clap::Parser;
use dyonak::cli::Cli;
use dyonak::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging. Logs go to stderr so command output stays clean.
fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dyonak=debug")
    } else {
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("dyonak=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config, cli.verbose);

    cli.run(config).await
}
