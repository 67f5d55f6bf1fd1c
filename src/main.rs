use clap::Parser;
use glassdo::cli::commands::Cli;
use glassdo::cli::handlers;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GLASSDO_LOG").unwrap_or_else(|_| EnvFilter::new("glassdo=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
