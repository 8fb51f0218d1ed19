use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use novelforge::cli::{parse_args, run_cli_command};

const DEFAULT_LOG_FILTER: &str = "novelforge=info";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so streamed text on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let command = parse_args(std::env::args());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(command))
}
