//! farescout binary

use clap::Parser;

use farescout::cli::{display_error_with_suggestions, run, Cli};
use farescout::observability::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            display_error_with_suggestions(&e, "farescout failed");
            1
        }
    };

    std::process::exit(code);
}
