//! ping-stats - mtr statistics for the node-exporter textfile collector
//!
//! Runs mtr report passes against configured IPv4 targets, averages the
//! per-target hop statistics, and publishes them as Prometheus samples.

use clap::Parser;
use ping_stats::{app::App, cli::Cli, error::ErrorReporter};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}
