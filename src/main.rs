use anyhow::Result;
use clap::Parser;
use log::info;

use sift::CliArgs;

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., argument parsing fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("Sift photo culling v{}", env!("CARGO_PKG_VERSION"));

    #[cfg(feature = "gui")]
    {
        sift::gui::run(cli.directory)
    }

    #[cfg(not(feature = "gui"))]
    {
        let _ = cli.directory;
        anyhow::bail!("this build has no user interface; rebuild with --features gui")
    }
}
