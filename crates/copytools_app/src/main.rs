mod cli;
mod platform;

use anyhow::Context;
use clap::Parser;
use copytools_logging::parse_level;

use cli::Cli;
use platform::{config, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir);
    let loaded = config::load_config(&data_dir);
    let defaults = config::AppConfig::default();
    let early = loaded.as_ref().ok().and_then(Option::as_ref).unwrap_or(&defaults);
    let level = parse_level(cli.log_level.as_deref().unwrap_or(&early.log_level));
    // Installed before the config is reported so its problems reach the log.
    logging::initialize(early.log_destination, level, &data_dir);
    let app_config = config::report_config(loaded, &data_dir);

    // Page documents are not `Send`; every context shares one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the runtime")?;
    let local = tokio::task::LocalSet::new();
    let succeeded = local.block_on(&runtime, platform::run(cli.command, &app_config, &data_dir))?;
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
