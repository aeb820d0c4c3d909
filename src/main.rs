//! oligofind - Primer/Probe Discovery and Scoring

use clap::Parser;
use mimalloc::MiMalloc;

use oligofind::cli::{run, Cli};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(err) = run(cli) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
