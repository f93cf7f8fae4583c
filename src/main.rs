//! Ledgerweb main entry point

use clap::Parser;
use ledgerweb_api::start_server;
use ledgerweb_config::Config;
use ledgerweb_core::Ledger;
use ledgerweb_store::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerweb")]
#[command(version = "0.1.0")]
#[command(about = "A multi-company transaction ledger with approval workflow", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = if args.config.exists() {
        Config::load(args.config.clone())?
    } else {
        eprintln!(
            "[WARN] config file {} not found, using defaults",
            args.config.display()
        );
        Config::default()
    };

    // RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(Ledger::new(config.clone(), store));

        start_server(config, ledger).await
    })?;

    Ok(())
}
