// Genesis block miner - CLI

use clap::Parser;
use genesis_miner::{Cli, CliHandler};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut handler = CliHandler::new(std::io::stdout());

    if let Err(e) = handler.handle(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
