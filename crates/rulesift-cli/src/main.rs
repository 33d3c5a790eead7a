use std::io;

use clap::Parser;
use rulesift_cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli, io::stdin().lock(), io::stdout().lock())
}
