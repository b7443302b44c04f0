use anyhow::Result;
use clap::Parser;
use options::Options;

mod chain;
mod options;
mod subcommand;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = Options::parse();
    let subcommand = options.subcommand.clone();
    subcommand.run(&options)
}
