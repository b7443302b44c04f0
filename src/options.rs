use crate::chain::Chain;
use crate::subcommand::Subcommand;
use bob_support::{BobConfig, DelimiterToken, Delimiters};
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Convert Bitcoin SV transactions to and from the BOB tape/cell format"
)]
pub struct Options {
    #[clap(
        long,
        global = true,
        default_value = "mainnet",
        help = "Chain to use for addresses: mainnet, testnet, signet, regtest"
    )]
    pub chain: Chain,
    #[clap(
        long,
        global = true,
        default_value = "OP_SWAP",
        help = "Tape separator: an opcode mnemonic, or hex for a pushed payload (7c)"
    )]
    pub separator: DelimiterToken,
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Options {
    pub fn config(&self) -> BobConfig {
        BobConfig::new(self.chain.network())
            .with_delimiters(Delimiters::default().with_separator(self.separator.clone()))
    }
}
