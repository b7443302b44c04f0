use crate::options::Options;
use anyhow::{Context, Result};
use bitcoin::consensus::encode::serialize_hex;
use bob_support::BobTx;
use clap::{Parser, Subcommand as ClapSubcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(ClapSubcommand, Debug, Clone)]
pub enum Subcommand {
    /// Raw transaction hex to BOB JSON, one record per line.
    Decode(Decode),
    /// BOB JSON lines back to raw transaction hex.
    Encode(Encode),
    /// Input and output addresses of a raw transaction.
    Addresses(Addresses),
}

#[derive(Parser, Debug, Clone)]
pub struct Decode {
    #[clap(help = "Raw transaction hex; read from stdin when omitted")]
    pub raw: Vec<String>,
    #[clap(long, help = "Indent the JSON output")]
    pub pretty: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct Encode {
    #[clap(help = "File of BOB JSON lines; read from stdin when omitted")]
    pub file: Option<PathBuf>,
    #[clap(long, help = "Check the rebuilt txid against tx.h")]
    pub verify: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct Addresses {
    #[clap(help = "Raw transaction hex; read from stdin when omitted")]
    pub raw: Option<String>,
}

fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

impl Subcommand {
    pub fn run(self, options: &Options) -> Result<()> {
        let config = options.config();
        let mut stdout = io::stdout().lock();
        match self {
            Subcommand::Decode(decode) => {
                let raws = if decode.raw.is_empty() {
                    read_lines(None)?
                } else {
                    decode.raw
                };
                for (n, raw) in raws.iter().enumerate() {
                    let bob = BobTx::from_raw_tx_hex(raw, &config)
                        .with_context(|| format!("Failed to decode transaction {n}"))?;
                    let json = if decode.pretty {
                        serde_json::to_string_pretty(&bob)?
                    } else {
                        bob.to_json_string()?
                    };
                    writeln!(stdout, "{json}")?;
                }
                info!("decoded {} transactions", raws.len());
                Ok(())
            }
            Subcommand::Encode(encode) => {
                let lines = read_lines(encode.file.as_deref())?;
                for (n, line) in lines.iter().enumerate() {
                    let bob: BobTx = line
                        .parse()
                        .with_context(|| format!("Failed to parse BOB record on line {}", n + 1))?;
                    let tx = if encode.verify {
                        bob.to_tx_verified(&config)
                    } else {
                        bob.to_tx(&config)
                    }
                    .with_context(|| format!("Failed to rebuild transaction {}", bob.tx.h))?;
                    writeln!(stdout, "{}", serialize_hex(&tx))?;
                }
                info!("encoded {} transactions", lines.len());
                Ok(())
            }
            Subcommand::Addresses(addresses) => {
                let raw = match addresses.raw {
                    Some(raw) => raw,
                    None => read_lines(None)?
                        .into_iter()
                        .next()
                        .context("No transaction on stdin")?,
                };
                let bob = BobTx::from_raw_tx_hex(&raw, &config)
                    .context("Failed to decode transaction")?;
                let json = serde_json::json!({
                    "in": bob.input_addresses(),
                    "out": bob.output_addresses(),
                });
                writeln!(stdout, "{json}")?;
                Ok(())
            }
        }
    }
}
