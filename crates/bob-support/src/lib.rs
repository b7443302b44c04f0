//! Tape/cell tokenization of Bitcoin SV transactions (the BOB format).
//!
//! Locking scripts are split into [`Tape`]s of [`Cell`]s at protocol
//! delimiters and can be reassembled byte for byte. Unlocking scripts are
//! kept whole.
//!
//! ```no_run
//! use bob_support::{BobConfig, BobTx};
//!
//! # fn main() -> bob_support::Result<()> {
//! let config = BobConfig::default();
//! let bob = BobTx::from_raw_tx_hex("0100000001...", &config)?;
//! println!("{}", bob.to_json_string()?);
//! assert_eq!(bob.to_raw_tx_hex(&config)?, "0100000001...");
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod asm;
pub mod cell;
pub mod config;
pub mod detokenizer;
pub mod error;
pub mod opcodes;
pub mod record;
pub mod tokenizer;
pub mod transaction;

pub use address::AddressField;
pub use cell::{Cell, Payload, Tape};
pub use config::{BobConfig, DelimiterToken, Delimiters};
pub use detokenizer::Detokenizer;
pub use error::{AsmError, BobError, CellLocation, Result, Xput};
pub use tokenizer::Tokenizer;
pub use transaction::{
    BobTx, Blk, Input, InputExtra, Output, OutputExtra, SpendableInput, TxHash,
};
