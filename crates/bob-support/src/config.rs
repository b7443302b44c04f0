//! Conversion settings: the network used for address strings and the
//! delimiter scheme used to split locking scripts into tapes.

use crate::asm;
use crate::error::AsmError;
use crate::opcodes;
use bitcoin::Network;
use std::fmt;
use std::str::FromStr;

/// A single assembly token that plays a structural role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelimiterToken {
    /// An opcode, matched by byte value whatever alias spells it.
    Op(u8),
    /// A pushdata payload, matched byte for byte.
    Data(Vec<u8>),
}

impl DelimiterToken {
    pub fn matches(&self, token: &str) -> bool {
        let op = opcodes::from_name(token);
        match self {
            DelimiterToken::Op(expected) => op == Some(*expected),
            DelimiterToken::Data(expected) => {
                op.is_none()
                    && hex::decode(token)
                        .map(|bytes| bytes == *expected)
                        .unwrap_or(false)
            }
        }
    }

    /// Assembly token emitted when the delimiter is written back out.
    pub fn to_asm(&self) -> String {
        match self {
            DelimiterToken::Op(op) => opcodes::name(*op),
            DelimiterToken::Data(bytes) => asm::data_token(bytes),
        }
    }
}

impl fmt::Display for DelimiterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_asm())
    }
}

impl FromStr for DelimiterToken {
    type Err = AsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(op) = opcodes::from_name(s) {
            return Ok(DelimiterToken::Op(op));
        }
        hex::decode(s)
            .map(DelimiterToken::Data)
            .map_err(|_| AsmError::UnknownToken(s.to_string()))
    }
}

/// The three delimiters that give a locking script its tape structure.
///
/// `op_false` + `op_return` (or `op_return` alone) at the start of a locking
/// script form the reserved prefix tape; every `separator` after it closes the
/// current tape and is never stored as a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub op_return: DelimiterToken,
    pub op_false: DelimiterToken,
    pub separator: DelimiterToken,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            op_return: DelimiterToken::Op(opcodes::OP_RETURN),
            op_false: DelimiterToken::Op(opcodes::OP_FALSE),
            // 0x7c is ASCII '|'
            separator: DelimiterToken::Op(opcodes::OP_SWAP),
        }
    }
}

impl Delimiters {
    pub fn with_separator(mut self, separator: DelimiterToken) -> Self {
        self.separator = separator;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BobConfig {
    pub network: Network,
    pub delimiters: Delimiters,
}

impl Default for BobConfig {
    fn default() -> Self {
        Self {
            network: Network::Bitcoin,
            delimiters: Delimiters::default(),
        }
    }
}

impl BobConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }
}
