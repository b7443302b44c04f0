use std::fmt;
use thiserror::Error;

/// Which side of a transaction a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Xput {
    Input(usize),
    Output(usize),
}

impl fmt::Display for Xput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Xput::Input(index) => write!(f, "input {index}"),
            Xput::Output(index) => write!(f, "output {index}"),
        }
    }
}

/// Position of a single cell inside a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocation {
    pub xput: Xput,
    pub tape: usize,
    pub cell: usize,
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tape {} cell {}", self.xput, self.tape, self.cell)
    }
}

/// Failures of the script assembler collaborator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AsmError {
    #[error("unrecognized token `{0}`")]
    UnknownToken(String),
    #[error("push data too large: {0} bytes")]
    PushTooLarge(usize),
}

#[derive(Error, Debug)]
pub enum BobError {
    #[error("error parsing BOB record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid base64 payload at {location}: {source}")]
    Base64 {
        location: CellLocation,
        #[source]
        source: base64::DecodeError,
    },
    #[error("invalid hex payload at {location}: {source}")]
    Hex {
        location: CellLocation,
        #[source]
        source: hex::FromHexError,
    },
    #[error("cell at {0} carries neither an opcode nor a data payload")]
    EmptyCell(CellLocation),
    #[error("unknown opcode at {location}: {detail}")]
    UnknownOpcode {
        location: CellLocation,
        detail: String,
    },
    #[error("{0} has no tapes")]
    MissingTape(Xput),
    #[error("{0} tape 0 has no cells")]
    MissingCell(Xput),
    #[error("failed to compile script for {xput}: {source}")]
    Compile {
        xput: Xput,
        #[source]
        source: AsmError,
    },
    #[error("failed to decompile script for {xput}: {source}")]
    Decompile {
        xput: Xput,
        #[source]
        source: bitcoin::script::Error,
    },
    #[error("invalid address `{address}` on {xput}: {reason}")]
    Address {
        xput: Xput,
        address: String,
        reason: String,
    },
    #[error("invalid previous txid `{txid}` on {xput}")]
    PreviousTxid { xput: Xput, txid: String },
    #[error("invalid raw transaction: {0}")]
    RawTx(#[from] bitcoin::consensus::encode::FromHexError),
    #[error("transaction id mismatch: record says {expected}, rebuilt {actual}")]
    TxidMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, BobError>;
