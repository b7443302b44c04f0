//! Wire records for the BOB JSON format and the hex backfill that runs on
//! them before they become a [`BobTx`].
//!
//! Field names are those used by existing BOB indexers (`tx.h`, `in`, `out`,
//! `tape`, `cell`, `b`/`h`/`s`, `op`/`ops`, `i`/`ii`, `e`, `seq`, `lock`,
//! `blk`) and must not change. Inputs decoded from a native transaction add
//! `raw`.

use crate::address::AddressField;
use crate::cell::{Cell, Payload, Tape, BASE64};
use crate::error::{BobError, CellLocation, Result, Xput};
use crate::opcodes;
use crate::transaction::{
    default_version, BobTx, Blk, Input, InputExtra, Output, OutputExtra, TxHash,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    #[serde(default)]
    pub i: u32,
    #[serde(default)]
    pub ii: u32,
}

impl From<Cell> for CellRecord {
    fn from(cell: Cell) -> Self {
        let mut record = CellRecord {
            i: cell.i,
            ii: cell.ii,
            ..Default::default()
        };
        match cell.payload {
            Payload::Opcode { value, mnemonic } => {
                record.op = Some(value);
                record.ops = Some(mnemonic);
            }
            Payload::Data { hex, base64, text } => {
                record.h = Some(hex);
                record.b = Some(base64);
                record.s = Some(text);
            }
        }
        record
    }
}

impl CellRecord {
    /// Fill a missing `h` from `b`.
    pub fn backfill_hex(&mut self, location: CellLocation) -> Result<()> {
        if self.h.is_some() {
            return Ok(());
        }
        if let Some(b) = &self.b {
            let bytes = BASE64
                .decode(b)
                .map_err(|source| BobError::Base64 { location, source })?;
            self.h = Some(hex::encode(bytes));
        }
        Ok(())
    }

    /// Classify the record as an opcode or data cell.
    ///
    /// A non-empty `ops`, or an `op` without any binary payload, makes an
    /// opcode cell. Otherwise the cell must carry `h` (backfill has already
    /// derived it from `b` where possible).
    pub fn into_cell(self, location: CellLocation) -> Result<Cell> {
        let ops = self.ops.filter(|ops| !ops.is_empty());
        let has_payload = self.h.is_some() || self.b.is_some();

        let payload = if ops.is_some() || (self.op.is_some() && !has_payload) {
            let (value, mnemonic) = match (self.op, ops) {
                (Some(value), Some(mnemonic)) => (value, mnemonic),
                (Some(value), None) => (value, opcodes::name(value)),
                (None, Some(mnemonic)) => match opcodes::from_name(&mnemonic) {
                    Some(value) => (value, mnemonic),
                    None => {
                        return Err(BobError::UnknownOpcode {
                            location,
                            detail: mnemonic,
                        })
                    }
                },
                (None, None) => return Err(BobError::EmptyCell(location)),
            };
            Payload::Opcode { value, mnemonic }
        } else if let Some(hex) = self.h {
            let bytes =
                hex::decode(&hex).map_err(|source| BobError::Hex { location, source })?;
            Payload::Data {
                base64: self.b.unwrap_or_else(|| BASE64.encode(&bytes)),
                text: self
                    .s
                    .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned()),
                hex,
            }
        } else {
            return Err(BobError::EmptyCell(location));
        };

        Ok(Cell {
            payload,
            i: self.i,
            ii: self.ii,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TapeRecord {
    #[serde(default)]
    pub cell: Vec<CellRecord>,
    #[serde(default)]
    pub i: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    pub i: u32,
    #[serde(default)]
    pub tape: Vec<TapeRecord>,
    pub e: InputExtra,
    pub seq: u32,
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputExtraRecord {
    pub a: AddressField,
    pub v: u64,
    #[serde(default)]
    pub i: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputRecord {
    pub i: u32,
    #[serde(default)]
    pub tape: Vec<TapeRecord>,
    pub e: OutputExtraRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub tx: TxHash,
    #[serde(default)]
    pub blk: Option<Blk>,
    #[serde(rename = "in")]
    pub inputs: Vec<InputRecord>,
    #[serde(rename = "out")]
    pub outputs: Vec<OutputRecord>,
    #[serde(default)]
    pub lock: u32,
    #[serde(default = "default_version")]
    pub ver: i32,
}

impl TxRecord {
    pub fn from_slice(line: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(line)?)
    }

    fn tapes_mut(&mut self) -> impl Iterator<Item = (Xput, &mut Vec<TapeRecord>)> {
        let inputs = self
            .inputs
            .iter_mut()
            .enumerate()
            .map(|(n, input)| (Xput::Input(n), &mut input.tape));
        let outputs = self
            .outputs
            .iter_mut()
            .enumerate()
            .map(|(n, output)| (Xput::Output(n), &mut output.tape));
        inputs.chain(outputs)
    }

    /// Give every cell that only carries base64 its hex form, across all
    /// inputs and outputs.
    pub fn backfill_hex(&mut self) -> Result<()> {
        for (xput, tapes) in self.tapes_mut() {
            for (tape, record) in tapes.iter_mut().enumerate() {
                for (cell, cell_record) in record.cell.iter_mut().enumerate() {
                    cell_record.backfill_hex(CellLocation { xput, tape, cell })?;
                }
            }
        }
        Ok(())
    }

    /// Structural conversion into the model. Call after [`Self::backfill_hex`].
    pub fn into_tx(self) -> Result<BobTx> {
        let inputs = self
            .inputs
            .into_iter()
            .enumerate()
            .map(|(n, input)| {
                Ok(Input {
                    i: input.i,
                    tape: into_tapes(input.tape, Xput::Input(n))?,
                    e: input.e,
                    seq: input.seq,
                    raw: input.raw,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = self
            .outputs
            .into_iter()
            .enumerate()
            .map(|(n, output)| {
                Ok(Output {
                    i: output.i,
                    tape: into_tapes(output.tape, Xput::Output(n))?,
                    e: OutputExtra {
                        a: output.e.a,
                        v: output.e.v,
                        i: output.e.i.unwrap_or(output.i),
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BobTx {
            id: self.id,
            tx: self.tx,
            blk: self.blk,
            inputs,
            outputs,
            lock: self.lock,
            ver: self.ver,
        })
    }
}

fn into_tapes(tapes: Vec<TapeRecord>, xput: Xput) -> Result<Vec<Tape>> {
    tapes
        .into_iter()
        .enumerate()
        .map(|(tape, record)| {
            let cells = record
                .cell
                .into_iter()
                .enumerate()
                .map(|(cell, cell_record)| {
                    cell_record.into_cell(CellLocation { xput, tape, cell })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Tape {
                cells,
                i: record.i,
            })
        })
        .collect()
}
