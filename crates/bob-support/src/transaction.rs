//! The BOB transaction model and its conversions to and from
//! [`bitcoin::Transaction`] and the JSON wire format.

use crate::address::{input_address, output_address, AddressField};
use crate::cell::Tape;
use crate::config::BobConfig;
use crate::detokenizer::{detokenize_unlocking, Detokenizer};
use crate::error::{BobError, Result, Xput};
use crate::record::TxRecord;
use crate::tokenizer::{tokenize_unlocking, Tokenizer};
use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{deserialize_hex, serialize_hex};
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) fn default_version() -> i32 {
    1
}

fn is_default_version(ver: &i32) -> bool {
    *ver == default_version()
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHash {
    pub h: String,
}

/// Block inclusion reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blk {
    pub i: u32,
    #[serde(default)]
    pub h: String,
    #[serde(default)]
    pub t: u64,
}

/// Previous output reference of an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputExtra {
    /// Previous transaction id, display (big-endian) hex.
    pub h: String,
    /// Previous output index.
    pub i: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<AddressField>,
    /// Previous output value in satoshis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Input {
    pub i: u32,
    pub tape: Vec<Tape>,
    pub e: InputExtra,
    pub seq: u32,
    /// The single cell holds the whole unlocking script rather than one push.
    #[serde(skip_serializing_if = "is_false")]
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputExtra {
    pub a: AddressField,
    pub v: u64,
    pub i: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub i: u32,
    pub tape: Vec<Tape>,
    pub e: OutputExtra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BobTx {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tx: TxHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blk: Option<Blk>,
    #[serde(rename = "in")]
    pub inputs: Vec<Input>,
    #[serde(rename = "out")]
    pub outputs: Vec<Output>,
    pub lock: u32,
    #[serde(skip_serializing_if = "is_default_version")]
    pub ver: i32,
}

/// A rebuilt input together with what is known about the output it spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableInput {
    pub txin: TxIn,
    pub previous_value: Amount,
    /// P2PKH locking script of the spent output, when the input names an
    /// address. Any other address kind is an error.
    pub previous_script: Option<ScriptBuf>,
}

impl BobTx {
    /// Decode one BOB JSON record, repairing base64-only cells.
    pub fn from_bytes(line: &[u8]) -> Result<Self> {
        let mut record = TxRecord::from_slice(line)?;
        record.backfill_hex()?;
        record.into_tx()
    }

    pub fn from_raw_tx_hex(raw: &str, config: &BobConfig) -> Result<Self> {
        let tx: Transaction = deserialize_hex(raw.trim())?;
        Self::from_tx(&tx, config)
    }

    pub fn from_tx(tx: &Transaction, config: &BobConfig) -> Result<Self> {
        let txid = tx.compute_txid();
        debug!(
            "tokenizing {txid}: {} inputs, {} outputs",
            tx.input.len(),
            tx.output.len()
        );

        let inputs = tx
            .input
            .iter()
            .enumerate()
            .map(|(n, txin)| Input {
                i: n as u32,
                tape: tokenize_unlocking(&txin.script_sig, n as u32),
                e: InputExtra {
                    h: txin.previous_output.txid.to_string(),
                    i: txin.previous_output.vout,
                    a: Some(input_address(&txin.script_sig, config.network)),
                    v: None,
                },
                seq: txin.sequence.0,
                raw: true,
            })
            .collect();

        let tokenizer = Tokenizer::new(&config.delimiters);
        let outputs = tx
            .output
            .iter()
            .enumerate()
            .map(|(n, txout)| {
                Ok(Output {
                    i: n as u32,
                    tape: tokenizer.tokenize_script(&txout.script_pubkey, n)?,
                    e: OutputExtra {
                        a: output_address(&txout.script_pubkey, config.network),
                        v: txout.value.to_sat(),
                        i: n as u32,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BobTx {
            id: None,
            tx: TxHash { h: txid.to_string() },
            blk: None,
            inputs,
            outputs,
            lock: tx.lock_time.to_consensus_u32(),
            ver: tx.version.0,
        })
    }

    fn build_txin(&self, n: usize, input: &Input) -> Result<TxIn> {
        let xput = Xput::Input(n);
        let txid = Txid::from_str(&input.e.h).map_err(|_| BobError::PreviousTxid {
            xput,
            txid: input.e.h.clone(),
        })?;
        Ok(TxIn {
            previous_output: OutPoint::new(txid, input.e.i),
            script_sig: detokenize_unlocking(&input.tape, input.raw, n)?,
            sequence: Sequence(input.seq),
            witness: Witness::new(),
        })
    }

    /// Rebuild the native transaction.
    pub fn to_tx(&self, config: &BobConfig) -> Result<Transaction> {
        let input = self
            .inputs
            .iter()
            .enumerate()
            .map(|(n, input)| self.build_txin(n, input))
            .collect::<Result<Vec<_>>>()?;

        let detokenizer = Detokenizer::new(&config.delimiters);
        let output = self
            .outputs
            .iter()
            .enumerate()
            .map(|(n, output)| {
                Ok(TxOut {
                    value: Amount::from_sat(output.e.v),
                    script_pubkey: detokenizer.detokenize_script(&output.tape, n)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Transaction {
            version: Version(self.ver),
            lock_time: LockTime::from_consensus(self.lock),
            input,
            output,
        })
    }

    /// Rebuild the native transaction and check its id against `tx.h`.
    pub fn to_tx_verified(&self, config: &BobConfig) -> Result<Transaction> {
        let tx = self.to_tx(config)?;
        let actual = tx.compute_txid().to_string();
        if actual != self.tx.h {
            return Err(BobError::TxidMismatch {
                expected: self.tx.h.clone(),
                actual,
            });
        }
        Ok(tx)
    }

    pub fn to_raw_tx_hex(&self, config: &BobConfig) -> Result<String> {
        Ok(serialize_hex(&self.to_tx(config)?))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuilt inputs paired with their previous output value and, when an
    /// address is known, the P2PKH script that locked it.
    pub fn spendable_inputs(&self, config: &BobConfig) -> Result<Vec<SpendableInput>> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(n, input)| {
                let previous_script = match &input.e.a {
                    Some(address) => address.locking_script(config.network, Xput::Input(n))?,
                    None => None,
                };
                Ok(SpendableInput {
                    txin: self.build_txin(n, input)?,
                    previous_value: Amount::from_sat(input.e.v.unwrap_or(0)),
                    previous_script,
                })
            })
            .collect()
    }

    pub fn input_addresses(&self) -> Vec<String> {
        self.inputs
            .iter()
            .filter_map(|input| input.e.a.as_ref().and_then(AddressField::as_str))
            .map(str::to_string)
            .collect()
    }

    pub fn output_addresses(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|output| output.e.a.as_str())
            .map(str::to_string)
            .collect()
    }
}

impl FromStr for BobTx {
    type Err = BobError;

    fn from_str(line: &str) -> Result<Self> {
        Self::from_bytes(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn op_return_tx(script: &[u8]) -> Transaction {
        Transaction {
            version: Version(1),
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from_bytes(vec![0x01, 0x7c]),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::from_bytes(script.to_vec()),
            }],
        }
    }

    #[test]
    fn test_separator_tx_round_trip() {
        let config = BobConfig::default();
        let tx = op_return_tx(&[0x00, 0x6a, 0x01, 0xaa, 0x7c, 0x02, 0xbb, 0xcc, 0x7c]);
        let bob = BobTx::from_tx(&tx, &config).unwrap();
        assert_eq!(bob.outputs[0].tape.len(), 4);
        assert!(bob.outputs[0].tape[3].is_empty());
        assert_eq!(bob.to_tx(&config).unwrap(), tx);
    }

    #[test]
    fn test_version_is_omitted_when_one() {
        let config = BobConfig::default();
        let mut tx = op_return_tx(&[0x6a]);
        let json = BobTx::from_tx(&tx, &config).unwrap().to_json_string().unwrap();
        assert!(!json.contains("\"ver\""));

        tx.version = Version(2);
        let bob = BobTx::from_tx(&tx, &config).unwrap();
        let json = bob.to_json_string().unwrap();
        assert!(json.contains("\"ver\":2"));
        let reparsed: BobTx = json.parse().unwrap();
        assert_eq!(reparsed.to_tx(&config).unwrap(), tx);
    }

    #[test]
    fn test_bad_previous_txid() {
        let config = BobConfig::default();
        let mut bob = BobTx::from_tx(&op_return_tx(&[0x6a]), &config).unwrap();
        bob.inputs[0].e.h = "xyz".to_string();
        assert!(matches!(
            bob.to_tx(&config),
            Err(BobError::PreviousTxid {
                xput: Xput::Input(0),
                ..
            })
        ));
    }

    #[test]
    fn test_txid_mismatch() {
        let config = BobConfig::default();
        let mut bob = BobTx::from_tx(&op_return_tx(&[0x6a]), &config).unwrap();
        bob.to_tx_verified(&config).unwrap();
        bob.outputs[0].tape[0].cells.push(Cell::data(b"x", 0, 1));
        assert!(matches!(
            bob.to_tx_verified(&config),
            Err(BobError::TxidMismatch { .. })
        ));
    }

    #[test]
    fn test_spendable_inputs_need_a_valid_address() {
        let config = BobConfig::default();
        let mut bob = BobTx::from_tx(&op_return_tx(&[0x6a]), &config).unwrap();
        bob.inputs[0].e.a = Some(AddressField::NoAddress);
        bob.inputs[0].e.v = Some(1000);
        let spendable = bob.spendable_inputs(&config).unwrap();
        assert_eq!(spendable[0].previous_value, Amount::from_sat(1000));
        assert!(spendable[0].previous_script.is_none());

        bob.inputs[0].e.a = Some(AddressField::Address("bogus".to_string()));
        assert!(matches!(
            bob.spendable_inputs(&config),
            Err(BobError::Address { .. })
        ));
    }
}
