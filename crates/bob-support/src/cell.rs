use crate::asm;
use crate::config::DelimiterToken;
use crate::error::AsmError;
use crate::opcodes;
use crate::record::CellRecord;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Serialize;

/// Standard alphabet, padded on encode, padding optional on decode.
pub(crate) const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Opcode { value: u8, mnemonic: String },
    Data { hex: String, base64: String, text: String },
}

/// One script token.
///
/// `i` is the index of the owning input/output, `ii` the position of the
/// cell inside its tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "CellRecord")]
pub struct Cell {
    pub payload: Payload,
    pub i: u32,
    pub ii: u32,
}

impl Cell {
    pub fn opcode(value: u8, i: u32, ii: u32) -> Self {
        Self {
            payload: Payload::Opcode {
                value,
                mnemonic: opcodes::name(value),
            },
            i,
            ii,
        }
    }

    pub fn data(bytes: &[u8], i: u32, ii: u32) -> Self {
        Self {
            payload: Payload::Data {
                hex: hex::encode(bytes),
                base64: BASE64.encode(bytes),
                text: String::from_utf8_lossy(bytes).into_owned(),
            },
            i,
            ii,
        }
    }

    /// Classify one assembly token: a known mnemonic becomes an opcode cell,
    /// anything else must be hex pushdata.
    pub fn from_token(token: &str, i: u32, ii: u32) -> Result<Self, AsmError> {
        if let Some(op) = opcodes::from_name(token) {
            return Ok(Self::opcode(op, i, ii));
        }
        let bytes = hex::decode(token).map_err(|_| AsmError::UnknownToken(token.to_string()))?;
        Ok(Self::data(&bytes, i, ii))
    }

    pub fn is_opcode(&self) -> bool {
        matches!(self.payload, Payload::Opcode { .. })
    }

    pub fn hex(&self) -> Option<&str> {
        match &self.payload {
            Payload::Data { hex, .. } => Some(hex),
            Payload::Opcode { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Data { text, .. } => Some(text),
            Payload::Opcode { .. } => None,
        }
    }

    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.hex().and_then(|hex| hex::decode(hex).ok())
    }

    /// The assembly token this cell was read from.
    pub fn to_asm(&self) -> String {
        match &self.payload {
            Payload::Opcode { mnemonic, .. } => mnemonic.clone(),
            Payload::Data { hex, .. } if hex.is_empty() => asm::data_token(&[]),
            Payload::Data { hex, .. } => hex.clone(),
        }
    }

    pub fn matches(&self, token: &DelimiterToken) -> bool {
        match (&self.payload, token) {
            (Payload::Opcode { value, .. }, DelimiterToken::Op(op)) => value == op,
            (Payload::Data { .. }, DelimiterToken::Data(expected)) => {
                self.bytes().as_ref() == Some(expected)
            }
            _ => false,
        }
    }
}

/// An ordered group of cells between delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tape {
    #[serde(rename = "cell")]
    pub cells: Vec<Cell>,
    pub i: u32,
}

impl Tape {
    pub fn new(i: u32) -> Self {
        Self { cells: Vec::new(), i }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_cell_renderings() {
        let cell = Cell::data(b"58a597", 0, 3);
        assert_eq!(
            cell.payload,
            Payload::Data {
                hex: "353861353937".to_string(),
                base64: "NThhNTk3".to_string(),
                text: "58a597".to_string(),
            }
        );
        assert_eq!(cell.to_asm(), "353861353937");
    }

    #[test]
    fn test_from_token() {
        let op = Cell::from_token("0", 2, 0).unwrap();
        assert_eq!(
            op.payload,
            Payload::Opcode {
                value: 0,
                mnemonic: "OP_FALSE".to_string()
            }
        );
        assert_eq!(op.to_asm(), "OP_FALSE");
        assert!(Cell::from_token("zz", 0, 0).is_err());
    }

    #[test]
    fn test_invalid_utf8_text_is_lossy() {
        let cell = Cell::data(&[0xff, b'a'], 0, 0);
        assert_eq!(cell.text(), Some("\u{fffd}a"));
        assert_eq!(cell.hex(), Some("ff61"));
    }

    #[test]
    fn test_matches_delimiter() {
        let pipe = Cell::data(b"|", 0, 0);
        assert!(pipe.matches(&DelimiterToken::Data(b"|".to_vec())));
        assert!(!pipe.matches(&DelimiterToken::Op(opcodes::OP_SWAP)));
        assert!(Cell::opcode(opcodes::OP_SWAP, 0, 0).matches(&DelimiterToken::Op(0x7c)));
    }
}
