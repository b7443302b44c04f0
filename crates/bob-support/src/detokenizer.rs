//! Encode direction: tapes -> script.

use crate::asm;
use crate::cell::{Cell, Tape};
use crate::config::Delimiters;
use crate::error::{AsmError, BobError, Result, Xput};
use bitcoin::ScriptBuf;

pub struct Detokenizer<'a> {
    delimiters: &'a Delimiters,
}

impl<'a> Detokenizer<'a> {
    pub fn new(delimiters: &'a Delimiters) -> Self {
        Self { delimiters }
    }

    /// Rebuild the assembly tokens of a locking script.
    ///
    /// Tapes are visited in index order. A separator is written in front of
    /// every tape after the first data tape; the first data tape is tape 1
    /// when tape 0 is the `OP_FALSE OP_RETURN` / `OP_RETURN` prefix and tape 0
    /// otherwise. Empty tapes still get their separator, so a script ending on
    /// a separator comes back intact.
    pub fn detokenize(&self, tapes: &[Tape]) -> Vec<String> {
        let mut ordered: Vec<&Tape> = tapes.iter().collect();
        ordered.sort_by_key(|tape| tape.i);

        let first_data = match ordered.first() {
            Some(tape) if self.is_prefix(tape) => 1,
            _ => 0,
        };

        let mut tokens = Vec::new();
        for (position, tape) in ordered.iter().enumerate() {
            if position > first_data {
                tokens.push(self.delimiters.separator.to_asm());
            }
            tokens.extend(tape.cells.iter().map(Cell::to_asm));
        }
        tokens
    }

    pub fn to_asm(&self, tapes: &[Tape]) -> String {
        self.detokenize(tapes).join(" ")
    }

    /// Compile the tapes of output `index` back into its locking script.
    pub fn detokenize_script(&self, tapes: &[Tape], index: usize) -> Result<ScriptBuf> {
        asm::compile(&self.to_asm(tapes)).map_err(|source| BobError::Compile {
            xput: Xput::Output(index),
            source,
        })
    }

    fn is_prefix(&self, tape: &Tape) -> bool {
        match tape.cells.as_slice() {
            [op_false, op_return] => {
                op_false.matches(&self.delimiters.op_false)
                    && op_return.matches(&self.delimiters.op_return)
            }
            [op_return] => op_return.matches(&self.delimiters.op_return),
            _ => false,
        }
    }
}

/// Rebuild the unlocking script of input `index`.
///
/// Cells are compiled as assembly, one push per data cell, the way indexers
/// record inputs. When `raw` is set the input was decoded from a native
/// transaction and its single data cell is the whole script, used verbatim.
pub fn detokenize_unlocking(tapes: &[Tape], raw: bool, index: usize) -> Result<ScriptBuf> {
    let xput = Xput::Input(index);
    let tape = tapes.first().ok_or(BobError::MissingTape(xput))?;
    match tape.cells.as_slice() {
        [] => Err(BobError::MissingCell(xput)),
        [cell] if raw && !cell.is_opcode() => {
            let bytes = cell.bytes().ok_or_else(|| BobError::Compile {
                xput,
                source: AsmError::UnknownToken(cell.to_asm()),
            })?;
            Ok(ScriptBuf::from_bytes(bytes))
        }
        cells => {
            let tokens: Vec<String> = cells.iter().map(Cell::to_asm).collect();
            asm::compile_tokens(&tokens).map_err(|source| BobError::Compile { xput, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelimiterToken;
    use crate::tokenizer::Tokenizer;

    fn round_trip(asm: &str) -> String {
        let delimiters = Delimiters::default();
        let tokens: Vec<&str> = asm.split(' ').filter(|t| !t.is_empty()).collect();
        let tapes = Tokenizer::new(&delimiters).tokenize(&tokens, 0).unwrap();
        Detokenizer::new(&delimiters).to_asm(&tapes)
    }

    #[test]
    fn test_separator_reinserted_from_third_tape() {
        assert_eq!(
            round_trip("OP_FALSE OP_RETURN aa bb OP_SWAP cc OP_SWAP dd"),
            "OP_FALSE OP_RETURN aa bb OP_SWAP cc OP_SWAP dd"
        );
    }

    #[test]
    fn test_zero_prefix_comes_back_as_op_false() {
        assert_eq!(round_trip("0 OP_RETURN aa"), "OP_FALSE OP_RETURN aa");
    }

    #[test]
    fn test_scripts_without_prefix() {
        assert_eq!(round_trip("aa OP_SWAP bb"), "aa OP_SWAP bb");
        assert_eq!(
            round_trip("OP_DUP OP_HASH160 aa OP_EQUALVERIFY OP_CHECKSIG"),
            "OP_DUP OP_HASH160 aa OP_EQUALVERIFY OP_CHECKSIG"
        );
    }

    #[test]
    fn test_empty_tapes_keep_their_separators() {
        assert_eq!(
            round_trip("OP_FALSE OP_RETURN aa OP_SWAP"),
            "OP_FALSE OP_RETURN aa OP_SWAP"
        );
        assert_eq!(
            round_trip("OP_RETURN OP_SWAP OP_SWAP aa"),
            "OP_RETURN OP_SWAP OP_SWAP aa"
        );
    }

    #[test]
    fn test_tapes_are_visited_in_index_order() {
        let delimiters = Delimiters::default();
        let mut tapes = Tokenizer::new(&delimiters)
            .tokenize(&["OP_RETURN", "aa", "OP_SWAP", "bb"], 0)
            .unwrap();
        tapes.reverse();
        assert_eq!(
            Detokenizer::new(&delimiters).to_asm(&tapes),
            "OP_RETURN aa OP_SWAP bb"
        );
    }

    #[test]
    fn test_alternative_separator_is_emitted() {
        let delimiters = Delimiters::default().with_separator(DelimiterToken::Data(b"|".to_vec()));
        let tapes = Tokenizer::new(&delimiters)
            .tokenize(&["0", "OP_RETURN", "aa", "7c", "bb"], 0)
            .unwrap();
        let script = Detokenizer::new(&delimiters)
            .detokenize_script(&tapes, 0)
            .unwrap();
        assert_eq!(hex::encode(script.as_bytes()), "006a01aa017c01bb");
    }

    #[test]
    fn test_unknown_mnemonic_fails_to_compile() {
        let delimiters = Delimiters::default();
        let tapes = vec![Tape {
            cells: vec![Cell {
                payload: crate::cell::Payload::Opcode {
                    value: 0xff,
                    mnemonic: "OP_NOT_A_THING".to_string(),
                },
                i: 4,
                ii: 0,
            }],
            i: 0,
        }];
        let err = Detokenizer::new(&delimiters)
            .detokenize_script(&tapes, 4)
            .unwrap_err();
        assert!(matches!(
            err,
            BobError::Compile {
                xput: Xput::Output(4),
                source: AsmError::UnknownToken(_)
            }
        ));
    }

    #[test]
    fn test_unlocking_requires_a_cell() {
        assert!(matches!(
            detokenize_unlocking(&[], true, 2),
            Err(BobError::MissingTape(Xput::Input(2)))
        ));
        assert!(matches!(
            detokenize_unlocking(&[Tape::new(0)], false, 1),
            Err(BobError::MissingCell(Xput::Input(1)))
        ));
    }

    #[test]
    fn test_raw_unlocking_cell_is_verbatim() {
        let raw = hex::decode("0201ff21aa").unwrap();
        let tapes = vec![Tape {
            cells: vec![Cell::data(&raw, 0, 0)],
            i: 0,
        }];
        assert_eq!(
            detokenize_unlocking(&tapes, true, 0).unwrap().as_bytes(),
            &raw[..]
        );
    }

    #[test]
    fn test_unlocking_per_push_cells_are_compiled() {
        let tapes = vec![Tape {
            cells: vec![Cell::data(&[0xaa; 3], 0, 0), Cell::data(&[0xbb; 2], 0, 1)],
            i: 0,
        }];
        assert_eq!(
            hex::encode(detokenize_unlocking(&tapes, false, 0).unwrap().as_bytes()),
            "03aaaaaa02bbbb"
        );
    }

    #[test]
    fn test_unlocking_single_push_gets_its_prefix() {
        let signature = [0x30; 71];
        let tapes = vec![Tape {
            cells: vec![Cell::data(&signature, 0, 0)],
            i: 0,
        }];
        let script = detokenize_unlocking(&tapes, false, 0).unwrap();
        assert_eq!(script.len(), 72);
        assert_eq!(script.as_bytes()[0], 0x47);
        assert_eq!(&script.as_bytes()[1..], &signature[..]);
    }
}
