//! Decode direction: script -> tapes.

use crate::asm;
use crate::cell::{Cell, Tape};
use crate::config::Delimiters;
use crate::error::{AsmError, BobError, Result, Xput};
use bitcoin::Script;
use log::trace;

pub struct Tokenizer<'a> {
    delimiters: &'a Delimiters,
}

impl<'a> Tokenizer<'a> {
    pub fn new(delimiters: &'a Delimiters) -> Self {
        Self { delimiters }
    }

    /// Split the assembly tokens of a locking script into tapes.
    ///
    /// A leading `OP_FALSE OP_RETURN` (or a lone `OP_RETURN`) becomes tape 0.
    /// Each separator closes the current tape without being stored. The last
    /// tape is always emitted, even when empty, so the result is never empty.
    pub fn tokenize<S: AsRef<str>>(
        &self,
        tokens: &[S],
        index: u32,
    ) -> std::result::Result<Vec<Tape>, AsmError> {
        let mut tapes = Vec::new();
        let offset = self.prefix_len(tokens);
        if offset > 0 {
            let mut prefix = Tape::new(0);
            for (ii, token) in tokens[..offset].iter().enumerate() {
                prefix
                    .cells
                    .push(Cell::from_token(token.as_ref(), index, ii as u32)?);
            }
            tapes.push(prefix);
        }

        let mut current = Tape::new(tapes.len() as u32);
        for token in &tokens[offset..] {
            let token = token.as_ref();
            if self.delimiters.separator.matches(token) {
                let next = Tape::new(current.i + 1);
                tapes.push(std::mem::replace(&mut current, next));
                continue;
            }
            let ii = current.cells.len() as u32;
            current.cells.push(Cell::from_token(token, index, ii)?);
        }
        tapes.push(current);
        Ok(tapes)
    }

    /// Decompile and tokenize the locking script of output `index`.
    pub fn tokenize_script(&self, script: &Script, index: usize) -> Result<Vec<Tape>> {
        let xput = Xput::Output(index);
        let tokens =
            asm::decompile(script).map_err(|source| BobError::Decompile { xput, source })?;
        let tapes = self
            .tokenize(&tokens, index as u32)
            .map_err(|source| BobError::Compile { xput, source })?;
        trace!("{xput}: {} tokens in {} tapes", tokens.len(), tapes.len());
        Ok(tapes)
    }

    fn prefix_len<S: AsRef<str>>(&self, tokens: &[S]) -> usize {
        let first = tokens.first().map(AsRef::as_ref);
        let second = tokens.get(1).map(AsRef::as_ref);
        match (first, second) {
            (Some(a), Some(b))
                if self.delimiters.op_false.matches(a) && self.delimiters.op_return.matches(b) =>
            {
                2
            }
            (Some(a), _) if self.delimiters.op_return.matches(a) => 1,
            _ => 0,
        }
    }
}

/// Unlocking scripts are never split: one tape holding one cell with the
/// whole script.
pub fn tokenize_unlocking(script: &Script, index: u32) -> Vec<Tape> {
    vec![Tape {
        cells: vec![Cell::data(script.as_bytes(), index, 0)],
        i: 0,
    }]
}
