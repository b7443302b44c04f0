//! Script assembly: the space-separated token form shared by the tokenizer
//! and the detokenizer.
//!
//! A token is either an opcode mnemonic (see [`crate::opcodes`]) or the
//! lowercase hex of a pushdata payload. The empty push is written `0`.

use crate::error::AsmError;
use crate::opcodes;
use bitcoin::opcodes::Opcode;
use bitcoin::script::{Instruction, PushBytesBuf};
use bitcoin::{Script, ScriptBuf};

/// Assembly token for a pushdata payload.
pub fn data_token(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "0".to_string()
    } else {
        hex::encode(bytes)
    }
}

/// Render a compiled script as its ordered assembly tokens.
pub fn decompile(script: &Script) -> Result<Vec<String>, bitcoin::script::Error> {
    script
        .instructions()
        .map(|instruction| {
            Ok(match instruction? {
                Instruction::PushBytes(bytes) => data_token(bytes.as_bytes()),
                Instruction::Op(op) => opcodes::name(op.to_u8()),
            })
        })
        .collect()
}

/// Render a compiled script as a single assembly string.
pub fn to_asm(script: &Script) -> Result<String, bitcoin::script::Error> {
    Ok(decompile(script)?.join(" "))
}

/// Compile an assembly string. Runs of spaces are tolerated.
pub fn compile(asm: &str) -> Result<ScriptBuf, AsmError> {
    let tokens: Vec<&str> = asm.split(' ').filter(|token| !token.is_empty()).collect();
    compile_tokens(&tokens)
}

/// Compile an ordered list of assembly tokens.
pub fn compile_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<ScriptBuf, AsmError> {
    let mut script = ScriptBuf::new();
    for token in tokens {
        push_token(&mut script, token.as_ref())?;
    }
    Ok(script)
}

fn push_token(script: &mut ScriptBuf, token: &str) -> Result<(), AsmError> {
    if let Some(op) = opcodes::from_name(token) {
        script.push_opcode(Opcode::from(op));
        return Ok(());
    }
    let bytes = hex::decode(token).map_err(|_| AsmError::UnknownToken(token.to_string()))?;
    let len = bytes.len();
    let push = PushBytesBuf::try_from(bytes).map_err(|_| AsmError::PushTooLarge(len))?;
    script.push_slice(push);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p2pkh_round_trip() {
        let script = ScriptBuf::from_bytes(
            hex::decode("76a9149c63715c6d1fa6c61b31d2911516e1c3db3bdfa888ac").unwrap(),
        );
        let asm = to_asm(&script).unwrap();
        assert_eq!(
            asm,
            "OP_DUP OP_HASH160 9c63715c6d1fa6c61b31d2911516e1c3db3bdfa8 OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(compile(&asm).unwrap(), script);
    }

    #[test]
    fn test_empty_push_renders_as_zero() {
        let script = ScriptBuf::from_bytes(vec![0x00, 0x6a, 0x01, 0x7c]);
        assert_eq!(decompile(&script).unwrap(), vec!["0", "OP_RETURN", "7c"]);
        assert_eq!(compile("0 OP_RETURN 7c").unwrap(), script);
        assert_eq!(compile("OP_FALSE OP_RETURN 7c").unwrap(), script);
    }

    #[test]
    fn test_large_push_uses_pushdata1() {
        let payload = vec![0xabu8; 80];
        let script = compile(&hex::encode(&payload)).unwrap();
        assert_eq!(&script.as_bytes()[..2], &[0x4c, 80]);
        assert_eq!(decompile(&script).unwrap(), vec![hex::encode(&payload)]);
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(
            compile("OP_DUP OP_BOGUS").unwrap_err(),
            AsmError::UnknownToken("OP_BOGUS".to_string())
        );
        assert_eq!(
            compile("abc").unwrap_err(),
            AsmError::UnknownToken("abc".to_string())
        );
    }

    #[test]
    fn test_truncated_push_fails_to_decompile() {
        let script = ScriptBuf::from_bytes(vec![0x6a, 0x05, 0x01]);
        assert!(decompile(&script).is_err());
    }

    #[test]
    fn test_empty_assembly() {
        assert!(compile("").unwrap().is_empty());
    }
}
