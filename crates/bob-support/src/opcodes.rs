//! Bitcoin SV opcode mnemonics.
//!
//! Names follow the BSV assembly convention (`OP_FALSE`, `OP_1`..`OP_16`,
//! `OP_NOP2` for 0xb1, `OP_CAT`/`OP_SPLIT` re-enabled). Bytes without a
//! defined opcode render as `OP_UNKNOWN<n>` so that every script byte has an
//! assembly form that parses back to itself.

pub const OP_FALSE: u8 = 0x00;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_SWAP: u8 = 0x7c;

const UNKNOWN_PREFIX: &str = "OP_UNKNOWN";

/// Canonical mnemonic for a defined opcode.
///
/// Direct pushes (0x01..=0x4b) have no mnemonic: they only ever appear as
/// hex pushdata in assembly.
pub fn canonical(op: u8) -> Option<&'static str> {
    let name = match op {
        0x00 => "OP_FALSE",
        0x4c => "OP_PUSHDATA1",
        0x4d => "OP_PUSHDATA2",
        0x4e => "OP_PUSHDATA4",
        0x4f => "OP_1NEGATE",
        0x50 => "OP_RESERVED",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        0x60 => "OP_16",
        0x61 => "OP_NOP",
        0x62 => "OP_VER",
        0x63 => "OP_IF",
        0x64 => "OP_NOTIF",
        0x65 => "OP_VERIF",
        0x66 => "OP_VERNOTIF",
        0x67 => "OP_ELSE",
        0x68 => "OP_ENDIF",
        0x69 => "OP_VERIFY",
        0x6a => "OP_RETURN",
        0x6b => "OP_TOALTSTACK",
        0x6c => "OP_FROMALTSTACK",
        0x6d => "OP_2DROP",
        0x6e => "OP_2DUP",
        0x6f => "OP_3DUP",
        0x70 => "OP_2OVER",
        0x71 => "OP_2ROT",
        0x72 => "OP_2SWAP",
        0x73 => "OP_IFDUP",
        0x74 => "OP_DEPTH",
        0x75 => "OP_DROP",
        0x76 => "OP_DUP",
        0x77 => "OP_NIP",
        0x78 => "OP_OVER",
        0x79 => "OP_PICK",
        0x7a => "OP_ROLL",
        0x7b => "OP_ROT",
        0x7c => "OP_SWAP",
        0x7d => "OP_TUCK",
        0x7e => "OP_CAT",
        0x7f => "OP_SPLIT",
        0x80 => "OP_NUM2BIN",
        0x81 => "OP_BIN2NUM",
        0x82 => "OP_SIZE",
        0x83 => "OP_INVERT",
        0x84 => "OP_AND",
        0x85 => "OP_OR",
        0x86 => "OP_XOR",
        0x87 => "OP_EQUAL",
        0x88 => "OP_EQUALVERIFY",
        0x89 => "OP_RESERVED1",
        0x8a => "OP_RESERVED2",
        0x8b => "OP_1ADD",
        0x8c => "OP_1SUB",
        0x8d => "OP_2MUL",
        0x8e => "OP_2DIV",
        0x8f => "OP_NEGATE",
        0x90 => "OP_ABS",
        0x91 => "OP_NOT",
        0x92 => "OP_0NOTEQUAL",
        0x93 => "OP_ADD",
        0x94 => "OP_SUB",
        0x95 => "OP_MUL",
        0x96 => "OP_DIV",
        0x97 => "OP_MOD",
        0x98 => "OP_LSHIFT",
        0x99 => "OP_RSHIFT",
        0x9a => "OP_BOOLAND",
        0x9b => "OP_BOOLOR",
        0x9c => "OP_NUMEQUAL",
        0x9d => "OP_NUMEQUALVERIFY",
        0x9e => "OP_NUMNOTEQUAL",
        0x9f => "OP_LESSTHAN",
        0xa0 => "OP_GREATERTHAN",
        0xa1 => "OP_LESSTHANOREQUAL",
        0xa2 => "OP_GREATERTHANOREQUAL",
        0xa3 => "OP_MIN",
        0xa4 => "OP_MAX",
        0xa5 => "OP_WITHIN",
        0xa6 => "OP_RIPEMD160",
        0xa7 => "OP_SHA1",
        0xa8 => "OP_SHA256",
        0xa9 => "OP_HASH160",
        0xaa => "OP_HASH256",
        0xab => "OP_CODESEPARATOR",
        0xac => "OP_CHECKSIG",
        0xad => "OP_CHECKSIGVERIFY",
        0xae => "OP_CHECKMULTISIG",
        0xaf => "OP_CHECKMULTISIGVERIFY",
        0xb0 => "OP_NOP1",
        0xb1 => "OP_NOP2",
        0xb2 => "OP_NOP3",
        0xb3 => "OP_NOP4",
        0xb4 => "OP_NOP5",
        0xb5 => "OP_NOP6",
        0xb6 => "OP_NOP7",
        0xb7 => "OP_NOP8",
        0xb8 => "OP_NOP9",
        0xb9 => "OP_NOP10",
        0xfa => "OP_SMALLINTEGER",
        0xfb => "OP_PUBKEYS",
        0xfd => "OP_PUBKEYHASH",
        0xfe => "OP_PUBKEY",
        0xff => "OP_INVALIDOPCODE",
        _ => return None,
    };
    Some(name)
}

/// Mnemonic used when rendering `op` as an assembly token.
pub fn name(op: u8) -> String {
    match canonical(op) {
        Some(name) => name.to_string(),
        None => format!("{UNKNOWN_PREFIX}{op}"),
    }
}

/// Resolve an assembly token to its opcode byte.
///
/// Returns `None` for anything that is not a mnemonic, which callers treat
/// as hex pushdata.
pub fn from_name(token: &str) -> Option<u8> {
    let aliased = match token {
        "0" | "OP_0" => Some(OP_FALSE),
        "-1" => Some(0x4f),
        "OP_TRUE" => Some(OP_1),
        "OP_CHECKLOCKTIMEVERIFY" => Some(0xb1),
        "OP_CHECKSEQUENCEVERIFY" => Some(0xb2),
        _ => None,
    };
    if aliased.is_some() {
        return aliased;
    }
    if !token.starts_with("OP_") {
        return None;
    }
    if let Some(op) = (0..=u8::MAX).find(|op| canonical(*op) == Some(token)) {
        return Some(op);
    }
    token
        .strip_prefix(UNKNOWN_PREFIX)
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|op| canonical(*op).is_none() && !is_direct_push(*op))
}

/// True for 0x01..=0x4b, the opcodes that push their own length in bytes.
pub fn is_direct_push(op: u8) -> bool {
    (0x01..=0x4b).contains(&op)
}
