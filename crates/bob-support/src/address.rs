//! Address strings carried in the `e.a` field of inputs and outputs.

use crate::error::{BobError, Result, Xput};
use bitcoin::address::{AddressType, NetworkUnchecked};
use bitcoin::script::Instruction;
use bitcoin::{Address, Network, PublicKey, Script, ScriptBuf};
use log::debug;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Resolved address, or the `false` sentinel for scripts that are not
/// pay-to-public-key-hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressField {
    Address(String),
    #[default]
    NoAddress,
}

impl AddressField {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AddressField::Address(address) => Some(address),
            AddressField::NoAddress => None,
        }
    }

    /// P2PKH locking script paying this address. Other address kinds are an
    /// error.
    pub fn locking_script(&self, network: Network, xput: Xput) -> Result<Option<ScriptBuf>> {
        let Some(address) = self.as_str() else {
            return Ok(None);
        };
        let invalid = |reason: String| BobError::Address {
            xput,
            address: address.to_string(),
            reason,
        };
        let unchecked: Address<NetworkUnchecked> =
            address.parse().map_err(|e| invalid(format!("{e}")))?;
        let checked = unchecked
            .require_network(network)
            .map_err(|e| invalid(format!("{e}")))?;
        if checked.address_type() != Some(AddressType::P2pkh) {
            return Err(invalid("not a pay-to-public-key-hash address".to_string()));
        }
        Ok(Some(checked.script_pubkey()))
    }
}

impl Serialize for AddressField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AddressField::Address(address) => serializer.serialize_str(address),
            AddressField::NoAddress => serializer.serialize_bool(false),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Text(String),
    Flag(bool),
}

impl<'de> Deserialize<'de> for AddressField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match AddressRepr::deserialize(deserializer)? {
            AddressRepr::Text(text) if text.is_empty() || text == "false" => {
                Ok(AddressField::NoAddress)
            }
            AddressRepr::Text(text) => Ok(AddressField::Address(text)),
            AddressRepr::Flag(false) => Ok(AddressField::NoAddress),
            AddressRepr::Flag(true) => Err(de::Error::custom(
                "address must be a string or false",
            )),
        }
    }
}

/// Address of a P2PKH locking script; anything else gets the sentinel.
pub fn output_address(script: &Script, network: Network) -> AddressField {
    if !script.is_p2pkh() {
        return AddressField::NoAddress;
    }
    match Address::from_script(script, network) {
        Ok(address) => AddressField::Address(address.to_string()),
        Err(e) => {
            debug!("no address for p2pkh-shaped script: {e}");
            AddressField::NoAddress
        }
    }
}

/// Spender address of a `<sig> <pubkey>` unlocking script.
pub fn input_address(script_sig: &Script, network: Network) -> AddressField {
    let mut pushes = Vec::new();
    for instruction in script_sig.instructions() {
        match instruction {
            Ok(Instruction::PushBytes(bytes)) if !bytes.is_empty() => pushes.push(bytes),
            _ => return AddressField::NoAddress,
        }
    }
    match pushes.as_slice() {
        [_signature, pubkey] => match PublicKey::from_slice(pubkey.as_bytes()) {
            Ok(pubkey) => AddressField::Address(
                Address::p2pkh(pubkey.pubkey_hash(), network).to_string(),
            ),
            Err(_) => AddressField::NoAddress,
        },
        _ => AddressField::NoAddress,
    }
}
