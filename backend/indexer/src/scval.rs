//! Conversion of the RPC's base64 XDR `ScVal`s into plain values.
//!
//! `getEvents` returns every topic and the event `value` as a base64 XDR
//! `ScVal`. Topics of this contract are a `Symbol` then the `u64` campaign id;
//! values are `#[contracttype]` structs, which arrive as `ScVal::Map`s keyed
//! by field name.

use serde_json::{Map, Value};
use stellar_xdr::curr::{
    AccountId, Hash, Int128Parts, Limits, PublicKey, ReadXdr, ScAddress, ScVal, UInt128Parts,
    Uint256,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValue {
    Symbol(String),
    U64(u64),
}

/// Parse a base64 XDR `ScVal`, `None` when the input is not one.
pub fn decode(b64: &str) -> Option<ScVal> {
    ScVal::from_xdr_base64(b64.trim(), Limits::none()).ok()
}

/// Decode a topic. Only `Symbol` and `u64` topics are recognised.
pub fn decode_topic(b64: &str) -> Option<TopicValue> {
    match decode(b64)? {
        ScVal::Symbol(symbol) => symbol.0.to_utf8_string().ok().map(TopicValue::Symbol),
        ScVal::U64(n) => Some(TopicValue::U64(n)),
        _ => None,
    }
}

/// Render an `ScVal` as JSON.
///
/// Maps become objects keyed by their symbol or string keys, addresses become
/// strkeys, and 128-bit integers become decimal strings so no precision is
/// lost. Kinds this contract never emits map to `null`.
pub fn to_json(val: &ScVal) -> Value {
    match val {
        ScVal::Bool(b) => Value::Bool(*b),
        ScVal::U32(n) => Value::from(*n),
        ScVal::I32(n) => Value::from(*n),
        ScVal::U64(n) => Value::from(*n),
        ScVal::I64(n) => Value::from(*n),
        ScVal::U128(UInt128Parts { hi, lo }) => {
            Value::String((((*hi as u128) << 64) | *lo as u128).to_string())
        }
        ScVal::I128(Int128Parts { hi, lo }) => {
            Value::String((((*hi as i128) << 64) | *lo as i128).to_string())
        }
        ScVal::Symbol(s) => Value::String(s.0.to_utf8_string_lossy()),
        ScVal::String(s) => Value::String(s.0.to_utf8_string_lossy()),
        ScVal::Address(address) => Value::String(strkey(address)),
        ScVal::Vec(Some(items)) => Value::Array(items.0.iter().map(to_json).collect()),
        ScVal::Map(Some(entries)) => {
            let mut object = Map::new();
            for entry in entries.0.iter() {
                if let Some(key) = key_name(&entry.key) {
                    object.insert(key, to_json(&entry.val));
                }
            }
            Value::Object(object)
        }
        _ => Value::Null,
    }
}

/// `G…` account or `C…` contract strkey of `address`.
pub fn strkey(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))) => {
            stellar_strkey::ed25519::PublicKey(*key).to_string()
        }
        ScAddress::Contract(Hash(id)) => stellar_strkey::Contract(*id).to_string(),
    }
}

fn key_name(key: &ScVal) -> Option<String> {
    match key {
        ScVal::Symbol(s) => s.0.to_utf8_string().ok(),
        ScVal::String(s) => s.0.to_utf8_string().ok(),
        _ => None,
    }
}
