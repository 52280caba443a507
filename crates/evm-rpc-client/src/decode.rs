//! Helpers for reading decoded contract outputs
//!
//! Clients may return tuples either as JSON objects keyed by output name or
//! as positional arrays, and integers either as JSON numbers or as strings
//! (decimal or `0x` hex). These helpers accept all of those forms.

use lb_core::{Address, ChainError};
use serde_json::Value;

use crate::Result;

/// Get a tuple member by name, falling back to its position
pub fn field<'a>(value: &'a Value, name: &str, index: usize) -> Result<&'a Value> {
    let found = match value {
        Value::Object(map) => map.get(name),
        Value::Array(items) => items.get(index),
        _ => None,
    };
    found.ok_or_else(|| ChainError::Decode(format!("missing field '{}' (index {})", name, index)))
}

pub fn as_u128(value: &Value) -> Result<u128> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ChainError::Decode(format!("not an unsigned integer: {}", n))),
        Value::String(s) => parse_u128(s),
        other => Err(ChainError::Decode(format!(
            "expected integer, found {}",
            other
        ))),
    }
}

pub fn as_u64(value: &Value) -> Result<u64> {
    let n = as_u128(value)?;
    u64::try_from(n).map_err(|_| ChainError::Decode(format!("{} does not fit in u64", n)))
}

pub fn as_u32(value: &Value) -> Result<u32> {
    let n = as_u128(value)?;
    u32::try_from(n).map_err(|_| ChainError::Decode(format!("{} does not fit in u32", n)))
}

pub fn as_bool(value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| ChainError::Decode(format!("expected bool, found {}", value)))
}

pub fn as_address(value: &Value) -> Result<Address> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("expected address, found {}", value)))?;
    Address::parse(s).map_err(|e| ChainError::Decode(e.to_string()))
}

pub fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ChainError::Decode(format!("expected array, found {}", value)))
}

pub fn as_u128_vec(value: &Value) -> Result<Vec<u128>> {
    as_array(value)?.iter().map(as_u128).collect()
}

pub fn as_address_vec(value: &Value) -> Result<Vec<Address>> {
    as_array(value)?.iter().map(as_address).collect()
}

fn parse_u128(s: &str) -> Result<u128> {
    let parsed = match s.strip_prefix("0x") {
        Some(digits) => u128::from_str_radix(digits, 16),
        None => s.parse::<u128>(),
    };
    parsed.map_err(|e| ChainError::Decode(format!("invalid integer '{}': {}", s, e)))
}
