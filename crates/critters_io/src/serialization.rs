//! JSON and HexDNA helpers.
//!
//! HexDNA is the base16 encoding of a value's JSON form; it is how single
//! genomes are exported and pasted back in.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    Ok(serde_json::to_string(data)?)
}

/// Deserializes data from a JSON string. Blank input is rejected before
/// parsing.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::Empty("JSON document"));
    }
    Ok(serde_json::from_str(json)?)
}

/// Serializes data to HexDNA.
pub fn to_hex_dna<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    let json = to_json(data)?;
    Ok(hex::encode(json.as_bytes()))
}

/// Deserializes data from HexDNA.
///
/// Surrounding whitespace is ignored so pasted strings work.
pub fn from_hex_dna<T>(hex_str: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let trimmed = hex_str.trim();
    if trimmed.is_empty() {
        return Err(IoError::Empty("HexDNA string"));
    }

    let bytes = hex::decode(trimmed)
        .map_err(|e| IoError::hex_dna(format!("not base16: {}", e)))?;

    let json = String::from_utf8(bytes)
        .map_err(|e| IoError::hex_dna(format!("not UTF-8: {}", e)))?;

    from_json(&json)
}
