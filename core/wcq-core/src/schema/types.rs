//! Field value types — literal parsing and bound-value validation.

use crate::error::{WcqError, WcqResult};
use serde::{Deserialize, Serialize};

/// Binary type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Ascii,
    Utf8,
    /// Raw bytes, written as hex literals.
    Bytes,
    Int32,
    BigInt,
    Boolean,
    Counter,
}

impl FieldType {
    /// Short type name reported in result metadata.
    pub fn short_name(&self) -> &'static str {
        match self {
            FieldType::Ascii => "AsciiType",
            FieldType::Utf8 => "UTF8Type",
            FieldType::Bytes => "BytesType",
            FieldType::Int32 => "Int32Type",
            FieldType::BigInt => "LongType",
            FieldType::Boolean => "BooleanType",
            FieldType::Counter => "CounterColumnType",
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self, FieldType::Counter)
    }

    /// Parses a literal term into its binary form.
    pub fn from_text(&self, field: &str, text: &str) -> WcqResult<Vec<u8>> {
        let invalid = |message: String| WcqError::InvalidTerm {
            field: field.to_string(),
            message,
        };
        match self {
            FieldType::Ascii => {
                if !text.is_ascii() {
                    return Err(invalid(format!("'{text}' is not valid ascii")));
                }
                Ok(text.as_bytes().to_vec())
            }
            FieldType::Utf8 => Ok(text.as_bytes().to_vec()),
            FieldType::Bytes => decode_hex(text).ok_or_else(|| invalid(format!("'{text}' is not a hex string"))),
            FieldType::Int32 => text
                .parse::<i32>()
                .map(|v| v.to_be_bytes().to_vec())
                .map_err(|e| invalid(format!("'{text}': {e}"))),
            FieldType::BigInt | FieldType::Counter => text
                .parse::<i64>()
                .map(|v| v.to_be_bytes().to_vec())
                .map_err(|e| invalid(format!("'{text}': {e}"))),
            FieldType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(vec![1]),
                "false" => Ok(vec![0]),
                _ => Err(invalid(format!("'{text}' is not a boolean"))),
            },
        }
    }

    /// Byte-comparable form of a value stored inside a cell name.
    ///
    /// Signed integers get their sign bit flipped so that negative values
    /// sort before positive ones; every other type is already comparable.
    pub fn to_comparable(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            FieldType::Int32 | FieldType::BigInt | FieldType::Counter => flip_sign(bytes),
            _ => bytes.to_vec(),
        }
    }

    /// Inverse of [`to_comparable`](Self::to_comparable).
    pub fn from_comparable(&self, bytes: &[u8]) -> Vec<u8> {
        self.to_comparable(bytes)
    }

    /// Checks a bound (already binary) value.
    pub fn validate(&self, field: &str, bytes: &[u8]) -> WcqResult<()> {
        let invalid = |message: String| WcqError::InvalidTerm {
            field: field.to_string(),
            message,
        };
        match self {
            FieldType::Bytes => Ok(()),
            FieldType::Ascii if !bytes.is_ascii() => Err(invalid("value is not ascii".to_string())),
            FieldType::Ascii => Ok(()),
            FieldType::Utf8 => std::str::from_utf8(bytes)
                .map(|_| ())
                .map_err(|e| invalid(e.to_string())),
            FieldType::Int32 if bytes.len() != 4 && !bytes.is_empty() => Err(invalid(format!(
                "expected 4 bytes for an int, got {}",
                bytes.len()
            ))),
            FieldType::BigInt | FieldType::Counter if bytes.len() != 8 && !bytes.is_empty() => {
                Err(invalid(format!("expected 8 bytes for a long, got {}", bytes.len())))
            }
            FieldType::Boolean if bytes.len() > 1 => Err(invalid(format!(
                "expected at most 1 byte for a boolean, got {}",
                bytes.len()
            ))),
            FieldType::Int32 | FieldType::BigInt | FieldType::Counter | FieldType::Boolean => Ok(()),
        }
    }
}

// empty stays empty
fn flip_sign(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    if let Some(first) = out.first_mut() {
        *first ^= 0x80;
    }
    out
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
        .as_bytes();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}
