//! The concrete value representation passed between the value generator,
//! combination engine, and encoder.
//!
//! This is the structured form of the `sig:[args]` intermediate the design
//! describes; SPEC_FULL.md §9 explicitly allows keeping it structured
//! instead of round-tripping through text, provided the encoder produces
//! identical bytes, so [`Value::to_literal`] exists for diagnostics and
//! logging but there is no corresponding parser back from text.

use std::fmt::Write as _;

use alloy_primitives::U256;

use crate::encode::Int256;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint(U256),
    Int(Int256),
    Bool(bool),
    /// Hex string, optionally `0x`-prefixed; validated at encode time.
    Address(String),
    Str(String),
    Bytes(Vec<u8>),
    Function { address: String, selector: [u8; 4] },
    Array(Vec<Value>),
}

impl Value {
    /// Renders the JSON-ish literal form used when logging a generated
    /// argument tuple (`sig:[args]`).
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut String) {
        match self {
            Value::Uint(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Int(v) => {
                if v.negative {
                    out.push('-');
                }
                let _ = write!(out, "{}", v.magnitude);
            }
            Value::Bool(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Address(v) => {
                let _ = write!(out, "\"{v}\"");
            }
            Value::Str(v) => {
                let _ = write!(out, "\"{v}\"");
            }
            Value::Bytes(v) => {
                let _ = write!(out, "\"0x{}\"", hex::encode(v));
            }
            Value::Function { address, selector } => {
                let _ = write!(out, "\"{address}{}\"", hex::encode(selector));
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_literal(out);
                }
                out.push(']');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_literal_is_bracketed_and_comma_joined() {
        let v = Value::Array(vec![Value::Uint(U256::from(1u8)), Value::Uint(U256::from(2u8)), Value::Uint(U256::from(3u8))]);
        assert_eq!(v.to_literal(), "[1,2,3]");
    }

    #[test]
    fn string_literal_is_quoted() {
        assert_eq!(Value::Str("dave".into()).to_literal(), "\"dave\"");
    }
}
