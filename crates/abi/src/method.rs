//! Method descriptor: name, input/output types, canonical signature,
//! 4-byte selector, and calldata composition.

use alloy_primitives::keccak256;

use crate::encode::EncodeError;
use crate::packer::encode_tuple;
use crate::types::TypeDescriptor;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Method {
    /// Empty name is reserved for the constructor.
    pub name: String,
    pub inputs: Vec<(String, TypeDescriptor)>,
    pub outputs: Vec<(String, TypeDescriptor)>,
    pub constant: bool,
}

impl Method {
    /// `name(t1,t2,…)` using each input's canonical type string.
    pub fn canonical_signature(&self) -> String {
        let args = self.inputs.iter().map(|(_, t)| t.canonical()).collect::<Vec<_>>().join(",");
        format!("{}({args})", self.name)
    }

    /// First 4 bytes of `Keccak256(signature)`. Callers must not call this
    /// on a constructor (empty name) — constructors have no selector.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.canonical_signature().as_bytes());
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash[..4]);
        out
    }

    /// Selector (unless this is a constructor) followed by head/tail
    /// encoded arguments.
    pub fn encode_call(&self, values: &[Value]) -> Result<Vec<u8>, EncodeError> {
        if values.len() != self.inputs.len() {
            return Err(EncodeError::ArgCountMismatch { got: values.len(), expected: self.inputs.len() });
        }
        let items: Vec<(TypeDescriptor, Value)> =
            self.inputs.iter().zip(values).map(|((_, t), v)| (t.clone(), v.clone())).collect();
        let encoded_args = encode_tuple(&items)?;
        if self.name.is_empty() {
            return Ok(encoded_args);
        }
        let mut out = Vec::with_capacity(4 + encoded_args.len());
        out.extend_from_slice(&self.selector());
        out.extend_from_slice(&encoded_args);
        Ok(out)
    }

    pub fn is_constructor(&self) -> bool {
        self.name.is_empty()
    }
}
