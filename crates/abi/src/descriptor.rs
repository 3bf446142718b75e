//! Parses the ABI JSON array into the method/event/constructor descriptor.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::method::Method;
use crate::types::{TypeDescriptor, TypeParseError};

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    entry_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
}

fn default_entry_type() -> String {
    "function".to_owned()
}

#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    /// `(name, type, indexed)` per input.
    pub inputs: Vec<(String, TypeDescriptor, bool)>,
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AbiDescriptor {
    pub constructor: Option<Method>,
    pub methods: IndexMap<String, Method>,
    pub events: IndexMap<String, Event>,
}

#[derive(Debug, Error)]
pub enum AbiParseError {
    #[error("malformed ABI JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed type in ABI entry: {0}")]
    Type(#[from] TypeParseError),
}

impl AbiDescriptor {
    pub fn parse(json_text: &str) -> Result<Self, AbiParseError> {
        let entries: Vec<RawEntry> = serde_json::from_str(json_text)?;
        let mut descriptor = AbiDescriptor::default();

        for entry in entries {
            let entry_type = if entry.entry_type.is_empty() { "function".to_owned() } else { entry.entry_type };
            match entry_type.as_str() {
                "constructor" => {
                    let method = Method {
                        name: String::new(),
                        inputs: parse_params(&entry.inputs)?,
                        outputs: Vec::new(),
                        constant: false,
                    };
                    descriptor.constructor = Some(method);
                }
                "event" => {
                    let inputs = entry
                        .inputs
                        .iter()
                        .map(|p| Ok((p.name.clone(), TypeDescriptor::parse(&p.ty)?, p.indexed)))
                        .collect::<Result<Vec<_>, TypeParseError>>()?;
                    descriptor.events.insert(entry.name.clone(), Event { name: entry.name, inputs, anonymous: entry.anonymous });
                }
                // "function", "fallback", and any other/absent type are
                // treated as callable functions (S6's default rule); the
                // fuzz driver separately excludes "fallback" from the
                // eligible call set (SPEC_FULL.md §9 supplement).
                _ => {
                    let method = Method {
                        name: entry.name.clone(),
                        inputs: parse_params(&entry.inputs)?,
                        outputs: parse_params(&entry.outputs)?,
                        constant: entry.constant,
                    };
                    if descriptor.methods.contains_key(&entry.name) {
                        tracing::warn!(method = %entry.name, "duplicate method name in ABI, last entry wins");
                    }
                    descriptor.methods.insert(entry.name, method);
                }
            }
        }

        Ok(descriptor)
    }

    /// Every callable function entry, excluding the constructor and
    /// anything whose name marks it a fallback (empty name among the
    /// `methods` map never occurs: constructors live in `constructor`).
    pub fn callable_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values().filter(|m| m.name != "fallback")
    }
}

fn parse_params(params: &[RawParam]) -> Result<Vec<(String, TypeDescriptor)>, TypeParseError> {
    params.iter().map(|p| Ok((p.name.clone(), TypeDescriptor::parse(&p.ty)?))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_type_field_defaults_to_function() {
        let json = r#"[{"name":"get","inputs":[],"outputs":[{"name":"","type":"uint256"}]}]"#;
        let descriptor = AbiDescriptor::parse(json).unwrap();
        let get = descriptor.methods.get("get").expect("get() should be parsed as a function");
        assert_eq!(get.canonical_signature(), "get()");
        assert_eq!(get.selector().len(), 4);
    }

    #[test]
    fn constructor_and_events_are_parsed_separately() {
        let json = r#"[
            {"type":"constructor","inputs":[{"name":"x","type":"uint256"}]},
            {"type":"event","name":"Transfer","inputs":[{"name":"from","type":"address","indexed":true}]}
        ]"#;
        let descriptor = AbiDescriptor::parse(json).unwrap();
        assert!(descriptor.constructor.is_some());
        assert!(descriptor.methods.is_empty());
        assert_eq!(descriptor.events.len(), 1);
        assert!(descriptor.events["Transfer"].inputs[0].2);
    }

    #[test]
    fn duplicate_method_names_last_one_wins() {
        let json = r#"[
            {"type":"function","name":"foo","inputs":[{"name":"a","type":"uint256"}]},
            {"type":"function","name":"foo","inputs":[{"name":"a","type":"bool"}]}
        ]"#;
        let descriptor = AbiDescriptor::parse(json).unwrap();
        assert_eq!(descriptor.methods["foo"].canonical_signature(), "foo(bool)");
    }
}
