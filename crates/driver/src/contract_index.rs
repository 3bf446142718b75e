//! Per-contract `innerCalls` and `abiSelectors` indices (§4.7.2), built once
//! per contract from its `.bin.sig`/`.abi.sig` files and read-only for the
//! duration of that contract's rounds.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractIndexError {
    #[error("failed to read `{path}`: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("malformed selector hex on line {line} of `{path}`: `{text}`")]
    MalformedSelector { path: String, line: usize, text: String },
}

/// `innerCalls[selector] -> [selector, …]` and `abiSelectors[signature] ->
/// selector`, scoped to a single contract.
#[derive(Debug, Clone, Default)]
pub struct ContractIndex {
    inner_calls: HashMap<[u8; 4], Vec<[u8; 4]>>,
    abi_selectors: HashMap<String, [u8; 4]>,
}

impl ContractIndex {
    pub fn inner_calls_for(&self, selector: [u8; 4]) -> &[[u8; 4]] {
        self.inner_calls.get(&selector).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selector_for_signature(&self, signature: &str) -> Option<[u8; 4]> {
        self.abi_selectors.get(signature).copied()
    }

    /// Loads `<contract>.bin.sig` from `bin_sigs_dir` and `<contract>.abi.sig`
    /// from `abi_sigs_dir`. Either file is optional: a contract with no
    /// bytecode-level inner-call data still gets an (empty) index.
    pub fn load(contract: &str, bin_sigs_dir: &Path, abi_sigs_dir: &Path) -> Result<Self, ContractIndexError> {
        let inner_calls = load_selector_to_selectors(&bin_sigs_dir.join(format!("{contract}.bin.sig")))?;
        let abi_selectors = load_signature_to_selector(&abi_sigs_dir.join(format!("{contract}.abi.sig")))?;
        Ok(Self { inner_calls, abi_selectors })
    }
}

fn load_selector_to_selectors(path: &Path) -> Result<HashMap<[u8; 4], Vec<[u8; 4]>>, ContractIndexError> {
    let mut map = HashMap::new();
    let Some(text) = read_optional(path)? else { return Ok(map) };
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((lhs, rhs)) = line.split_once(':') else {
            tracing::warn!(file = %path.display(), line_no, "skipping malformed inner-call row");
            continue;
        };
        let selector = parse_selector(lhs)
            .ok_or_else(|| malformed(path, line_no, lhs))?;
        let inner = parse_selector(rhs)
            .ok_or_else(|| malformed(path, line_no, rhs))?;
        map.entry(selector).or_insert_with(Vec::new).push(inner);
    }
    Ok(map)
}

fn load_signature_to_selector(path: &Path) -> Result<HashMap<String, [u8; 4]>, ContractIndexError> {
    let mut map = HashMap::new();
    let Some(text) = read_optional(path)? else { return Ok(map) };
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((selector_hex, signature)) = line.split_once(':') else {
            tracing::warn!(file = %path.display(), line_no, "skipping malformed abi-sig row");
            continue;
        };
        let selector = parse_selector(selector_hex).ok_or_else(|| malformed(path, line_no, selector_hex))?;
        map.insert(signature.to_owned(), selector);
    }
    Ok(map)
}

fn read_optional(path: &Path) -> Result<Option<String>, ContractIndexError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ContractIndexError::Io { path: path.display().to_string(), source }),
    }
}

fn malformed(path: &Path, line_no: usize, text: &str) -> ContractIndexError {
    ContractIndexError::MalformedSelector { path: path.display().to_string(), line: line_no + 1, text: text.to_owned() }
}

fn parse_selector(hex_str: &str) -> Option<[u8; 4]> {
    let stripped = hex_str.trim().strip_prefix("0x").unwrap_or(hex_str.trim());
    if stripped.len() != 8 {
        return None;
    }
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_yield_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = ContractIndex::load("Token", dir.path(), dir.path()).unwrap();
        assert!(index.inner_calls_for([0, 0, 0, 0]).is_empty());
        assert_eq!(index.selector_for_signature("foo()"), None);
    }

    #[test]
    fn loads_inner_calls_and_abi_selectors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Token.bin.sig"), "cdcd77c0:a5643bf2\n").unwrap();
        std::fs::write(dir.path().join("Token.abi.sig"), "cdcd77c0:baz(uint32,bool)\n").unwrap();
        let index = ContractIndex::load("Token", dir.path(), dir.path()).unwrap();
        assert_eq!(index.inner_calls_for([0xcd, 0xcd, 0x77, 0xc0]), &[[0xa5, 0x64, 0x3b, 0xf2]]);
        assert_eq!(index.selector_for_signature("baz(uint32,bool)"), Some([0xcd, 0xcd, 0x77, 0xc0]));
    }
}
