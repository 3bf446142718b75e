//! The Signature Index: two process-wide, read-only-after-init maps.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum SigIndexError {
    #[error("failed to read `{path}`: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("malformed selector hex on line {line} of `{path}`: `{text}`")]
    MalformedSelector { path: String, line: usize, text: String },
}

/// `contract name -> contract address` and `selector -> [contract name, …]`,
/// built once during init and read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    name_to_address: HashMap<String, String>,
    selector_to_contracts: HashMap<[u8; 4], Vec<String>>,
}

impl SignatureIndex {
    pub fn address_of(&self, contract_name: &str) -> Option<&str> {
        self.name_to_address.get(contract_name).map(String::as_str)
    }

    pub fn contracts_for_selector(&self, selector: [u8; 4]) -> &[String] {
        self.selector_to_contracts.get(&selector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Loads `nameToAddress` from a headerless, unquoted `address,name` CSV.
    pub fn load_addr_map(path: &Path) -> Result<HashMap<String, String>, SigIndexError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| SigIndexError::Io { path: path.display().to_string(), source })?;
        let mut map = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some((address, name)) = line.split_once(',') {
                map.insert(name.trim().to_owned(), address.trim().to_owned());
            } else {
                tracing::warn!(line, "skipping malformed addr_map row");
            }
        }
        Ok(map)
    }

    /// Scans every `.abi.sig` file under `dir`; each line is
    /// `selector:signatureString`, and the file's basename (sans
    /// extension) supplies the contract name appended to that selector's
    /// bucket.
    pub fn load_selector_to_contracts(dir: &Path) -> Result<HashMap<[u8; 4], Vec<String>>, SigIndexError> {
        let mut map: HashMap<[u8; 4], Vec<String>> = HashMap::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sig") {
                continue;
            }
            let contract_name = contract_name_from_sig_path(path);
            let text = std::fs::read_to_string(path)
                .map_err(|source| SigIndexError::Io { path: path.display().to_string(), source })?;
            for (line_no, line) in text.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let Some((selector_hex, _signature)) = line.split_once(':') else {
                    tracing::warn!(file = %path.display(), line_no, "skipping malformed signature-index row");
                    continue;
                };
                let selector = parse_selector(selector_hex).ok_or_else(|| SigIndexError::MalformedSelector {
                    path: path.display().to_string(),
                    line: line_no + 1,
                    text: selector_hex.to_owned(),
                })?;
                map.entry(selector).or_default().push(contract_name.clone());
            }
        }
        Ok(map)
    }

    pub fn build(addr_map_path: &Path, abi_sigs_dir: &Path) -> Result<Self, SigIndexError> {
        Ok(Self {
            name_to_address: Self::load_addr_map(addr_map_path)?,
            selector_to_contracts: Self::load_selector_to_contracts(abi_sigs_dir)?,
        })
    }
}

/// Strips the `.abi.sig` (or plain `.sig`) suffix from a signature-index
/// filename to recover the contract name, e.g. `Token.abi.sig` -> `Token`.
fn contract_name_from_sig_path(path: &Path) -> String {
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    file_name
        .strip_suffix(".abi.sig")
        .or_else(|| file_name.strip_suffix(".sig"))
        .unwrap_or(file_name)
        .to_owned()
}

fn parse_selector(hex_str: &str) -> Option<[u8; 4]> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if stripped.len() != 8 {
        return None;
    }
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}
