//! Layered configuration: defaults → optional `abifuzz.toml` → environment
//! variables prefixed `ABIFUZZ_`, mirroring the teacher's figment-based
//! config loading.

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub abi_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Newline-separated contract names; the literal string `"null"` means
    /// "use every file in `abi_dir`".
    pub contract_list: String,

    pub address_seed: PathBuf,
    pub int_seed: PathBuf,
    pub uint_seed: PathBuf,
    pub string_seed: PathBuf,
    pub byte_seed: PathBuf,
    pub bytes_seed: PathBuf,

    /// Bounds the number of tuples the combination engine emits per call
    /// (`funScale` in the design).
    pub fuzz_scale: usize,
    /// Bounds the number of generated candidates per argument position.
    pub input_scale: usize,

    /// Half-open `[fstart, fend)` range into the sorted file list, used
    /// only when `contract_list == "null"`.
    pub fstart: usize,
    pub fend: usize,

    pub addr_map: PathBuf,
    pub abi_sigs_dir: PathBuf,
    pub bin_sigs_dir: PathBuf,

    pub listen_port: u16,
    /// Base URL of the external runner-monitor service, e.g.
    /// `http://localhost:8546`.
    pub tester_port: String,
}

impl Config {
    pub fn defaults() -> Self {
        Self {
            abi_dir: PathBuf::from("./abi"),
            out_dir: PathBuf::from("./out"),
            contract_list: "null".to_owned(),
            address_seed: PathBuf::from("./seeds/addressSeed.json"),
            int_seed: PathBuf::from("./seeds/intSeed.json"),
            uint_seed: PathBuf::from("./seeds/uintSeed.json"),
            string_seed: PathBuf::from("./seeds/stringSeed.json"),
            byte_seed: PathBuf::from("./seeds/byteSeed.json"),
            bytes_seed: PathBuf::from("./seeds/bytesSeed.json"),
            fuzz_scale: 10,
            input_scale: 10,
            fstart: 0,
            fend: usize::MAX,
            addr_map: PathBuf::from("./addr_map.csv"),
            abi_sigs_dir: PathBuf::from("./abi_sigs"),
            bin_sigs_dir: PathBuf::from("./bin_sigs"),
            listen_port: 9090,
            tester_port: "http://localhost:8546".to_owned(),
        }
    }

    pub fn load(config_file: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::defaults()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("ABIFUZZ_"));
        Ok(figment.extract()?)
    }

    /// Resolves `contract_list` against the sorted list of `.abi` file
    /// stems actually present in `abi_dir`, applying `[fstart, fend)` only
    /// when the list is the literal `"null"`.
    pub fn resolve_contract_names(&self, mut discovered: Vec<String>) -> Vec<String> {
        if self.contract_list != "null" {
            return self
                .contract_list
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect();
        }
        discovered.sort();
        let end = self.fend.min(discovered.len());
        let start = self.fstart.min(end);
        discovered[start..end].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_contract_list_uses_fstart_fend_range() {
        let mut config = Config::defaults();
        config.fstart = 1;
        config.fend = 3;
        let names = config.resolve_contract_names(vec!["a".into(), "c".into(), "b".into(), "d".into()]);
        assert_eq!(names, vec!["b".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn explicit_contract_list_ignores_discovered_files() {
        let mut config = Config::defaults();
        config.contract_list = "Token\nVault\n".to_owned();
        let names = config.resolve_contract_names(vec!["Other".into()]);
        assert_eq!(names, vec!["Token".to_owned(), "Vault".to_owned()]);
    }
}
