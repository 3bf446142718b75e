//! The per-contract fuzz control loop (§4.7).

use abifuzz_abi::descriptor::{AbiDescriptor, AbiParseError};
use abifuzz_abi::method::Method;
use abifuzz_common::{Config, SignatureIndex};
use abifuzz_corpus::{combine, generate_candidates, SeedPool};
use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;

use crate::contract_index::ContractIndex;
use crate::dispatch::{dispatch_round, runner_monitor_url};
use crate::signals::{DriverGate, RoundStart};

/// The sentinel substituted for a case whose encoding failed. SPEC_FULL.md
/// §9 resolves the source's two inconsistent placeholders (`0xcaffee` and
/// `0xC0FFEE`) to this single canonical form.
pub const SENTINEL_PLACEHOLDER: &str = "0xC0FFEE";

const ROUND_CHOICES: &[usize] = &[20, 25, 30, 35, 40];
const CASE_CHOICES: &[usize] = &[6, 7, 8, 9, 10];

/// A bounded retry guard: if no eligible function exists after this many
/// attempts, generation for the contract is abandoned rather than looping
/// forever (§4.7's "bounded retry guard").
const FUNCTION_SELECTION_RETRIES: usize = 8;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read ABI file `{path}`: {source}")]
    AbiRead { path: String, #[source] source: std::io::Error },
    #[error("failed to parse ABI for `{contract}`: {source}")]
    AbiParse { contract: String, #[source] source: AbiParseError },
    #[error("no address registered for contract `{0}`")]
    UnknownAddress(String),
    #[error("no eligible function found for `{0}` after retrying")]
    NoEligibleFunction(String),
    #[error(transparent)]
    ContractIndex(#[from] crate::contract_index::ContractIndexError),
    #[error("signal protocol failure: {0}")]
    Signal(#[from] crate::signals::SignalError),
}

/// One synthesised call: its canonical signature (for logging/indexing)
/// and its dispatch-ready hex payload, prefixed `0x`.
#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub signature: String,
    pub hex_payload: String,
    pub valid: bool,
}

pub struct FuzzDriver {
    config: Config,
    seed_pool: SeedPool,
    sig_index: SignatureIndex,
    client: reqwest::Client,
}

impl FuzzDriver {
    pub fn new(config: Config, seed_pool: SeedPool, sig_index: SignatureIndex) -> Self {
        Self { config, seed_pool, sig_index, client: reqwest::Client::new() }
    }

    /// Runs every contract in `contracts` in order, driving each through
    /// its own round/case schedule, then emits exactly one `finish` signal.
    pub async fn run_all<R: Rng + ?Sized>(
        &self,
        contracts: &[String],
        gate: &mut DriverGate,
        rng: &mut R,
    ) -> Result<(), DriverError> {
        for contract in contracts {
            if let Err(err) = self.run_contract(contract, gate, rng).await {
                tracing::warn!(contract = %contract, error = %err, "skipping contract after driver error");
            }
        }
        gate.send_finish()?;
        Ok(())
    }

    /// Drives a single contract through its round/case schedule. Any I/O
    /// or parse failure on the contract's own files causes the contract to
    /// be skipped (propagated as `Err`, logged by the caller); it never
    /// aborts the whole run.
    pub async fn run_contract<R: Rng + ?Sized>(
        &self,
        contract: &str,
        gate: &mut DriverGate,
        rng: &mut R,
    ) -> Result<(), DriverError> {
        let abi_path = self.config.abi_dir.join(format!("{contract}.abi"));
        let abi_text = std::fs::read_to_string(&abi_path)
            .map_err(|source| DriverError::AbiRead { path: abi_path.display().to_string(), source })?;
        let abi = AbiDescriptor::parse(&abi_text)
            .map_err(|source| DriverError::AbiParse { contract: contract.to_owned(), source })?;

        let address = self
            .sig_index
            .address_of(contract)
            .ok_or_else(|| DriverError::UnknownAddress(contract.to_owned()))?
            .to_owned();

        let _contract_index = ContractIndex::load(contract, &self.config.bin_sigs_dir, &self.config.abi_sigs_dir)?;

        let eligible: Vec<&Method> = abi.callable_methods().collect();
        if eligible.is_empty() {
            return Err(DriverError::NoEligibleFunction(contract.to_owned()));
        }

        let rounds = *ROUND_CHOICES.choose(rng).expect("ROUND_CHOICES is non-empty");

        for round_index in 0..rounds {
            let cases_wanted = *CASE_CHOICES.choose(rng).expect("CASE_CHOICES is non-empty");
            let mut cases = Vec::with_capacity(cases_wanted);
            for _ in 0..cases_wanted {
                match self.generate_case(&eligible, rng) {
                    Some(case) => cases.push(case),
                    None => {
                        tracing::warn!(contract, round_index, "no eligible function this case, skipping");
                    }
                }
            }
            if cases.is_empty() {
                return Err(DriverError::NoEligibleFunction(contract.to_owned()));
            }

            gate.send_start(RoundStart { contract: contract.to_owned(), round_index, case_count: cases.len() }).await?;
            gate.recv_continue().await?;

            let payloads: Vec<String> = cases.iter().map(|c| c.hex_payload.clone()).collect();
            let url = runner_monitor_url(&self.config.tester_port, &address, &payloads);
            dispatch_round(self.client.clone(), url, contract.to_owned(), round_index);

            if gate.recv_stop().await? {
                break;
            }
        }

        Ok(())
    }

    /// Generates one synthesised call: picks a function uniformly from the
    /// eligible set, generates an argument tuple, and encodes it. On an
    /// encoding failure the sentinel payload is substituted and the case
    /// is marked invalid, but the round still proceeds.
    fn generate_case<R: Rng + ?Sized>(&self, eligible: &[&Method], rng: &mut R) -> Option<GeneratedCase> {
        let method = pick_eligible(eligible, rng)?;
        let signature = method.canonical_signature();

        if method.inputs.is_empty() {
            let selector = method.selector();
            return Some(GeneratedCase { signature, hex_payload: format!("0x{}", hex::encode(selector)), valid: true });
        }

        let candidate_sets: Vec<_> = method
            .inputs
            .iter()
            .map(|(_, ty)| generate_candidates(ty, &self.seed_pool, self.config.input_scale, rng))
            .collect();
        let tuples = combine(&candidate_sets, self.config.fuzz_scale, rng);
        let Some(values) = tuples.choose(rng) else {
            return Some(GeneratedCase { signature, hex_payload: SENTINEL_PLACEHOLDER.to_owned(), valid: false });
        };

        match method.encode_call(values) {
            Ok(bytes) => Some(GeneratedCase { signature, hex_payload: format!("0x{}", hex::encode(bytes)), valid: true }),
            Err(err) => {
                tracing::warn!(signature = %signature, error = %err, "encoding failed, substituting sentinel payload");
                Some(GeneratedCase { signature, hex_payload: SENTINEL_PLACEHOLDER.to_owned(), valid: false })
            }
        }
    }
}

/// Uniformly picks an eligible function, retrying up to a bounded guard if
/// the pool is momentarily empty (it never is in practice — `eligible` is
/// checked non-empty by the caller — but the retry loop mirrors the
/// design's explicit bounded-retry requirement).
fn pick_eligible<'a, R: Rng + ?Sized>(eligible: &[&'a Method], rng: &mut R) -> Option<&'a Method> {
    for _ in 0..FUNCTION_SELECTION_RETRIES {
        if let Some(m) = eligible.choose(rng) {
            return Some(m);
        }
    }
    None
}
