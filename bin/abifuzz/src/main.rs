//! Process entry point: loads configuration, builds the seed pool and
//! signature index once, resolves the contract list, and drives every
//! contract through the fuzz driver.

use abifuzz_common::{Config, SignatureIndex};
use abifuzz_corpus::{SeedPaths, SeedPool};
use abifuzz_driver::{gate_pair, FuzzDriver};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config_path = std::env::var("ABIFUZZ_CONFIG").ok().map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let seed_pool = SeedPool::load(&SeedPaths {
        address: &config.address_seed,
        int: &config.int_seed,
        uint: &config.uint_seed,
        string: &config.string_seed,
        byte: &config.byte_seed,
        bytes: &config.bytes_seed,
    })?;

    let sig_index = SignatureIndex::build(&config.addr_map, &config.abi_sigs_dir)?;

    std::fs::create_dir_all(&config.out_dir)?;

    let discovered = discover_abi_stems(&config.abi_dir);
    let contracts = config.resolve_contract_names(discovered);
    tracing::info!(count = contracts.len(), "resolved contract list");

    let (mut driver_gate, mut external_gate) = gate_pair();

    // Stands in for the out-of-scope reporting/gate service: answers every
    // `start` with an immediate `continue`, and every `stop` query with
    // "keep going" so a standalone run completes every scheduled round.
    let gate_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                round = external_gate.start_rx.recv() => {
                    let Some(round) = round else { break };
                    tracing::info!(contract = %round.contract, round_index = round.round_index, case_count = round.case_count, "round started");
                    if external_gate.continue_tx.send(()).await.is_err() {
                        break;
                    }
                }
                reply = external_gate.stop_rx.recv() => {
                    let Some(reply) = reply else { break };
                    let _ = reply.send(false);
                }
                _ = &mut external_gate.finish_rx => {
                    tracing::info!("finish signal received");
                    break;
                }
            }
        }
    });

    let driver = FuzzDriver::new(config, seed_pool, sig_index);
    let mut rng = StdRng::from_os_rng();
    driver.run_all(&contracts, &mut driver_gate, &mut rng).await?;

    gate_task.await?;
    Ok(())
}

fn discover_abi_stems(abi_dir: &std::path::Path) -> Vec<String> {
    walkdir::WalkDir::new(abi_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("abi"))
        .filter_map(|entry| entry.path().file_stem().and_then(|s| s.to_str()).map(str::to_owned))
        .collect()
}
