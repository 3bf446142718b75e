//! The fuzz driver: per-contract control loop, rendezvous signalling with
//! an external gate, and fire-and-forget HTTP dispatch to the runner.

pub mod contract_index;
pub mod dispatch;
pub mod driver;
pub mod signals;

pub use contract_index::{ContractIndex, ContractIndexError};
pub use driver::{DriverError, FuzzDriver, GeneratedCase, SENTINEL_PLACEHOLDER};
pub use signals::{gate_pair, DriverGate, ExternalGate, RoundStart, SignalError, StopVerdict};
