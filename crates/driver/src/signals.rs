//! Synchronous rendezvous signalling between the driver and the external
//! gate, modelled as exactly-one-delivery channel pairs (§5 of the design):
//! `start`, `continue`, `stop`, `finish`.

use tokio::sync::{mpsc, oneshot};

/// Sent by the driver after generating a round's cases.
#[derive(Debug, Clone)]
pub struct RoundStart {
    pub contract: String,
    pub round_index: usize,
    pub case_count: usize,
}

/// The gate's reply to a `stop` query: `true` ends the contract loop
/// cleanly between rounds, `false` allows the next round to proceed.
pub type StopVerdict = bool;

/// One endpoint of the four-event protocol, held by the driver.
pub struct DriverGate {
    start_tx: mpsc::Sender<RoundStart>,
    continue_rx: mpsc::Receiver<()>,
    stop_tx: mpsc::Sender<oneshot::Sender<StopVerdict>>,
    finish_tx: Option<oneshot::Sender<()>>,
}

/// The matching endpoint held by whatever external component answers the
/// gate (a test harness, or the reporting server in a full deployment).
pub struct ExternalGate {
    pub start_rx: mpsc::Receiver<RoundStart>,
    pub continue_tx: mpsc::Sender<()>,
    pub stop_rx: mpsc::Receiver<oneshot::Sender<StopVerdict>>,
    pub finish_rx: oneshot::Receiver<()>,
}

/// Builds a connected `(DriverGate, ExternalGate)` pair. Channels are
/// buffered at depth 1: each event is delivered exactly once before the
/// next can be sent, modelling an unbuffered rendezvous.
pub fn gate_pair() -> (DriverGate, ExternalGate) {
    let (start_tx, start_rx) = mpsc::channel(1);
    let (continue_tx, continue_rx) = mpsc::channel(1);
    let (stop_tx, stop_rx) = mpsc::channel(1);
    let (finish_tx, finish_rx) = oneshot::channel();
    (
        DriverGate { start_tx, continue_rx, stop_tx, finish_tx: Some(finish_tx) },
        ExternalGate { start_rx, continue_tx, stop_rx, finish_rx },
    )
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("the external gate has disconnected")]
    Disconnected,
}

impl DriverGate {
    /// Suspension point 1: emits `start` for a freshly generated round.
    pub async fn send_start(&self, round: RoundStart) -> Result<(), SignalError> {
        self.start_tx.send(round).await.map_err(|_| SignalError::Disconnected)
    }

    /// Suspension point 2: blocks until the gate answers `continue`.
    pub async fn recv_continue(&mut self) -> Result<(), SignalError> {
        self.continue_rx.recv().await.ok_or(SignalError::Disconnected).map(|_| ())
    }

    /// Suspension point 3: after dispatch, blocks for the `stop` verdict.
    pub async fn recv_stop(&self) -> Result<StopVerdict, SignalError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.stop_tx.send(reply_tx).await.map_err(|_| SignalError::Disconnected)?;
        reply_rx.await.map_err(|_| SignalError::Disconnected)
    }

    /// Emits `finish` exactly once, after every contract has been processed.
    pub fn send_finish(&mut self) -> Result<(), SignalError> {
        self.finish_tx.take().and_then(|tx| tx.send(()).ok()).ok_or(SignalError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_continue_stop_finish_round_trip() {
        let (mut driver, mut external) = gate_pair();

        driver.send_start(RoundStart { contract: "Token".into(), round_index: 0, case_count: 6 }).await.unwrap();
        let round = external.start_rx.recv().await.unwrap();
        assert_eq!(round.contract, "Token");

        external.continue_tx.send(()).await.unwrap();
        driver.recv_continue().await.unwrap();

        let driver_task = tokio::spawn(async move { driver.recv_stop().await });
        let reply_tx = external.stop_rx.recv().await.unwrap();
        reply_tx.send(true).unwrap();
        let verdict = driver_task.await.unwrap().unwrap();
        assert!(verdict);
    }
}
