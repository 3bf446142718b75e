//! Fire-and-forget dispatch of a round's batch to the external runner.

/// Builds the `runnerMonitor` query URL for one round's batch: one `msg`
/// query parameter per dispatched hex payload, in generation order.
pub fn runner_monitor_url(tester_port: &str, address: &str, hex_payloads: &[String]) -> String {
    let mut url = format!("{}/runnerMonitor?address={address}", tester_port.trim_end_matches('/'));
    for payload in hex_payloads {
        url.push_str("&msg=");
        url.push_str(payload);
    }
    url
}

/// Issues the GET and discards the response; failures are logged only, per
/// §5: dispatch never blocks the driver loop and never fails the round.
pub fn dispatch_round(client: reqwest::Client, url: String, contract: String, round_index: usize) {
    tokio::spawn(async move {
        match client.get(&url).send().await {
            Ok(resp) => {
                tracing::debug!(contract = %contract, round_index, status = %resp.status(), "runnerMonitor dispatch completed");
            }
            Err(err) => {
                tracing::warn!(contract = %contract, round_index, error = %err, "runnerMonitor dispatch failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_has_one_msg_param_per_payload_in_order() {
        let url = runner_monitor_url("http://localhost:8546", "0xabc", &["deadbeef".to_owned(), "cafe".to_owned()]);
        assert_eq!(url, "http://localhost:8546/runnerMonitor?address=0xabc&msg=deadbeef&msg=cafe");
    }

    #[test]
    fn trailing_slash_on_tester_port_is_tolerated() {
        let url = runner_monitor_url("http://localhost:8546/", "0xabc", &[]);
        assert_eq!(url, "http://localhost:8546/runnerMonitor?address=0xabc");
    }
}
