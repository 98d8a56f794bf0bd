use std::time::Duration;

use crate::models::{CheckResult, Outcome, UNMEASURED_LATENCY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResponse {
    Received { status: u16, elapsed: Duration },
    /// Timeout, DNS failure, refused or reset connection, TLS error.
    Failed { reason: String },
}

fn elapsed_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

pub fn classify(url: &str, response: &ProbeResponse, latency_threshold_ms: u64) -> CheckResult {
    match response {
        ProbeResponse::Received { status, elapsed } => {
            let ms = elapsed_ms(*elapsed);
            let outcome = match *status {
                200 if ms <= latency_threshold_ms as f64 => Outcome::Ok,
                200 => Outcome::Warning,
                _ => Outcome::Error,
            };
            CheckResult {
                url: url.to_string(),
                outcome,
                latency_ms: ms.round() as i64,
            }
        }
        ProbeResponse::Failed { .. } => CheckResult {
            url: url.to_string(),
            outcome: Outcome::Error,
            latency_ms: UNMEASURED_LATENCY,
        },
    }
}

pub fn alert_message(
    result: &CheckResult,
    response: &ProbeResponse,
    latency_threshold_ms: u64,
) -> Option<String> {
    match (result.outcome, response) {
        (Outcome::Ok, _) => None,
        (Outcome::Warning, _) => Some(format!(
            "[WARNING] {} responded in {} ms (above threshold {} ms)",
            result.url, result.latency_ms, latency_threshold_ms
        )),
        (Outcome::Error, ProbeResponse::Received { status, .. }) => {
            Some(format!("[ERROR] {} returned status {}", result.url, status))
        }
        (Outcome::Error, ProbeResponse::Failed { reason }) => {
            Some(format!("[ERROR] {} request failed: {}", result.url, reason))
        }
    }
}
