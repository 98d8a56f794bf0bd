use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{CheckResult, Outcome};
use crate::notifier::Notifier;
use crate::probe::{alert_message, classify, ProbeResponse};
use crate::state::StatusBoard;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Monitor {
    targets: Vec<String>,
    latency_threshold_ms: u64,
    interval: Duration,
    http_client: reqwest::Client,
    notifier: Arc<Notifier>,
    pub state: Arc<StatusBoard>,
}

impl Monitor {
    pub fn new(
        targets: Vec<String>,
        latency_threshold_ms: u64,
        interval: Duration,
        notifier: Arc<Notifier>,
        state: Arc<StatusBoard>,
    ) -> Result<Self> {
        Self::with_probe_timeout(targets, latency_threshold_ms, interval, PROBE_TIMEOUT, notifier, state)
    }

    pub fn with_probe_timeout(
        targets: Vec<String>,
        latency_threshold_ms: u64,
        interval: Duration,
        probe_timeout: Duration,
        notifier: Arc<Notifier>,
        state: Arc<StatusBoard>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .build()
            .context("Failed to create probe HTTP client")?;

        Ok(Self {
            targets,
            latency_threshold_ms,
            interval,
            http_client,
            notifier,
            state,
        })
    }

    pub fn from_config(config: &Config, notifier: Arc<Notifier>, state: Arc<StatusBoard>) -> Result<Self> {
        Self::new(
            config.urls.clone(),
            config.latency_threshold_ms,
            config.interval(),
            notifier,
            state,
        )
    }

    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            "Monitoring {} targets every {}s (latency threshold {} ms)",
            self.targets.len(),
            self.interval.as_secs(),
            self.latency_threshold_ms
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let start_time = Utc::now();
            let Some(total) = self.run_cycle(&mut shutdown).await else {
                info!("Shutdown requested during a cycle, discarding partial results");
                break;
            };

            let duration = Utc::now() - start_time;
            info!(
                "Cycle completed {} checks in {:.2}s. Waiting {}s before next check...",
                total,
                duration.num_milliseconds() as f64 / 1000.0,
                self.interval.as_secs()
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        info!("Polling loop stopped");
        Ok(())
    }

    pub(crate) async fn run_cycle(
        self: &Arc<Self>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<usize> {
        self.state.begin_cycle().await;

        let total = self.targets.len();
        let mut tasks = FuturesUnordered::new();
        let mut abort_handles: Vec<AbortHandle> = Vec::with_capacity(total);

        for url in &self.targets {
            let monitor_ref = Arc::clone(self);
            let probe_url = url.clone();
            let handle = tokio::spawn(async move { monitor_ref.probe(&probe_url).await });
            abort_handles.push(handle.abort_handle());

            let url = url.clone();
            tasks.push(async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Probe task for {} did not complete: {}", url, e);
                        CheckResult::unreachable(url)
                    }
                }
            });
        }

        self.state.mark_running().await;

        let collect = async {
            let mut results = Vec::with_capacity(total);
            while let Some(result) = tasks.next().await {
                results.push(result);
            }
            results
        };

        tokio::select! {
            results = collect => {
                self.state.publish(results).await;
                Some(total)
            }
            _ = shutdown_requested(shutdown) => {
                for handle in &abort_handles {
                    handle.abort();
                }
                None
            }
        }
    }

    pub async fn probe(&self, url: &str) -> CheckResult {
        let response = self.fetch(url).await;
        let result = classify(url, &response, self.latency_threshold_ms);

        match (&result.outcome, &response) {
            (Outcome::Ok, _) => info!("[OK] {} responded in {} ms", url, result.latency_ms),
            (Outcome::Warning, _) => warn!(
                "[WARNING] {} responded in {} ms (above threshold {} ms)",
                url, result.latency_ms, self.latency_threshold_ms
            ),
            (Outcome::Error, ProbeResponse::Received { status, .. }) => {
                error!("[ERROR] {} returned status {} in {} ms", url, status, result.latency_ms)
            }
            (Outcome::Error, ProbeResponse::Failed { reason }) => {
                error!("[ERROR] {} request failed: {}", url, reason)
            }
        }

        if let Some(message) = alert_message(&result, &response, self.latency_threshold_ms) {
            self.notifier.send(&message).await;
        }

        result
    }

    async fn fetch(&self, url: &str) -> ProbeResponse {
        let start = Instant::now();
        match self.http_client.get(url).send().await {
            Ok(resp) => ProbeResponse::Received {
                status: resp.status().as_u16(),
                elapsed: start.elapsed(),
            },
            Err(e) => ProbeResponse::Failed {
                reason: describe_transport_error(&e),
            },
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out ({})", e)
    } else if e.is_connect() {
        format!("connection failed ({})", e)
    } else {
        e.to_string()
    }
}

// A dropped sender can never request shutdown, so wait forever.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
