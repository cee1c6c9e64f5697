// ABOUTME: Internet speed test runner wrapping the speedtest-cli subprocess
// ABOUTME: Runs the speed test in the background and answers within a hard deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Speed test runner
//!
//! A speed test takes anywhere from a few seconds to well over a minute. The
//! run happens in a background task and each caller waits at most
//! `timeout_secs`; on expiry the caller gets [`SpeedTestOutcome::StillRunning`]
//! and the run keeps going. Concurrent and later callers attach to the run
//! in flight instead of starting another one, so a caller polling after a
//! 202 picks up the finished result.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::timeouts;

/// Result slot shared between the speed test task and waiting callers
type RunSlot = Option<Result<SpeedTestReport, String>>;

/// Speed test configuration
#[derive(Debug, Clone)]
pub struct SpeedTestConfig {
    /// Program to execute (default: `speedtest-cli`)
    pub program: String,
    /// Program arguments; the program must print speedtest-cli's JSON report
    pub args: Vec<String>,
    /// Deadline for one caller, in seconds (default: 20)
    pub timeout_secs: u64,
    /// Hard limit on the speed test itself, in seconds; the process is killed after it
    pub max_runtime_secs: u64,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            program: "speedtest-cli".to_owned(),
            args: vec!["--json".to_owned(), "--secure".to_owned()],
            timeout_secs: timeouts::SPEED_TEST_SECS,
            max_runtime_secs: timeouts::SPEED_TEST_SECS * 6,
        }
    }
}

/// Measured connection speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestReport {
    /// Download speed in Mbps, one decimal
    pub download_speed: f64,
    /// Upload speed in Mbps, one decimal, when measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_speed: Option<f64>,
    /// Unit of both speeds
    pub unit: String,
    /// Coarse rating of the download speed
    pub quality: String,
}

/// What a caller observed within its deadline
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedTestOutcome {
    /// The speed test finished
    Completed(SpeedTestReport),
    /// The speed test failed to start, exited unsuccessfully or printed garbage
    Failed(String),
    /// The deadline passed while the speed test was still running
    StillRunning,
}

/// speedtest-cli `--json` output (internal); speeds are in bits per second
#[derive(Debug, Deserialize)]
struct CliReport {
    download: f64,
    #[serde(default)]
    upload: Option<f64>,
}

/// Convert bits per second to Mbps rounded to one decimal
fn to_mbps(bits_per_sec: f64) -> f64 {
    (bits_per_sec / 100_000.0).round() / 10.0
}

/// Rate a download speed in Mbps
#[must_use]
pub fn quality_label(download_mbps: f64) -> &'static str {
    if download_mbps > 10.0 {
        "Good"
    } else if download_mbps > 5.0 {
        "Fair"
    } else {
        "Slow"
    }
}

/// Parse the speed test's stdout into a report
///
/// # Errors
/// Returns a description of the problem if the output is not a speedtest-cli JSON report
pub fn parse_report(stdout: &[u8]) -> Result<SpeedTestReport, String> {
    let cli: CliReport = serde_json::from_slice(stdout)
        .map_err(|e| format!("Could not parse speed test output: {e}"))?;
    let download_speed = to_mbps(cli.download);
    Ok(SpeedTestReport {
        download_speed,
        upload_speed: cli.upload.filter(|u| *u > 0.0).map(to_mbps),
        unit: "Mbps".to_owned(),
        quality: quality_label(download_speed).to_owned(),
    })
}

async fn execute(config: &SpeedTestConfig) -> Result<SpeedTestReport, String> {
    let child = Command::new(&config.program)
        .args(&config.args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = timeout(Duration::from_secs(config.max_runtime_secs), child)
        .await
        .map_err(|_| {
            format!(
                "Speed test did not finish within {}s",
                config.max_runtime_secs
            )
        })?
        .map_err(|e| format!("Failed to start {}: {e}", config.program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Speed test exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    parse_report(&output.stdout)
}

/// Runs at most one speed test at a time
pub struct SpeedTestRunner {
    config: Arc<SpeedTestConfig>,
    in_flight: Mutex<Option<watch::Receiver<RunSlot>>>,
}

impl SpeedTestRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: SpeedTestConfig) -> Self {
        Self {
            config: Arc::new(config),
            in_flight: Mutex::new(None),
        }
    }

    /// Run (or join) a speed test and wait for it up to the configured deadline
    pub async fn run(&self) -> SpeedTestOutcome {
        let mut receiver = self.attach().await;
        let deadline = Duration::from_secs(self.config.timeout_secs);

        let finished: Option<RunSlot> = {
            match timeout(deadline, receiver.wait_for(Option::is_some)).await {
                Err(_) => None,
                Ok(Ok(slot)) => Some(slot.clone()),
                Ok(Err(_)) => Some(None),
            }
        };

        let Some(slot) = finished else {
            info!(
                deadline_secs = self.config.timeout_secs,
                "Speed test still running at deadline"
            );
            return SpeedTestOutcome::StillRunning;
        };

        self.clear_finished().await;
        match slot {
            Some(Ok(report)) => SpeedTestOutcome::Completed(report),
            Some(Err(e)) => {
                warn!("Speed test failed: {e}");
                SpeedTestOutcome::Failed(e)
            }
            None => SpeedTestOutcome::Failed("Speed test was aborted".to_owned()),
        }
    }

    /// Whether a speed test is currently in flight
    pub async fn is_running(&self) -> bool {
        self.in_flight
            .lock()
            .await
            .as_ref()
            .is_some_and(|rx| rx.borrow().is_none() && rx.has_changed().is_ok())
    }

    /// Join the speed test in flight, or start a new one
    async fn attach(&self) -> watch::Receiver<RunSlot> {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(receiver) = in_flight.as_ref() {
            debug!("Joining speed test in flight");
            return receiver.clone();
        }

        let (sender, receiver) = watch::channel(None);
        let config = Arc::clone(&self.config);
        tokio::spawn(async move {
            info!(program = %config.program, "Starting speed test");
            let result = execute(&config).await;
            // Stored even when every caller has given up waiting.
            sender.send_replace(Some(result));
        });

        *in_flight = Some(receiver.clone());
        receiver
    }

    /// Forget a speed test that has finished so the next request starts a fresh one
    async fn clear_finished(&self) {
        let mut in_flight = self.in_flight.lock().await;
        let done = in_flight
            .as_ref()
            .is_some_and(|rx| rx.borrow().is_some() || rx.has_changed().is_err());
        if done {
            *in_flight = None;
        }
    }
}
