//! Waiting for a freshly created file to finish being written.
//!
//! # Design
//! - `Fixed` sleeps for a configured delay.
//! - `SizeStable` samples the file size until two consecutive samples agree or
//!   the attempt budget runs out; it never fails, it only reports.

use std::path::Path;
use std::time::Duration;

use dropzone_config::SettlePolicy;
use tokio::time::sleep;
use tracing::debug;

/// How a settle wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The fixed delay elapsed.
    Elapsed,
    /// Two consecutive size samples matched.
    Stable {
        /// Number of samples taken.
        samples: u32,
    },
    /// The size was still changing when the attempts ran out.
    Unstable {
        /// Number of samples taken.
        samples: u32,
    },
    /// The file disappeared while being sampled.
    Vanished,
}

/// Wait for `path` according to `policy`.
pub async fn settle(path: &Path, policy: &SettlePolicy) -> SettleOutcome {
    match *policy {
        SettlePolicy::Fixed { delay_ms } => {
            sleep(Duration::from_millis(delay_ms)).await;
            SettleOutcome::Elapsed
        }
        SettlePolicy::SizeStable {
            interval_ms,
            attempts,
        } => wait_for_stable_size(path, Duration::from_millis(interval_ms), attempts).await,
    }
}

async fn wait_for_stable_size(path: &Path, interval: Duration, attempts: u32) -> SettleOutcome {
    let mut previous: Option<u64> = None;
    for sample in 1..=attempts {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return SettleOutcome::Vanished;
        };
        let size = metadata.len();
        if previous == Some(size) {
            debug!(path = %path.display(), size, samples = sample, "file size settled");
            return SettleOutcome::Stable { samples: sample };
        }
        previous = Some(size);
        if sample < attempts {
            sleep(interval).await;
        }
    }
    debug!(path = %path.display(), attempts, "file size still changing");
    SettleOutcome::Unstable { samples: attempts }
}
