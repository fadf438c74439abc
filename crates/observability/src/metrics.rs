//! Dispatch metrics collection
//!
//! Records per-frame dispatch outcomes on the `metrics` facade and aggregates
//! them in memory for end-of-run summaries.

use metrics::{counter, gauge, histogram};

/// Record a frame entering the dispatch stage
pub fn record_frame_received(speaker: &str, payload_bytes: usize) {
    counter!(
        "voice_relay_frames_received_total",
        "speaker" => speaker.to_string()
    )
    .increment(1);
    histogram!("voice_relay_frame_payload_bytes").record(payload_bytes as f64);
}

/// Record a frame rejected by the intake guard
pub fn record_frame_rejected(speaker: &str) {
    counter!(
        "voice_relay_frames_rejected_total",
        "speaker" => speaker.to_string()
    )
    .increment(1);
}

/// Record a frame vetoed by a policy
pub fn record_frame_canceled(speaker: &str) {
    counter!(
        "voice_relay_frames_canceled_total",
        "speaker" => speaker.to_string()
    )
    .increment(1);
}

/// Record a flushed frame
///
/// Call once per finalized frame with the flush accounting.
pub fn record_frame_dispatched(targets: usize, failures: usize) {
    counter!("voice_relay_frames_dispatched_total").increment(1);
    counter!("voice_relay_packets_sent_total").increment((targets - failures) as u64);
    histogram!("voice_relay_targets_per_frame").record(targets as f64);

    if failures > 0 {
        counter!("voice_relay_send_failures_total").increment(failures as u64);
    }
    gauge!("voice_relay_last_frame_targets").set(targets as f64);
}

/// Record packets dropped by full listener queues
pub fn record_packets_dropped(count: u64) {
    if count > 0 {
        counter!("voice_relay_packets_dropped_total").increment(count);
    }
}

/// Dispatch metrics aggregator
///
/// Aggregates per-frame outcomes in memory for statistics and summary output.
#[derive(Debug, Clone, Default)]
pub struct DispatchAggregator {
    /// Frames that entered dispatch
    pub total_frames: u64,

    /// Frames rejected at intake
    pub total_rejected: u64,

    /// Frames vetoed by a policy
    pub total_canceled: u64,

    /// Packets accepted by the transport
    pub total_packets_sent: u64,

    /// Per-listener send failures
    pub total_send_failures: u64,

    /// Targets-per-frame statistics
    pub targets_stats: RunningStats,

    /// Payload-size statistics (bytes)
    pub payload_stats: RunningStats,
}

impl DispatchAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame flushed to the transport
    pub fn record_dispatched(&mut self, targets: usize, failures: usize, payload_bytes: usize) {
        self.total_frames += 1;
        self.total_packets_sent += (targets - failures) as u64;
        self.total_send_failures += failures as u64;
        self.targets_stats.push(targets as f64);
        self.payload_stats.push(payload_bytes as f64);
    }

    /// Record one frame vetoed by a policy
    pub fn record_canceled(&mut self) {
        self.total_frames += 1;
        self.total_canceled += 1;
    }

    /// Record one frame rejected at intake
    pub fn record_rejected(&mut self) {
        self.total_rejected += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> RelaySummary {
        RelaySummary {
            total_frames: self.total_frames,
            total_rejected: self.total_rejected,
            total_canceled: self.total_canceled,
            total_packets_sent: self.total_packets_sent,
            total_send_failures: self.total_send_failures,
            cancel_rate: if self.total_frames > 0 {
                self.total_canceled as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            targets_per_frame: StatsSummary::from(&self.targets_stats),
            payload_bytes: StatsSummary::from(&self.payload_stats),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Relay run summary
#[derive(Debug, Clone, Default)]
pub struct RelaySummary {
    pub total_frames: u64,
    pub total_rejected: u64,
    pub total_canceled: u64,
    pub total_packets_sent: u64,
    pub total_send_failures: u64,
    pub cancel_rate: f64,
    pub targets_per_frame: StatsSummary,
    pub payload_bytes: StatsSummary,
}

impl std::fmt::Display for RelaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "Rejected at intake: {}", self.total_rejected)?;
        writeln!(
            f,
            "Canceled by policy: {} ({:.2}%)",
            self.total_canceled, self.cancel_rate
        )?;
        writeln!(f, "Packets sent: {}", self.total_packets_sent)?;
        writeln!(f, "Send failures: {}", self.total_send_failures)?;
        writeln!(f, "Targets per frame: {}", self.targets_per_frame)?;
        writeln!(f, "Payload bytes: {}", self.payload_bytes)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics accumulator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
