//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one relay's dispatch stage
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Frames that reached the policy chain
    frames_received: AtomicU64,
    /// Frames rejected by the intake guard before the policy chain
    frames_rejected: AtomicU64,
    /// Frames vetoed by a policy
    frames_canceled: AtomicU64,
    /// Frames flushed to the transport
    frames_dispatched: AtomicU64,
    /// Per-listener sends accepted by the transport
    packets_sent: AtomicU64,
    /// Per-listener sends the transport rejected
    send_failures: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get frames received
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Increment frames received
    pub fn inc_frames_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get frames rejected at intake
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected.load(Ordering::Relaxed)
    }

    /// Increment frames rejected
    pub fn inc_frames_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get frames canceled
    pub fn frames_canceled(&self) -> u64 {
        self.frames_canceled.load(Ordering::Relaxed)
    }

    /// Increment frames canceled
    pub fn inc_frames_canceled(&self) {
        self.frames_canceled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get frames dispatched
    pub fn frames_dispatched(&self) -> u64 {
        self.frames_dispatched.load(Ordering::Relaxed)
    }

    /// Increment frames dispatched
    pub fn inc_frames_dispatched(&self) {
        self.frames_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Get packets sent
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    /// Add to packets sent
    pub fn add_packets_sent(&self, n: u64) {
        self.packets_sent.fetch_add(n, Ordering::Relaxed);
    }

    /// Get send failures
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Add to send failures
    pub fn add_send_failures(&self, n: u64) {
        self.send_failures.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            frames_received: self.frames_received(),
            frames_rejected: self.frames_rejected(),
            frames_canceled: self.frames_canceled(),
            frames_dispatched: self.frames_dispatched(),
            packets_sent: self.packets_sent(),
            send_failures: self.send_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub frames_received: u64,
    pub frames_rejected: u64,
    pub frames_canceled: u64,
    pub frames_dispatched: u64,
    pub packets_sent: u64,
    pub send_failures: u64,
}
