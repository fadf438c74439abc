//! Pipeline statistics.

use std::time::Duration;

use contracts::ParticipantId;
use dispatch::DispatchSnapshot;
use observability::RelaySummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames produced by the simulated speakers
    pub frames_produced: u64,

    /// Dispatch counters captured when the relay shut down
    pub dispatch: DispatchSnapshot,

    /// Packets drained per listener queue
    pub delivered: Vec<(ParticipantId, u64)>,

    /// Packets dropped because a listener queue was full
    pub packets_dropped: u64,

    /// Aggregated dispatch statistics
    pub summary: Option<RelaySummary>,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of connected listeners
    pub listeners: usize,

    /// Number of simulated speakers
    pub speakers: usize,
}

impl PipelineStats {
    /// Calculate frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.frames_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate drop rate as percentage of sent plus dropped packets
    #[allow(dead_code)]
    pub fn drop_rate(&self) -> f64 {
        let total = self.dispatch.packets_sent + self.packets_dropped;
        if total > 0 {
            (self.packets_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Relay Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames produced: {}", self.frames_produced);
        println!("   ├─ Frames dispatched: {}", self.dispatch.frames_dispatched);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   ├─ Speakers: {}", self.speakers);
        println!("   └─ Listeners: {}", self.listeners);

        println!("\n📈 Dispatch Counters");
        println!("   ├─ Frames received: {}", self.dispatch.frames_received);
        println!("   ├─ Rejected at intake: {}", self.dispatch.frames_rejected);
        println!("   ├─ Canceled by policy: {}", self.dispatch.frames_canceled);
        println!("   ├─ Packets sent: {}", self.dispatch.packets_sent);
        println!("   ├─ Send failures: {}", self.dispatch.send_failures);
        println!("   └─ Dropped on full queues: {}", self.packets_dropped);

        if !self.delivered.is_empty() {
            println!("\n🔊 Delivered per Listener");
            for (i, (listener, count)) in self.delivered.iter().enumerate() {
                let prefix = if i == self.delivered.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!("   {} {}: {}", prefix, listener, count);
            }
        }

        if let Some(ref summary) = self.summary {
            println!("\n{}", summary);
        }

        println!();
    }
}
