//! VoiceRelay - main loop driving frames through the dispatch stage

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use contracts::VoiceFrame;
use dispatch::{dispatch_frame, DispatchMetrics, DispatchOutcome, PolicyRegistry};
use observability::DispatchAggregator;

use crate::transport::ChannelTransport;

/// Relay runtime configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay name (used for logging)
    pub name: String,
    /// Frames with larger payloads are rejected at intake
    pub max_payload_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: "voice-relay".to_string(),
            max_payload_bytes: 8192,
        }
    }
}

/// The relay main loop.
///
/// Consumes inbound frames, guards them at intake, runs the policy chain, and
/// flushes surviving contexts to the transport. One frame is fully resolved
/// before the next is taken; concurrency across frames belongs to whoever
/// runs multiple relays.
pub struct VoiceRelay {
    config: RelayConfig,
    transport: Arc<ChannelTransport>,
    registry: PolicyRegistry,
    metrics: Arc<DispatchMetrics>,
    aggregator: Arc<Mutex<DispatchAggregator>>,
    input_rx: mpsc::Receiver<VoiceFrame>,
}

impl VoiceRelay {
    /// Create a relay over the given transport and policy chain.
    pub fn new(
        config: RelayConfig,
        transport: Arc<ChannelTransport>,
        registry: PolicyRegistry,
        input_rx: mpsc::Receiver<VoiceFrame>,
    ) -> Self {
        Self {
            config,
            transport,
            registry,
            metrics: Arc::new(DispatchMetrics::new()),
            aggregator: Arc::new(Mutex::new(DispatchAggregator::new())),
            input_rx,
        }
    }

    /// Shared handle to this relay's dispatch counters.
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Shared handle to this relay's in-memory statistics.
    pub fn aggregator(&self) -> Arc<Mutex<DispatchAggregator>> {
        Arc::clone(&self.aggregator)
    }

    /// The transport this relay flushes to.
    pub fn transport(&self) -> Arc<ChannelTransport> {
        Arc::clone(&self.transport)
    }

    /// Run the relay main loop.
    ///
    /// Consumes frames from the input channel until it closes.
    #[instrument(name = "voice_relay_run", skip(self), fields(relay = %self.config.name))]
    pub async fn run(mut self) {
        info!(
            relay = %self.config.name,
            policies = self.registry.len(),
            "Voice relay started"
        );

        let mut frame_count: u64 = 0;

        while let Some(frame) = self.input_rx.recv().await {
            frame_count += 1;
            self.process_frame(frame);

            if frame_count.is_multiple_of(100) {
                debug!(frames = frame_count, "Relay progress");
            }
        }

        observability::record_packets_dropped(self.transport.dropped_count());

        let snapshot = self.metrics.snapshot();
        info!(
            relay = %self.config.name,
            frames = frame_count,
            dispatched = snapshot.frames_dispatched,
            canceled = snapshot.frames_canceled,
            rejected = snapshot.frames_rejected,
            packets_sent = snapshot.packets_sent,
            send_failures = snapshot.send_failures,
            "Relay input closed, shutting down"
        );
    }

    /// Spawn the relay as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn stats(&self) -> std::sync::MutexGuard<'_, DispatchAggregator> {
        self.aggregator.lock().expect("aggregator lock poisoned")
    }

    fn process_frame(&self, frame: VoiceFrame) {
        // Intake guard: frame validity is this stage's concern, never the
        // accumulator's.
        if frame.payload.is_empty() {
            self.metrics.inc_frames_rejected();
            self.stats().record_rejected();
            observability::record_frame_rejected(frame.speaker.as_str());
            warn!(speaker = %frame.speaker, "Empty frame rejected at intake");
            return;
        }
        if frame.payload.len() > self.config.max_payload_bytes {
            self.metrics.inc_frames_rejected();
            self.stats().record_rejected();
            observability::record_frame_rejected(frame.speaker.as_str());
            warn!(
                speaker = %frame.speaker,
                payload_bytes = frame.payload.len(),
                max = self.config.max_payload_bytes,
                "Oversized frame rejected at intake"
            );
            return;
        }

        self.metrics.inc_frames_received();
        observability::record_frame_received(frame.speaker.as_str(), frame.payload.len());
        let speaker = frame.speaker.clone();
        let payload_bytes = frame.payload.len();

        match dispatch_frame(frame, self.transport.as_ref(), &self.registry) {
            DispatchOutcome::Proceed(ctx) => {
                let report = ctx.finalize();
                self.metrics.inc_frames_dispatched();
                self.metrics.add_packets_sent(report.sent as u64);
                self.metrics.add_send_failures(report.failed as u64);
                observability::record_frame_dispatched(report.total(), report.failed);
                self.stats()
                    .record_dispatched(report.total(), report.failed, payload_bytes);
            }
            DispatchOutcome::Canceled => {
                self.metrics.inc_frames_canceled();
                observability::record_frame_canceled(speaker.as_str());
                self.stats().record_canceled();
            }
        }
    }
}
