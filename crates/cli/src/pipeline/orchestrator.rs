//! Pipeline orchestrator - coordinates transport, relay, and speakers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ParticipantId, RelayBlueprint};
use dispatch::{BroadcastPolicy, PolicyRegistry};
use relay::{ChannelTransport, RelayConfig, VoiceRelay};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::PipelineStats;
use crate::sim::{SpeakerHandle, SpeakerSim};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay blueprint configuration
    pub blueprint: RelayBlueprint,

    /// Frames each simulated speaker produces
    pub frames_per_speaker: u64,

    /// Interval between simulated frames
    pub frame_interval: Duration,

    /// Payload size of each simulated frame
    pub payload_bytes: usize,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// A connected listener being drained in the background.
struct ListenerDrain {
    id: ParticipantId,
    delivered: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Connect Participants
        let transport = Arc::new(ChannelTransport::new(blueprint.server.name.clone()));
        let mut drains: Vec<ListenerDrain> = Vec::new();

        for participant in &blueprint.participants {
            let id: ParticipantId = participant.id.as_str().into();
            let mut rx = transport.connect(id.clone(), blueprint.delivery.listener_queue_capacity);

            let delivered = Arc::new(AtomicU64::new(0));
            let counter = Arc::clone(&delivered);
            let handle = tokio::spawn(async move {
                while rx.recv().await.is_some() {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            });

            drains.push(ListenerDrain {
                id,
                delivered,
                handle,
            });
        }

        info!(
            listeners = drains.len(),
            "Participants connected to transport"
        );

        // Policy Chain
        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(
            blueprint.delivery.default_volume,
        )));

        // Relay
        let relay_config = RelayConfig {
            name: blueprint.server.name.clone(),
            max_payload_bytes: blueprint.intake.max_payload_bytes,
        };

        let (intake_tx, intake_rx) = mpsc::channel(blueprint.intake.queue_capacity);
        let voice_relay = VoiceRelay::new(
            relay_config,
            Arc::clone(&transport),
            registry,
            intake_rx,
        );
        let metrics = voice_relay.metrics();
        let aggregator = voice_relay.aggregator();
        let relay_handle = voice_relay.spawn();

        info!("Relay started");

        // Simulated Speakers
        let speakers: Vec<SpeakerSim> = blueprint
            .participants
            .iter()
            .filter(|p| p.speaks)
            .map(|p| SpeakerSim {
                id: p.id.as_str().into(),
                frames: self.config.frames_per_speaker,
                interval: self.config.frame_interval,
                payload_bytes: self.config.payload_bytes,
            })
            .collect();

        if speakers.is_empty() {
            warn!("No speaking participants configured - relay will be idle");
        }

        let speaker_count = speakers.len();
        info!(
            speakers = speaker_count,
            frames_per_speaker = self.config.frames_per_speaker,
            "Starting simulated speakers"
        );

        let mut speaker_handles: Vec<SpeakerHandle> = speakers
            .into_iter()
            .map(|sim| sim.spawn(intake_tx.clone()))
            .collect();
        drop(intake_tx);

        // Wait for the speakers; any still running at the deadline are
        // aborted so their intake senders drop and the relay can drain.
        if let Some(timeout) = self.config.timeout {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut timed_out = false;

            for speaker in &mut speaker_handles {
                if timed_out
                    || tokio::time::timeout_at(deadline, speaker.wait())
                        .await
                        .is_err()
                {
                    timed_out = true;
                    speaker.abort();
                    speaker.wait().await;
                }
            }

            if timed_out {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "Deadline reached, speakers stopped early"
                );
            }
        } else {
            for speaker in &mut speaker_handles {
                speaker.wait().await;
            }
        }

        let frames_produced: u64 = speaker_handles.iter().map(|s| s.produced()).sum();

        // Shutdown: relay drains what the speakers queued, then listeners close
        info!("Shutting down pipeline...");
        tokio::time::timeout(Duration::from_secs(5), relay_handle)
            .await
            .context("Relay failed to shut down in time")?
            .context("Relay task panicked")?;

        for drain in &drains {
            transport.disconnect(&drain.id);
        }

        let mut delivered = Vec::with_capacity(drains.len());
        for drain in drains {
            let _ = tokio::time::timeout(Duration::from_secs(5), drain.handle).await;
            delivered.push((drain.id, drain.delivered.load(Ordering::Relaxed)));
        }

        let summary = aggregator
            .lock()
            .expect("aggregator lock poisoned")
            .summary();

        let stats = PipelineStats {
            frames_produced,
            dispatch: metrics.snapshot(),
            delivered,
            packets_dropped: transport.dropped_count(),
            summary: Some(summary),
            duration: start_time.elapsed(),
            listeners: blueprint.participants.len(),
            speakers: speaker_count,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
