//! DispatchContext - per-frame delivery accumulator
//!
//! One context lives for exactly one inbound audio frame: addressing calls
//! populate the target map, `finalize` flushes it to the transport, and the
//! context is consumed. Conflicting instructions for the same listener are
//! resolved by volume arbitration: the louder decision wins unless the caller
//! forces an override.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use contracts::{ParticipantId, VoicePacket, VoiceProperties, VoiceTransport};

/// Volume used when an addressing call does not specify one.
pub const DEFAULT_VOLUME: i32 = 100;

/// Per-frame dispatch accumulator.
///
/// Borrows the transport for the duration of one frame; owns the target map.
/// All packets recorded here carry the context's speaker as their source and
/// share the frame's payload buffer.
///
/// Every addressing operation is total: no input combination produces an
/// error, unknown listeners are recorded as-is (the transport deals with them
/// at send time), and volumes are never range-checked.
pub struct DispatchContext<'a> {
    /// The sending participant. Immutable for the context's lifetime.
    speaker: ParticipantId,

    /// Encoded audio payload, shared across all emitted packets.
    payload: Bytes,

    /// Delivery collaborator; knows the connected set and performs sends.
    transport: &'a dyn VoiceTransport,

    /// Pending per-listener decisions. Iteration order carries no guarantee.
    targets: HashMap<ParticipantId, VoicePacket>,

    /// Set when a policy vetoes the frame.
    canceled: bool,
}

impl<'a> DispatchContext<'a> {
    /// Open a context for one inbound frame.
    pub fn new(
        speaker: ParticipantId,
        payload: Bytes,
        transport: &'a dyn VoiceTransport,
    ) -> Self {
        Self {
            speaker,
            payload,
            transport,
            targets: HashMap::new(),
            canceled: false,
        }
    }

    /// The speaker this frame originated from.
    pub fn speaker(&self) -> &ParticipantId {
        &self.speaker
    }

    /// The encoded audio payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The transport this context will flush to.
    pub fn transport(&self) -> &dyn VoiceTransport {
        self.transport
    }

    /// Number of listeners with a pending decision.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The currently resolved volume for a listener, if addressed.
    pub fn resolved_volume(&self, listener: &str) -> Option<i32> {
        self.targets.get(listener).map(|p| p.volume)
    }

    /// The currently resolved packet for a listener, if addressed.
    pub fn resolved_packet(&self, listener: &str) -> Option<&VoicePacket> {
        self.targets.get(listener)
    }

    fn packet(&self, volume: i32, properties: VoiceProperties) -> VoicePacket {
        VoicePacket::new(self.speaker.clone(), self.payload.clone(), volume, properties)
    }

    /// Address one listener with the default volume.
    pub fn address_to(&mut self, listener: ParticipantId) {
        self.address_to_at(listener, DEFAULT_VOLUME);
    }

    /// Address one listener with a custom volume.
    pub fn address_to_at(&mut self, listener: ParticipantId, volume: i32) {
        self.address_to_with(listener, volume, VoiceProperties::empty());
    }

    /// Address one listener with a custom volume and rendering hints.
    pub fn address_to_with(
        &mut self,
        listener: ParticipantId,
        volume: i32,
        properties: VoiceProperties,
    ) {
        self.address_to_full(listener, volume, properties, false);
    }

    /// Address one listener, full form.
    ///
    /// Arbitration: with no pending decision the instruction is recorded
    /// unconditionally. Against a pending decision and `force_override ==
    /// false`, a strictly quieter instruction is silently dropped and anything
    /// else replaces it (loudest wins, not last-write-wins). With
    /// `force_override == true` the instruction always replaces.
    pub fn address_to_full(
        &mut self,
        listener: ParticipantId,
        volume: i32,
        properties: VoiceProperties,
        force_override: bool,
    ) {
        if !force_override {
            if let Some(pending) = self.targets.get(&listener) {
                if volume < pending.volume {
                    trace!(
                        listener = %listener,
                        pending = pending.volume,
                        offered = volume,
                        "Quieter instruction dropped"
                    );
                    return;
                }
            }
        }

        let packet = self.packet(volume, properties);
        self.targets.insert(listener, packet);
    }

    /// Address every participant in the transport's connected set with the
    /// default volume.
    pub fn address_all_except_speaker(&mut self) {
        self.address_all_except_speaker_at(DEFAULT_VOLUME);
    }

    /// Address every participant in the transport's connected set with a
    /// custom volume.
    pub fn address_all_except_speaker_at(&mut self, volume: i32) {
        self.address_all_except_speaker_with(volume, VoiceProperties::empty());
    }

    /// Address every participant in the transport's connected set with a
    /// custom volume and rendering hints.
    pub fn address_all_except_speaker_with(&mut self, volume: i32, properties: VoiceProperties) {
        self.address_all_except_speaker_full(volume, properties, false);
    }

    /// Broadcast form, full.
    ///
    /// Snapshots the connected set at call time; connects and disconnects
    /// after this call are not reflected. Despite the name, the speaker is
    /// NOT filtered out: if the transport's snapshot contains the speaker, a
    /// self-targeted packet is recorded under the same arbitration rules.
    /// Excluding the speaker is a roster/policy decision, not an accumulator
    /// rule.
    pub fn address_all_except_speaker_full(
        &mut self,
        volume: i32,
        properties: VoiceProperties,
        force_override: bool,
    ) {
        for listener in self.transport.connected_participants() {
            self.address_to_full(listener, volume, properties.clone(), force_override);
        }
    }

    /// Veto this frame. A canceled context is dropped unread by intake;
    /// finalize never runs and the transport sees zero sends.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    /// Whether a policy has vetoed this frame.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Flush all pending decisions to the transport, one send per listener.
    ///
    /// Consumes the context, so addressing after finalize is unrepresentable.
    /// Volumes are not re-resolved here; arbitration already happened during
    /// addressing. A failed send is logged and counted but never aborts the
    /// remaining iteration.
    pub fn finalize(self) -> FlushReport {
        let mut report = FlushReport::default();

        for (listener, packet) in self.targets {
            match self.transport.send(&listener, packet) {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        speaker = %self.speaker,
                        listener = %listener,
                        error = %e,
                        "Packet send failed"
                    );
                }
            }
        }

        debug!(
            speaker = %self.speaker,
            sent = report.sent,
            failed = report.failed,
            "Frame flushed"
        );

        report
    }
}

/// Accounting from one finalize pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Sends accepted by the transport
    pub sent: usize,
    /// Sends the transport reported as failed
    pub failed: usize,
}

impl FlushReport {
    /// Total targets flushed.
    pub fn total(&self) -> usize {
        self.sent + self.failed
    }
}
