//! VoicePacket / VoiceFrame - dispatch stage input and output
//!
//! `VoiceFrame` is what the intake side hands to the dispatcher; `VoicePacket`
//! is the resolved per-listener delivery the transport sends out.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ParticipantId, VoiceProperties};

/// One inbound unit of encoded audio from one speaker.
///
/// The payload is opaque at this stage: the codec produced it upstream and the
/// client decodes it downstream. Dispatch never inspects the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceFrame {
    /// Session identity of the speaker
    pub speaker: ParticipantId,

    /// Encoded audio payload (zero-copy)
    pub payload: Bytes,
}

impl VoiceFrame {
    /// Create a frame from a speaker id and payload.
    pub fn new(speaker: impl Into<ParticipantId>, payload: impl Into<Bytes>) -> Self {
        Self {
            speaker: speaker.into(),
            payload: payload.into(),
        }
    }
}

/// Resolved per-listener delivery, immutable once constructed.
///
/// All packets produced from one frame share the same payload buffer via
/// `Bytes`, so fan-out to N listeners costs N reference counts, not N copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicePacket {
    /// Session identity of the participant the audio originated from
    pub source: ParticipantId,

    /// Encoded audio payload, shared with the originating frame
    pub payload: Bytes,

    /// Playback volume percentage.
    ///
    /// No range is enforced anywhere in the pipeline: negative or >100 values
    /// pass through unmodified and mean whatever the renderer says they mean.
    pub volume: i32,

    /// Opaque rendering hints, carried verbatim
    pub properties: VoiceProperties,
}

impl VoicePacket {
    /// Create a packet for the given source and payload.
    pub fn new(
        source: ParticipantId,
        payload: Bytes,
        volume: i32,
        properties: VoiceProperties,
    ) -> Self {
        Self {
            source,
            payload,
            volume,
            properties,
        }
    }
}
