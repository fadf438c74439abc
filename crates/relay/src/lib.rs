//! # Relay
//!
//! Runtime around the dispatch core.
//!
//! Responsible for:
//! - Tracking connected participants and their outbound queues
//! - Consuming inbound `VoiceFrame`s and driving intake -> policies -> flush
//! - Guarding intake (payload size, empty frames) before dispatch runs

pub mod transport;
pub mod voice_relay;

pub use contracts::{VoiceFrame, VoicePacket, VoiceTransport};
pub use transport::ChannelTransport;
pub use voice_relay::{RelayConfig, VoiceRelay};
