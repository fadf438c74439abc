//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Identity Model
//! - `ParticipantId` (session identity, `Arc<str>`) is the only key used for
//!   addressing; live connection handles never cross crate boundaries.

mod blueprint;
mod error;
mod packet;
mod participant_id;
mod properties;
mod transport;

pub use blueprint::*;
pub use error::*;
pub use packet::*;
pub use participant_id::ParticipantId;
pub use properties::VoiceProperties;
pub use transport::VoiceTransport;
