//! VoiceTransport trait - dispatch output interface
//!
//! The collaborator that owns connection state and performs actual delivery.

use crate::{ContractError, ParticipantId, VoicePacket};

/// Delivery transport abstraction.
///
/// The dispatch stage borrows a transport for the duration of one frame. It
/// asks for the connected set when broadcasting and hands over one resolved
/// packet per target at finalize. Send is fire-and-forget from the caller's
/// perspective: an error is reported back for accounting but the caller keeps
/// flushing the remaining targets.
///
/// Implementations must be safe to share across concurrently-dispatched
/// frames; the snapshot and send paths are the implementor's concern.
pub trait VoiceTransport: Send + Sync {
    /// Snapshot of currently connected participants.
    ///
    /// Taken at call time; connects and disconnects after the snapshot are not
    /// reflected. No ordering guarantee.
    fn connected_participants(&self) -> Vec<ParticipantId>;

    /// Deliver one resolved packet to one listener.
    ///
    /// # Errors
    /// Returns a transport error for an unknown or gone listener. Callers
    /// treat this as per-listener accounting, never as an abort signal.
    fn send(&self, listener: &ParticipantId, packet: VoicePacket) -> Result<(), ContractError>;
}
