//! Frame intake - cancellation as an explicit outcome
//!
//! The cancelable-event shape is re-modeled as a tri-state result: intake
//! builds the context, runs the policy chain, and either hands back an open
//! context to finalize or reports the frame as canceled. A canceled frame's
//! target map is dropped unread; the transport sees zero sends.

use tracing::debug;

use contracts::{VoiceFrame, VoiceTransport};

use crate::context::DispatchContext;
use crate::policy::PolicyRegistry;

/// Result of running one frame through the policy chain.
pub enum DispatchOutcome<'a> {
    /// Frame survived the chain; caller must finalize.
    Proceed(DispatchContext<'a>),
    /// A policy vetoed the frame; nothing was or will be sent.
    Canceled,
}

impl DispatchOutcome<'_> {
    /// True for the canceled arm.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Run one inbound frame through the registered policies.
///
/// Opens a context for the frame, applies every policy in registration order,
/// then converts the context's veto flag into the outcome. The caller decides
/// what to do with `Proceed` (normally: finalize immediately).
pub fn dispatch_frame<'a>(
    frame: VoiceFrame,
    transport: &'a dyn VoiceTransport,
    registry: &PolicyRegistry,
) -> DispatchOutcome<'a> {
    let mut ctx = DispatchContext::new(frame.speaker, frame.payload, transport);

    registry.apply_all(&mut ctx);

    if ctx.is_canceled() {
        debug!(speaker = %ctx.speaker(), "Frame canceled by policy");
        return DispatchOutcome::Canceled;
    }

    DispatchOutcome::Proceed(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BroadcastPolicy, FnPolicy};
    use bytes::Bytes;
    use contracts::{ContractError, ParticipantId, VoicePacket};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        connected: Vec<ParticipantId>,
        sends: AtomicUsize,
    }

    impl CountingTransport {
        fn new(connected: &[&str]) -> Self {
            Self {
                connected: connected.iter().map(|s| ParticipantId::from(*s)).collect(),
                sends: AtomicUsize::new(0),
            }
        }
    }

    impl VoiceTransport for CountingTransport {
        fn connected_participants(&self) -> Vec<ParticipantId> {
            self.connected.clone()
        }

        fn send(&self, _: &ParticipantId, _: VoicePacket) -> Result<(), ContractError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn frame() -> VoiceFrame {
        VoiceFrame::new("speaker", Bytes::from_static(b"opus"))
    }

    #[test]
    fn test_proceed_then_finalize() {
        let transport = CountingTransport::new(&["a", "b", "c"]);
        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(100)));

        match dispatch_frame(frame(), &transport, &registry) {
            DispatchOutcome::Proceed(ctx) => {
                assert_eq!(ctx.target_count(), 3);
                let report = ctx.finalize();
                assert_eq!(report.sent, 3);
            }
            DispatchOutcome::Canceled => panic!("frame should proceed"),
        }

        assert_eq!(transport.sends.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_canceled_frame_sends_nothing() {
        let transport = CountingTransport::new(&["a", "b"]);
        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(100)));
        registry.register(Box::new(FnPolicy::new("server-mute", |ctx| ctx.cancel())));

        let outcome = dispatch_frame(frame(), &transport, &registry);
        assert!(outcome.is_canceled());
        assert_eq!(transport.sends.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_registry_proceeds_with_no_targets() {
        let transport = CountingTransport::new(&["a"]);
        let registry = PolicyRegistry::new();

        match dispatch_frame(frame(), &transport, &registry) {
            DispatchOutcome::Proceed(ctx) => {
                assert_eq!(ctx.target_count(), 0);
                let report = ctx.finalize();
                assert_eq!(report.total(), 0);
            }
            DispatchOutcome::Canceled => panic!("frame should proceed"),
        }
    }
}
