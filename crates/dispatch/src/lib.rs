//! # Dispatch
//!
//! The dispatch stage of the voice relay.
//!
//! Responsible for:
//! - Accumulating per-listener delivery decisions for one audio frame
//! - Resolving repeated instructions ("loudest wins unless forced")
//! - Running registered dispatch policies in order
//! - Flushing the resolved target set to the transport in one pass

pub mod context;
pub mod intake;
pub mod metrics;
pub mod policy;

pub use contracts::{VoiceFrame, VoicePacket, VoiceProperties, VoiceTransport};
pub use context::{DispatchContext, FlushReport, DEFAULT_VOLUME};
pub use intake::{dispatch_frame, DispatchOutcome};
pub use metrics::{DispatchMetrics, DispatchSnapshot};
pub use policy::{BroadcastPolicy, DispatchPolicy, FnPolicy, PolicyRegistry};
