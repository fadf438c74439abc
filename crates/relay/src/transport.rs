//! ChannelTransport - in-process delivery over per-listener queues
//!
//! Each connected participant owns one bounded mpsc queue; send is a
//! non-blocking `try_send` so one slow listener can never stall a flush. A
//! full queue drops that listener's packet (counted), a closed queue reports
//! an error back for accounting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use contracts::{ContractError, ParticipantId, VoicePacket, VoiceTransport};

/// Connection-state-owning transport backed by tokio mpsc queues.
///
/// Thread-safe: the roster sits behind an `RwLock`, so concurrent flushes and
/// connect/disconnect calls interleave safely. Snapshots are taken under the
/// read lock and are stale the moment they return, which is exactly the
/// contract the dispatch stage expects.
pub struct ChannelTransport {
    /// Relay name (used for logging)
    name: String,
    /// Listener roster: participant id -> outbound queue
    listeners: RwLock<HashMap<ParticipantId, mpsc::Sender<VoicePacket>>>,
    /// Packets dropped because a listener queue was full
    dropped: AtomicU64,
}

impl ChannelTransport {
    /// Create an empty transport.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: RwLock::new(HashMap::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Connect a participant, returning the receiving end of its queue.
    ///
    /// Reconnecting an already-connected id replaces its queue; the old
    /// receiver closes.
    pub fn connect(
        &self,
        id: ParticipantId,
        queue_capacity: usize,
    ) -> mpsc::Receiver<VoicePacket> {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let previous = self
            .listeners
            .write()
            .expect("listener roster lock poisoned")
            .insert(id.clone(), tx);

        if previous.is_some() {
            debug!(relay = %self.name, participant = %id, "Participant reconnected");
        } else {
            debug!(relay = %self.name, participant = %id, "Participant connected");
        }
        rx
    }

    /// Disconnect a participant. Its queue closes once in-flight packets drain.
    pub fn disconnect(&self, id: &str) {
        let removed = self
            .listeners
            .write()
            .expect("listener roster lock poisoned")
            .remove(id);
        if removed.is_some() {
            debug!(relay = %self.name, participant = %id, "Participant disconnected");
        }
    }

    /// Number of connected participants.
    pub fn connected_count(&self) -> usize {
        self.listeners
            .read()
            .expect("listener roster lock poisoned")
            .len()
    }

    /// Packets dropped due to full listener queues.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl VoiceTransport for ChannelTransport {
    fn connected_participants(&self) -> Vec<ParticipantId> {
        self.listeners
            .read()
            .expect("listener roster lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn send(&self, listener: &ParticipantId, packet: VoicePacket) -> Result<(), ContractError> {
        let tx = {
            let roster = self.listeners.read().expect("listener roster lock poisoned");
            match roster.get(listener.as_str()) {
                Some(tx) => tx.clone(),
                None => {
                    // Listener left between snapshot and flush; not an error
                    // worth failing the flush over, but worth surfacing.
                    return Err(ContractError::transport_send(
                        listener.as_str(),
                        "listener not connected",
                    ));
                }
            }
        };

        match tx.try_send(packet) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    relay = %self.name,
                    participant = %listener,
                    "Listener queue full, packet dropped"
                );
                // Drop-on-full is delivery policy, not a flush failure
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(
                    relay = %self.name,
                    participant = %listener,
                    "Listener queue closed unexpectedly"
                );
                Err(ContractError::transport_closed(listener.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::VoiceProperties;

    fn packet(volume: i32) -> VoicePacket {
        VoicePacket::new(
            "speaker".into(),
            Bytes::from_static(b"opus"),
            volume,
            VoiceProperties::empty(),
        )
    }

    #[tokio::test]
    async fn test_connect_send_receive() {
        let transport = ChannelTransport::new("test");
        let mut rx = transport.connect("alice".into(), 4);

        assert_eq!(transport.connected_count(), 1);
        transport.send(&"alice".into(), packet(70)).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.volume, 70);
        assert_eq!(received.source, "speaker");
    }

    #[tokio::test]
    async fn test_send_to_unknown_listener() {
        let transport = ChannelTransport::new("test");
        let result = transport.send(&"ghost".into(), packet(100));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let transport = ChannelTransport::new("test");
        let _rx = transport.connect("slow".into(), 1);

        transport.send(&"slow".into(), packet(100)).unwrap();
        // Queue is full now; this one is dropped but send still reports Ok
        transport.send(&"slow".into(), packet(100)).unwrap();

        assert_eq!(transport.dropped_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_queue_reports_error() {
        let transport = ChannelTransport::new("test");
        let rx = transport.connect("gone".into(), 1);
        drop(rx);

        let result = transport.send(&"gone".into(), packet(100));
        assert!(matches!(
            result,
            Err(ContractError::TransportClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_disconnect_removes_from_snapshot() {
        let transport = ChannelTransport::new("test");
        let _a = transport.connect("alice".into(), 4);
        let _b = transport.connect("bob".into(), 4);
        assert_eq!(transport.connected_participants().len(), 2);

        transport.disconnect("alice");
        let snapshot = transport.connected_participants();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0], "bob");
    }
}
