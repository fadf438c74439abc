//! # Integration Tests
//!
//! End-to-end tests for the voice relay.
//!
//! Responsible for:
//! - Contract smoke tests
//! - Simulated e2e dispatch (no live audio source required)
//! - Config-to-relay wiring

#[cfg(test)]
mod contract_tests {
    use contracts::{ParticipantId, VoicePacket, VoiceProperties};
    use bytes::Bytes;

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_participant_id_compares_by_content() {
        let a = ParticipantId::from("alice");
        let b = ParticipantId::from("alice".to_string());
        assert_eq!(a, b);
        assert_eq!(a, "alice");
    }

    #[test]
    fn test_packet_carries_unclamped_volume() {
        let packet = VoicePacket::new(
            "alice".into(),
            Bytes::from_static(b"pcm"),
            250,
            VoiceProperties::empty(),
        );
        assert_eq!(packet.volume, 250);
    }
}

#[cfg(test)]
mod e2e_tests {
    use bytes::Bytes;
    use contracts::{VoiceFrame, VoicePacket};
    use dispatch::{BroadcastPolicy, FnPolicy, PolicyRegistry};
    use relay::{ChannelTransport, RelayConfig, VoiceRelay};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn drain(
        rx: &mut mpsc::Receiver<VoicePacket>,
    ) -> Vec<VoicePacket> {
        let mut packets = Vec::new();
        while let Some(packet) = rx.recv().await {
            packets.push(packet);
        }
        packets
    }

    /// End-to-end: frames from a speaker fan out to every connected
    /// participant, the speaker included.
    #[tokio::test]
    async fn test_e2e_broadcast_includes_speaker() {
        let transport = Arc::new(ChannelTransport::new("e2e"));
        let mut alice_rx = transport.connect("alice".into(), 32);
        let mut bob_rx = transport.connect("bob".into(), 32);

        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(100)));

        let (tx, rx) = mpsc::channel(16);
        let voice_relay =
            VoiceRelay::new(RelayConfig::default(), Arc::clone(&transport), registry, rx);
        let metrics = voice_relay.metrics();
        let handle = voice_relay.spawn();

        for seq in 0..3u8 {
            tx.send(VoiceFrame::new("alice", Bytes::from(vec![seq; 4])))
                .await
                .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        transport.disconnect("alice");
        transport.disconnect("bob");

        let alice_packets = drain(&mut alice_rx).await;
        let bob_packets = drain(&mut bob_rx).await;

        assert_eq!(alice_packets.len(), 3, "speaker hears their own frames");
        assert_eq!(bob_packets.len(), 3);
        for packet in alice_packets.iter().chain(bob_packets.iter()) {
            assert_eq!(packet.source, "alice");
            assert_eq!(packet.volume, 100);
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_dispatched, 3);
        assert_eq!(snapshot.packets_sent, 6);
        assert_eq!(snapshot.send_failures, 0);
    }

    /// A louder policy running after the broadcast wins per-listener volume
    /// arbitration without needing force.
    #[tokio::test]
    async fn test_e2e_loudest_policy_wins() {
        let transport = Arc::new(ChannelTransport::new("e2e-arb"));
        let mut bob_rx = transport.connect("bob".into(), 8);

        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(40)));
        registry.register(Box::new(FnPolicy::new("proximity-boost", |ctx| {
            ctx.address_to_at("bob".into(), 90);
        })));

        let (tx, rx) = mpsc::channel(4);
        let voice_relay =
            VoiceRelay::new(RelayConfig::default(), Arc::clone(&transport), registry, rx);
        let handle = voice_relay.spawn();

        tx.send(VoiceFrame::new("alice", Bytes::from_static(b"pcm")))
            .await
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        transport.disconnect("bob");
        let packets = drain(&mut bob_rx).await;
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].volume, 90);
    }

    /// A cancel decision anywhere in the chain suppresses delivery entirely.
    #[tokio::test]
    async fn test_e2e_cancel_suppresses_delivery() {
        let transport = Arc::new(ChannelTransport::new("e2e-cancel"));
        let mut bob_rx = transport.connect("bob".into(), 8);

        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(100)));
        registry.register(Box::new(FnPolicy::new("mute-all", |ctx| {
            ctx.cancel();
        })));

        let (tx, rx) = mpsc::channel(4);
        let voice_relay =
            VoiceRelay::new(RelayConfig::default(), Arc::clone(&transport), registry, rx);
        let metrics = voice_relay.metrics();
        let handle = voice_relay.spawn();

        tx.send(VoiceFrame::new("alice", Bytes::from_static(b"pcm")))
            .await
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        transport.disconnect("bob");
        let packets = drain(&mut bob_rx).await;
        assert!(packets.is_empty());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_canceled, 1);
        assert_eq!(snapshot.packets_sent, 0);
    }

    /// Config wiring: a blueprint loaded from TOML drives a working relay.
    #[tokio::test]
    async fn test_e2e_config_to_relay() {
        const CONFIG: &str = r#"
[server]
name = "relay-e2e"

[intake]
queue_capacity = 16
max_payload_bytes = 64

[delivery]
listener_queue_capacity = 8
default_volume = 75

[[participants]]
id = "alice"
speaks = true

[[participants]]
id = "bob"
"#;
        let blueprint = config_loader::ConfigLoader::load_from_str(
            CONFIG,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let transport = Arc::new(ChannelTransport::new(blueprint.server.name.clone()));
        let mut receivers = Vec::new();
        for participant in &blueprint.participants {
            receivers.push((
                participant.id.clone(),
                transport.connect(
                    participant.id.as_str().into(),
                    blueprint.delivery.listener_queue_capacity,
                ),
            ));
        }

        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(
            blueprint.delivery.default_volume,
        )));

        let relay_config = RelayConfig {
            name: blueprint.server.name.clone(),
            max_payload_bytes: blueprint.intake.max_payload_bytes,
        };

        let (tx, rx) = mpsc::channel(blueprint.intake.queue_capacity);
        let voice_relay = VoiceRelay::new(relay_config, Arc::clone(&transport), registry, rx);
        let handle = voice_relay.spawn();

        tx.send(VoiceFrame::new("alice", Bytes::from_static(b"frame")))
            .await
            .unwrap();
        // Oversized payload is rejected at intake, never delivered
        tx.send(VoiceFrame::new("alice", Bytes::from(vec![0u8; 65])))
            .await
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        for (id, mut rx) in receivers {
            transport.disconnect(&id);
            let packets = drain(&mut rx).await;
            assert_eq!(packets.len(), 1, "listener {} got one packet", id);
            assert_eq!(packets[0].volume, 75);
        }
    }

    /// Listener queues drop on overflow instead of failing the flush.
    #[tokio::test]
    async fn test_e2e_full_queue_drops_not_fails() {
        let transport = Arc::new(ChannelTransport::new("e2e-backpressure"));
        // Capacity 1, never drained until the relay finishes
        let mut bob_rx = transport.connect("bob".into(), 1);

        let mut registry = PolicyRegistry::new();
        registry.register(Box::new(BroadcastPolicy::new(100)));

        let (tx, rx) = mpsc::channel(8);
        let voice_relay =
            VoiceRelay::new(RelayConfig::default(), Arc::clone(&transport), registry, rx);
        let metrics = voice_relay.metrics();
        let handle = voice_relay.spawn();

        for _ in 0..4 {
            tx.send(VoiceFrame::new("alice", Bytes::from_static(b"pcm")))
                .await
                .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        transport.disconnect("bob");
        let packets = drain(&mut bob_rx).await;
        assert_eq!(packets.len(), 1);
        assert_eq!(transport.dropped_count(), 3);

        // Drops are not flush failures
        assert_eq!(metrics.snapshot().send_failures, 0);
    }
}
