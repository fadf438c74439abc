//! RelayBlueprint - Config Loader output
//!
//! Describes a full relay deployment: server identity, intake limits,
//! delivery queues, metrics, and the simulated roster used by demo runs.

use serde::{Deserialize, Serialize};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Server settings
    pub server: ServerConfig,

    /// Frame intake settings
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Per-listener delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Metrics exporter settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Participant roster for simulated (demo) runs
    #[serde(default)]
    pub participants: Vec<ParticipantConfig>,
}

/// Server identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Human-readable relay name (used in logs and metrics labels)
    pub name: String,
}

/// Frame intake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Capacity of the inbound frame queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Frames with larger payloads are rejected at intake
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_max_payload_bytes() -> usize {
    8192
}

/// Per-listener delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Capacity of each listener's outbound packet queue
    #[serde(default = "default_listener_queue_capacity")]
    pub listener_queue_capacity: usize,

    /// Volume used by the default broadcast policy.
    ///
    /// Deliberately not range-checked; see `VoicePacket::volume`.
    #[serde(default = "default_volume")]
    pub default_volume: i32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            listener_queue_capacity: default_listener_queue_capacity(),
            default_volume: default_volume(),
        }
    }
}

fn default_listener_queue_capacity() -> usize {
    64
}

fn default_volume() -> i32 {
    100
}

/// Metrics exporter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus listener port (None or 0 = disabled)
    #[serde(default)]
    pub port: Option<u16>,
}

/// One participant in the simulated roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Session identity
    pub id: String,

    /// Whether this participant produces frames in demo runs
    #[serde(default)]
    pub speaks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let intake = IntakeConfig::default();
        assert_eq!(intake.queue_capacity, 256);
        assert_eq!(intake.max_payload_bytes, 8192);

        let delivery = DeliveryConfig::default();
        assert_eq!(delivery.listener_queue_capacity, 64);
        assert_eq!(delivery.default_volume, 100);
    }

    #[test]
    fn test_minimal_json() {
        let bp: RelayBlueprint =
            serde_json::from_str(r#"{"server": {"name": "relay-1"}}"#).unwrap();
        assert_eq!(bp.server.name, "relay-1");
        assert_eq!(bp.version, ConfigVersion::V1);
        assert!(bp.participants.is_empty());
        assert_eq!(bp.metrics.port, None);
    }
}
