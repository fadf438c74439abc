//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    intake: IntakeInfo,
    delivery: DeliveryInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    participants: Vec<ParticipantInfo>,
}

#[derive(Serialize)]
struct ServerInfo {
    name: String,
}

#[derive(Serialize)]
struct IntakeInfo {
    queue_capacity: usize,
    max_payload_bytes: usize,
}

#[derive(Serialize)]
struct DeliveryInfo {
    listener_queue_capacity: usize,
    default_volume: i32,
}

#[derive(Serialize)]
struct ParticipantInfo {
    id: String,
    speaks: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let participants = if args.participants {
        blueprint
            .participants
            .iter()
            .map(|p| ParticipantInfo {
                id: p.id.clone(),
                speaks: p.speaks,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        server: ServerInfo {
            name: blueprint.server.name.clone(),
        },
        intake: IntakeInfo {
            queue_capacity: blueprint.intake.queue_capacity,
            max_payload_bytes: blueprint.intake.max_payload_bytes,
        },
        delivery: DeliveryInfo {
            listener_queue_capacity: blueprint.delivery.listener_queue_capacity,
            default_volume: blueprint.delivery.default_volume,
        },
        metrics_port: blueprint.metrics.port,
        participants,
    }
}

fn print_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Voice Relay Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Server info
    println!("📡 Server");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   └─ Name: {}", blueprint.server.name);

    // Intake
    println!("\n📥 Intake");
    println!("   ├─ Queue capacity: {}", blueprint.intake.queue_capacity);
    println!(
        "   └─ Max payload bytes: {}",
        blueprint.intake.max_payload_bytes
    );

    // Delivery
    println!("\n📤 Delivery");
    println!(
        "   ├─ Listener queue capacity: {}",
        blueprint.delivery.listener_queue_capacity
    );
    println!("   └─ Default volume: {}", blueprint.delivery.default_volume);

    // Metrics
    match blueprint.metrics.port {
        Some(port) => println!("\n📊 Metrics port: {}", port),
        None => println!("\n📊 Metrics: disabled"),
    }

    // Participants
    let speakers = blueprint.participants.iter().filter(|p| p.speaks).count();
    println!(
        "\n🎙️  Participants ({}, {} speaking)",
        blueprint.participants.len(),
        speakers
    );
    if args.participants {
        for (i, participant) in blueprint.participants.iter().enumerate() {
            let is_last = i == blueprint.participants.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            let role = if participant.speaks {
                "speaker"
            } else {
                "listener"
            };
            println!("   {} {} ({})", prefix, participant.id, role);
        }
    } else {
        println!("   └─ (run with --participants to list the roster)");
    }

    println!();
}
