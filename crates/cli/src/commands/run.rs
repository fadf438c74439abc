//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(port) = args.metrics_port {
        info!(port = %port, "Overriding metrics port from CLI");
        blueprint.metrics.port = if port == 0 { None } else { Some(port) };
    }

    let speakers = blueprint.participants.iter().filter(|p| p.speaks).count();
    info!(
        server = %blueprint.server.name,
        participants = blueprint.participants.len(),
        speakers,
        default_volume = blueprint.delivery.default_volume,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let metrics_port = blueprint.metrics.port;
    let pipeline_config = PipelineConfig {
        blueprint,
        frames_per_speaker: args.frames,
        // interval(0) panics; clamp to the smallest representable cadence
        frame_interval: Duration::from_millis(args.frame_interval_ms.max(1)),
        payload_bytes: args.payload_bytes,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port,
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting relay pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        frames_produced = stats.frames_produced,
                        frames_dispatched = stats.dispatch.frames_dispatched,
                        packets_sent = stats.dispatch.packets_sent,
                        duration_secs = stats.duration.as_secs_f64(),
                        fps = format!("{:.2}", stats.fps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Voice Relay finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Server:");
    println!("  Name: {}", blueprint.server.name);

    println!("\nIntake:");
    println!("  Queue capacity: {}", blueprint.intake.queue_capacity);
    println!("  Max payload bytes: {}", blueprint.intake.max_payload_bytes);

    println!("\nDelivery:");
    println!(
        "  Listener queue capacity: {}",
        blueprint.delivery.listener_queue_capacity
    );
    println!("  Default volume: {}", blueprint.delivery.default_volume);

    println!("\nParticipants ({}):", blueprint.participants.len());
    for participant in &blueprint.participants {
        let role = if participant.speaks {
            "speaker"
        } else {
            "listener"
        };
        println!("  - {} ({})", participant.id, role);
    }

    if let Some(port) = blueprint.metrics.port {
        println!("\nMetrics port: {}", port);
    }

    println!();
}
