//! Config validation
//!
//! Rules:
//! - server.name non-empty
//! - intake.queue_capacity > 0, intake.max_payload_bytes > 0
//! - delivery.listener_queue_capacity > 0
//! - participant ids unique and non-empty

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint};

/// Validate a RelayBlueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_server(blueprint)?;
    validate_intake(blueprint)?;
    validate_delivery(blueprint)?;
    validate_participants(blueprint)?;
    Ok(())
}

fn validate_server(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.server.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "server.name",
            "server name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_intake(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let intake = &blueprint.intake;

    if intake.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "intake.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }

    if intake.max_payload_bytes == 0 {
        return Err(ContractError::config_validation(
            "intake.max_payload_bytes",
            "max_payload_bytes must be > 0",
        ));
    }

    Ok(())
}

fn validate_delivery(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.delivery.listener_queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "delivery.listener_queue_capacity",
            "listener_queue_capacity must be > 0",
        ));
    }
    // delivery.default_volume is intentionally unvalidated: the volume domain
    // has no enforced range anywhere in the pipeline.
    Ok(())
}

fn validate_participants(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, participant) in blueprint.participants.iter().enumerate() {
        if participant.id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("participants[{idx}].id"),
                "participant id cannot be empty",
            ));
        }
        if !seen.insert(&participant.id) {
            return Err(ContractError::config_validation(
                format!("participants[id={}]", participant.id),
                "duplicate participant id",
            ));
        }
    }
    Ok(())
}
