//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic checks of the service config (serde handles syntax)
//! - Diagnostics for snapshots: bad profile fields, empty patterns,
//!   dangling profile references
//!
//! # Design Decisions
//! - Returns all problems, not just the first
//! - Service config problems reject the config; snapshot problems are only
//!   reported, because the engine tolerates them

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::snapshot::{Override, Snapshot, DIRECT_PROFILE_ID};

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate the service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.snapshot.watch && config.snapshot.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "snapshot.poll_interval_secs",
            "must be greater than 0",
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report problems in a snapshot. An empty list means the snapshot is clean.
pub fn validate_snapshot(snapshot: &Snapshot) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut profile_ids: Vec<&String> = snapshot.profiles.keys().collect();
    profile_ids.sort();
    for key in profile_ids {
        let profile = &snapshot.profiles[key];
        let field = format!("profiles.{key}");

        if key == DIRECT_PROFILE_ID {
            errors.push(ValidationError::new(
                &field,
                "\"direct\" is reserved for the built-in profile",
            ));
        }
        if &profile.id != key {
            errors.push(ValidationError::new(
                &field,
                format!("stored under a different id {:?}", profile.id),
            ));
        }
        if !profile.scheme.is_known() {
            errors.push(ValidationError::new(
                &field,
                format!("unknown scheme {:?} is passed through as-is", profile.scheme.as_str()),
            ));
        }
        if profile.name.trim().is_empty() {
            errors.push(ValidationError::new(&field, "name is required"));
        }
        if !profile.is_direct() {
            if profile.host.trim().is_empty() {
                errors.push(ValidationError::new(&field, "host is required"));
            }
            if profile.port == 0 {
                errors.push(ValidationError::new(&field, "port must be between 1 and 65535"));
            }
        }
    }

    for (index, rule) in snapshot.rules.iter().enumerate() {
        let field = format!("rules[{index}]");
        if rule.pattern.trim().is_empty() {
            errors.push(ValidationError::new(&field, "pattern is required"));
        }
        if !snapshot.has_profile(&rule.profile_id) {
            errors.push(ValidationError::new(
                &field,
                format!("references missing profile {:?}", rule.profile_id),
            ));
        }
    }

    let override_maps = [
        ("tabOverrides", &snapshot.tab_overrides),
        ("groupOverrides", &snapshot.group_overrides),
    ];
    for (name, overrides) in override_maps {
        let mut keys: Vec<&String> = overrides.keys().collect();
        keys.sort();
        for key in keys {
            let field = format!("{name}.{key}");
            if key.parse::<u64>().is_err() {
                errors.push(ValidationError::new(&field, "key is not a non-negative integer"));
            }
            if let Override::Profile { profile_id } = &overrides[key] {
                if !snapshot.has_profile(profile_id) {
                    errors.push(ValidationError::new(
                        &field,
                        format!("references missing profile {profile_id:?}"),
                    ));
                }
            }
        }
    }

    errors
}
