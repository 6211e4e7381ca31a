// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration
//!
//! Tunables of the validation engine. Connection settings for change
//! publishing live with the client in [`crate::nats::NatsConfig`].

use serde::{Deserialize, Serialize};

use crate::errors::{TopologyError, TopologyResult};

/// Validation engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Names a location type may not take (compared case- and space-insensitively)
    pub reserved_location_type_names: Vec<String>,

    /// Deepest tree walked when resolving ancestry or cascading moves
    pub max_tree_depth: usize,

    /// Tallest rack accepted, in rack units
    pub max_rack_units: u16,

    /// Most positions a rear port may have
    pub max_rear_port_positions: u16,
}

impl EngineConfig {
    /// Parse a configuration document; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> TopologyResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| TopologyError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> TopologyResult<()> {
        if self.max_tree_depth == 0 {
            return Err(TopologyError::Configuration(
                "max_tree_depth must be at least 1".to_string(),
            ));
        }
        if self.max_rack_units == 0 {
            return Err(TopologyError::Configuration(
                "max_rack_units must be at least 1".to_string(),
            ));
        }
        if self.max_rear_port_positions == 0 {
            return Err(TopologyError::Configuration(
                "max_rear_port_positions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_reserved_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.reserved_location_type_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserved_location_type_names: vec![
                "region".to_string(),
                "site".to_string(),
                "rackgroup".to_string(),
            ],
            max_tree_depth: 64,
            max_rack_units: 100,
            max_rear_port_positions: 1024,
        }
    }
}
