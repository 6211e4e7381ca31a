// Copyright (c) 2025 - Cowboy AI, Inc.
//! Content Types
//!
//! The closed set of models a [`LocationType`](super::LocationType) can
//! permit at its locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model that may be associated with a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    RackGroup,
    Rack,
    Device,
    PowerPanel,
    CircuitTermination,
    Prefix,
    Vlan,
}

impl ContentType {
    /// All content types, in display order
    pub const ALL: [ContentType; 7] = [
        ContentType::RackGroup,
        ContentType::Rack,
        ContentType::Device,
        ContentType::PowerPanel,
        ContentType::CircuitTermination,
        ContentType::Prefix,
        ContentType::Vlan,
    ];

    /// Plural display name used in validation messages
    pub fn verbose_name_plural(&self) -> &'static str {
        match self {
            ContentType::RackGroup => "Rack groups",
            ContentType::Rack => "Racks",
            ContentType::Device => "Devices",
            ContentType::PowerPanel => "Power panels",
            ContentType::CircuitTermination => "Circuit terminations",
            ContentType::Prefix => "Prefixes",
            ContentType::Vlan => "VLANs",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentType::RackGroup => "dcim.rackgroup",
            ContentType::Rack => "dcim.rack",
            ContentType::Device => "dcim.device",
            ContentType::PowerPanel => "dcim.powerpanel",
            ContentType::CircuitTermination => "circuits.circuittermination",
            ContentType::Prefix => "ipam.prefix",
            ContentType::Vlan => "ipam.vlan",
        };
        write!(f, "{}", label)
    }
}
