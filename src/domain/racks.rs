// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement Entities
//!
//! Rack groups, racks, devices and power panels. Each may reference a
//! location; the topology checks that the reference agrees with the
//! location type's permitted content and with any containing rack group.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    DeviceId, LocationId, PowerPanelId, RackGroupId, RackId, RedundancyGroupId, TenantId,
};

/// Named, nestable grouping of racks within a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackGroup {
    pub id: RackGroupId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RackGroupId>,
}

impl RackGroup {
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        Self {
            id: RackGroupId::new(),
            name: name.into(),
            location: Some(location),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: RackGroupId) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl fmt::Display for RackGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RackStatus {
    #[default]
    Active,
    Planned,
    Reserved,
    Available,
    Deprecated,
}

/// Equipment rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: RackId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_group: Option<RackGroupId>,
    #[serde(default)]
    pub status: RackStatus,
    /// Height in rack units
    pub u_height: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
}

impl Rack {
    pub const DEFAULT_U_HEIGHT: u16 = 42;

    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        Self {
            id: RackId::new(),
            name: name.into(),
            location: Some(location),
            rack_group: None,
            status: RackStatus::default(),
            u_height: Self::DEFAULT_U_HEIGHT,
            facility_id: None,
        }
    }

    pub fn with_group(mut self, rack_group: RackGroupId) -> Self {
        self.rack_group = Some(rack_group);
        self
    }

    pub fn with_u_height(mut self, u_height: u16) -> Self {
        self.u_height = u_height;
        self
    }

    pub fn with_facility_id(mut self, facility_id: impl Into<String>) -> Self {
        self.facility_id = Some(facility_id.into());
        self
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Rack face a device is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFace {
    Front,
    Rear,
}

/// Network device, optionally mounted in a rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<RackId>,
    /// Lowest rack unit occupied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<DeviceFace>,
    /// Height of the device type; zero for 0U equipment such as PDUs
    pub u_height: u16,
    #[serde(default)]
    pub is_full_depth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_group: Option<RedundancyGroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_group_priority: Option<u16>,
}

impl Device {
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        let name = name.into();
        Self {
            id: DeviceId::new(),
            name: if name.is_empty() { None } else { Some(name) },
            location: Some(location),
            rack: None,
            position: None,
            face: None,
            u_height: 1,
            is_full_depth: true,
            tenant: None,
            redundancy_group: None,
            redundancy_group_priority: None,
        }
    }

    /// Mount in a rack at `position` on `face`
    pub fn mounted(mut self, rack: RackId, position: u16, face: DeviceFace) -> Self {
        self.rack = Some(rack);
        self.position = Some(position);
        self.face = Some(face);
        self
    }

    /// Assign to a rack without a unit position
    pub fn in_rack(mut self, rack: RackId) -> Self {
        self.rack = Some(rack);
        self
    }

    pub fn with_u_height(mut self, u_height: u16) -> Self {
        self.u_height = u_height;
        self
    }

    pub fn half_depth(mut self) -> Self {
        self.is_full_depth = false;
        self
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }

    /// Rack units occupied, if mounted at a position
    pub fn occupied_units(&self) -> Option<std::ops::RangeInclusive<u16>> {
        match (self.position, self.u_height) {
            (Some(position), height) if height > 0 => Some(position..=position.saturating_add(height - 1)),
            _ => None,
        }
    }

    /// Name used in messages; unnamed devices display their id
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Electrical power panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerPanel {
    pub id: PowerPanelId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_group: Option<RackGroupId>,
}

impl PowerPanel {
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        Self {
            id: PowerPanelId::new(),
            name: name.into(),
            location: Some(location),
            rack_group: None,
        }
    }

    pub fn with_group(mut self, rack_group: RackGroupId) -> Self {
        self.rack_group = Some(rack_group);
        self
    }
}

impl fmt::Display for PowerPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_units() {
        let location = LocationId::new();
        let rack = RackId::new();
        let device = Device::new("sw1", location)
            .with_u_height(2)
            .mounted(rack, 10, DeviceFace::Front);
        assert_eq!(device.occupied_units(), Some(10..=11));

        let pdu = Device::new("pdu", location).with_u_height(0).in_rack(rack);
        assert_eq!(pdu.occupied_units(), None);
    }

    #[test]
    fn test_empty_name_is_unnamed() {
        let device = Device::new("", LocationId::new());
        assert!(device.name.is_none());
    }
}
