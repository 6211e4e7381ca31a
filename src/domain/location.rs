// Copyright (c) 2025 - Cowboy AI, Inc.
//! Location Hierarchy Entities
//!
//! A [`LocationType`] is a schema node: it fixes which type a location's
//! parent must have and which models may be placed at its locations. A
//! [`Location`] is an instance of that schema in the containment tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{ContentType, LocationId, LocationTypeId};

/// Schema node of the location tree
///
/// # Invariants
/// - Name is not reserved and is unique among location types
/// - Parent cannot change once any location uses this type
/// - Parent links form a forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationType {
    pub id: LocationTypeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<LocationTypeId>,
    #[serde(default)]
    pub nestable: bool,
    #[serde(default)]
    pub content_types: BTreeSet<ContentType>,
    #[serde(default)]
    pub description: String,
}

impl LocationType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LocationTypeId::new(),
            name: name.into(),
            parent: None,
            nestable: false,
            content_types: BTreeSet::new(),
            description: String::new(),
        }
    }

    pub fn with_parent(mut self, parent: LocationTypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn nestable(mut self) -> Self {
        self.nestable = true;
        self
    }

    pub fn with_content_types(mut self, content_types: impl IntoIterator<Item = ContentType>) -> Self {
        self.content_types.extend(content_types);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether locations of this type may host `content_type`
    pub fn permits(&self, content_type: ContentType) -> bool {
        self.content_types.contains(&content_type)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Operational status of a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    #[default]
    Active,
    Planned,
    Staging,
    Decommissioning,
    Retired,
}

/// Node of the containment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub location_type: LocationTypeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<LocationId>,
    #[serde(default)]
    pub status: LocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl Location {
    pub fn new(name: impl Into<String>, location_type: LocationTypeId) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            location_type,
            parent: None,
            status: LocationStatus::default(),
            latitude: None,
            longitude: None,
            description: String::new(),
        }
    }

    pub fn with_parent(mut self, parent: LocationId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_status(mut self, status: LocationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Round a GPS coordinate to the six decimal places that are stored
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
