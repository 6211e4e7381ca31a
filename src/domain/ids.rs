// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity Value Objects
//!
//! Every entity in the topology is addressed by a UUID v7 newtype so that a
//! `RackId` can never be handed to something expecting a `DeviceId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a [`LocationType`](super::LocationType)
    LocationTypeId
);
define_id!(
    /// Identifier of a [`Location`](super::Location)
    LocationId
);
define_id!(
    /// Identifier of a [`RackGroup`](super::RackGroup)
    RackGroupId
);
define_id!(
    /// Identifier of a [`Rack`](super::Rack)
    RackId
);
define_id!(
    /// Identifier of a [`Device`](super::Device)
    DeviceId
);
define_id!(
    /// Identifier of a [`PowerPanel`](super::PowerPanel)
    PowerPanelId
);
define_id!(
    /// Identifier shared by every cable-connectable component
    ComponentId
);
define_id!(
    /// Identifier of a [`Cable`](super::Cable)
    CableId
);
define_id!(CircuitId);
define_id!(ProviderNetworkId);
define_id!(TenantId);
define_id!(RedundancyGroupId);

/// Kinds of objects the topology stores, used for lookups and change events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    LocationType,
    Location,
    RackGroup,
    Rack,
    Device,
    PowerPanel,
    Component,
    Cable,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::LocationType => write!(f, "location_type"),
            ObjectKind::Location => write!(f, "location"),
            ObjectKind::RackGroup => write!(f, "rack_group"),
            ObjectKind::Rack => write!(f, "rack"),
            ObjectKind::Device => write!(f, "device"),
            ObjectKind::PowerPanel => write!(f, "power_panel"),
            ObjectKind::Component => write!(f, "component"),
            ObjectKind::Cable => write!(f, "cable"),
        }
    }
}
