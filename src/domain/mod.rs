// Copyright (c) 2025 - Cowboy AI, Inc.
//! Physical Topology Domain Models
//!
//! Entities of the DCIM data model and the pure rules that govern them.
//! Nothing in this module looks objects up; the [`crate::topology`] engine
//! resolves references and feeds the results into [`invariants`].
//!
//! # Location Hierarchy
//!
//! - [`LocationType`] - schema node fixing parent type and permitted content
//! - [`Location`] - containment tree node typed by a [`LocationType`]
//!
//! # Placement
//!
//! - [`RackGroup`], [`Rack`], [`Device`], [`PowerPanel`] - objects placed at a location
//! - [`ContentType`] - which of those a location type admits
//!
//! # Cabling
//!
//! - [`Component`] - any cable-connectable endpoint, tagged by [`TerminationKind`]
//! - [`TerminationRef`] - typed endpoint reference used by [`Cable`]
//! - [`Cable`] - physical link between two terminations

pub mod cable;
pub mod components;
pub mod content_type;
pub mod ids;
pub mod invariants;
pub mod location;
pub mod racks;

pub use cable::{Cable, CableStatus, LengthUnit};
pub use components::{
    CircuitTermination, Component, DevicePort, FrontPort, Interface, InterfaceType, PowerFeed,
    RearPort, TermSide, TerminationKind, TerminationRef,
};
pub use content_type::ContentType;
pub use ids::{
    CableId, CircuitId, ComponentId, DeviceId, LocationId, LocationTypeId, ObjectKind,
    PowerPanelId, ProviderNetworkId, RackGroupId, RackId, RedundancyGroupId, TenantId,
};
pub use invariants::CableEnd;
pub use location::{round_coordinate, Location, LocationStatus, LocationType};
pub use racks::{Device, DeviceFace, PowerPanel, Rack, RackGroup, RackStatus};
