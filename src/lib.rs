// Copyright (c) 2025 - Cowboy AI, Inc.
//! Physical topology consistency engine for data-center inventory
//!
//! Keeps a graph of locations, rack groups, racks, devices and cables
//! consistent as it is edited:
//!
//! - **Location hierarchy**: location types form a tree; each location's
//!   parent must be of its type's parent type (or its own, for nestable types)
//! - **Placement**: rack groups, racks, devices and power panels may only sit
//!   in locations whose type permits them, inside their parent's location subtree
//! - **Cascades**: moving a rack group or rack moves everything beneath it,
//!   all or nothing
//! - **Cabling**: cables join compatible, connectable terminations, one cable
//!   per termination, with cached peers on both ends
//!
//! Every accepted change queues a [`TopologyEvent`]; [`nats::ChangePublisher`]
//! ships them over NATS.
//!
//! ```
//! use dcim_topology::{ContentType, Location, LocationType, Rack, Topology};
//!
//! let mut topology = Topology::new();
//! let site = topology
//!     .save_location_type(LocationType::new("Site-like").with_content_types([ContentType::Rack]))
//!     .unwrap();
//! let hall = topology.save_location(Location::new("Hall 1", site)).unwrap();
//! topology.save_rack(Rack::new("R1", hall)).unwrap();
//! assert_eq!(topology.take_uncommitted_events().len(), 3);
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod logging;
pub mod nats;
pub mod subjects;
pub mod topology;

pub use config::EngineConfig;
pub use domain::*;
pub use errors::{Field, TopologyError, TopologyResult, ValidationError, ValidationErrors, ValidationResult};
pub use events::{ChangeAction, ObjectRef, TopologyEvent};
pub use nats::{ChangeHandler, ChangeProcessor, ChangePublisher, EventSink, NatsClient, NatsConfig};
pub use subjects::SubjectBuilder;
pub use topology::{CablePath, CascadePlan, ComponentRecord, PathHop, Topology};
