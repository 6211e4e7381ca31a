// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Engine
//!
//! The [`Topology`] is the in-memory arena holding every location, placement
//! object, component and cable, together with the parent → children indexes
//! the engine walks. It is the single consistency boundary: every mutation
//! goes through a `save_*` or `delete_*` method that validates against the
//! current state, builds the full change set and only then writes.
//!
//! # Operation Flow
//!
//! ```text
//! save_x(proposed)
//!   → validate_x(proposed)      field-keyed errors, nothing written
//!   → plan cascade / peers      still nothing written
//!   → apply                     entity, children, caches
//!   → record events             one per object touched
//! ```
//!
//! # Modules
//!
//! - [`hierarchy`] - location types and locations
//! - [`placement`] - rack groups, racks, devices, power panels
//! - [`cascade`] - moving a rack group or rack with its contents
//! - [`cabling`] - components, cables and cached peers
//! - [`trace`] - following a cable path through pass-through ports

pub mod cabling;
pub mod cascade;
pub mod hierarchy;
pub mod index;
pub mod placement;
pub mod trace;

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{
    Cable, CableId, Component, ComponentId, Device, DeviceId, Location, LocationId, LocationType,
    LocationTypeId, ObjectKind, PowerPanel, PowerPanelId, Rack, RackGroup, RackGroupId, RackId,
    TerminationRef,
};
use crate::errors::{TopologyError, TopologyResult, ValidationErrors};
use crate::events::{ChangeAction, ObjectRef, TopologyEvent};

pub use cascade::CascadePlan;
pub use index::Adjacency;
pub use trace::{CablePath, PathHop};

/// Stored component with its cable caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub component: Component,
    /// Cable attached to this component
    pub cable: Option<CableId>,
    /// Cached far end of that cable
    #[serde(rename = "_cable_peer")]
    pub cable_peer: Option<TerminationRef>,
}

impl ComponentRecord {
    fn new(component: Component) -> Self {
        Self {
            component,
            cable: None,
            cable_peer: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Indexes {
    type_children: Adjacency<LocationTypeId, LocationTypeId>,
    locations_by_type: Adjacency<LocationTypeId, LocationId>,
    location_children: Adjacency<LocationId, LocationId>,
    group_children: Adjacency<RackGroupId, RackGroupId>,
    groups_by_location: Adjacency<LocationId, RackGroupId>,
    racks_by_group: Adjacency<RackGroupId, RackId>,
    racks_by_location: Adjacency<LocationId, RackId>,
    panels_by_group: Adjacency<RackGroupId, PowerPanelId>,
    panels_by_location: Adjacency<LocationId, PowerPanelId>,
    devices_by_rack: Adjacency<RackId, DeviceId>,
    devices_by_location: Adjacency<LocationId, DeviceId>,
    components_by_device: Adjacency<DeviceId, ComponentId>,
    front_ports_by_rear: Adjacency<ComponentId, ComponentId>,
    feeds_by_panel: Adjacency<PowerPanelId, ComponentId>,
    feeds_by_rack: Adjacency<RackId, ComponentId>,
    terminations_by_location: Adjacency<LocationId, ComponentId>,
}

/// Index keys a component is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ComponentLinks {
    device: Option<DeviceId>,
    rear_port: Option<ComponentId>,
    power_panel: Option<PowerPanelId>,
    rack: Option<RackId>,
    location: Option<LocationId>,
}

impl ComponentLinks {
    fn of(component: &Component) -> Self {
        let mut links = ComponentLinks {
            device: component.device(),
            ..Default::default()
        };
        match component {
            Component::FrontPort(port) => links.rear_port = Some(port.rear_port),
            Component::PowerFeed(feed) => {
                links.power_panel = Some(feed.power_panel);
                links.rack = feed.rack;
            }
            Component::CircuitTermination(termination) => links.location = termination.location,
            _ => {}
        }
        links
    }
}

/// Walk parent links upward from `start`, stopping after `limit + 1` steps
///
/// The extra step lets callers detect a chain deeper than `limit`.
pub(crate) fn ancestry<T, F>(start: Option<T>, parent: F, limit: usize) -> Vec<T>
where
    T: Copy,
    F: Fn(T) -> Option<T>,
{
    let mut chain = Vec::new();
    let mut current = start;
    while let Some(node) = current {
        chain.push(node);
        if chain.len() > limit {
            break;
        }
        current = parent(node);
    }
    chain
}

/// In-memory DCIM topology and its consistency engine
#[derive(Debug, Clone)]
pub struct Topology {
    config: EngineConfig,

    location_types: HashMap<LocationTypeId, LocationType>,
    locations: HashMap<LocationId, Location>,
    rack_groups: HashMap<RackGroupId, RackGroup>,
    racks: HashMap<RackId, Rack>,
    devices: HashMap<DeviceId, Device>,
    power_panels: HashMap<PowerPanelId, PowerPanel>,
    components: HashMap<ComponentId, ComponentRecord>,
    cables: HashMap<CableId, Cable>,

    index: Indexes,

    /// Number of changes recorded
    version: u64,

    /// Changes not yet taken by a publisher
    uncommitted_events: Vec<TopologyEvent>,

    correlation_id: Uuid,
    last_event_id: Option<Uuid>,
    in_transaction: bool,
}

impl Topology {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            location_types: HashMap::new(),
            locations: HashMap::new(),
            rack_groups: HashMap::new(),
            racks: HashMap::new(),
            devices: HashMap::new(),
            power_panels: HashMap::new(),
            components: HashMap::new(),
            cables: HashMap::new(),
            index: Indexes::default(),
            version: 0,
            uncommitted_events: Vec::new(),
            correlation_id: Uuid::now_v7(),
            last_event_id: None,
            in_transaction: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Pending change events
    pub fn uncommitted_events(&self) -> &[TopologyEvent] {
        &self.uncommitted_events
    }

    /// Get uncommitted events and clear the list
    pub fn take_uncommitted_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Put events back at the front of the pending queue, ahead of newer ones
    pub fn requeue_events(&mut self, events: impl IntoIterator<Item = TopologyEvent>) {
        let mut queue: Vec<TopologyEvent> = events.into_iter().collect();
        queue.append(&mut self.uncommitted_events);
        self.uncommitted_events = queue;
    }

    /// Run several operations as one unit
    ///
    /// All events recorded inside share one correlation id. If the closure
    /// fails, every entity, index and pending event is restored to its state
    /// before the call.
    pub fn atomic<T, F>(&mut self, operations: F) -> TopologyResult<T>
    where
        F: FnOnce(&mut Self) -> TopologyResult<T>,
    {
        self.begin_change();
        let snapshot = self.clone();
        let outer = self.in_transaction;
        self.in_transaction = true;

        match operations(self) {
            Ok(value) => {
                self.in_transaction = outer;
                Ok(value)
            }
            Err(error) => {
                warn!(error = %error, "Rolling back topology transaction");
                *self = snapshot;
                Err(error)
            }
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn location_type(&self, id: LocationTypeId) -> Option<&LocationType> {
        self.location_types.get(&id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn rack_group(&self, id: RackGroupId) -> Option<&RackGroup> {
        self.rack_groups.get(&id)
    }

    pub fn rack(&self, id: RackId) -> Option<&Rack> {
        self.racks.get(&id)
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn power_panel(&self, id: PowerPanelId) -> Option<&PowerPanel> {
        self.power_panels.get(&id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id).map(|record| &record.component)
    }

    /// Component with its cable and cached peer
    pub fn component_record(&self, id: ComponentId) -> Option<&ComponentRecord> {
        self.components.get(&id)
    }

    pub fn cable(&self, id: CableId) -> Option<&Cable> {
        self.cables.get(&id)
    }

    pub fn location_types(&self) -> impl Iterator<Item = &LocationType> {
        self.location_types.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn rack_groups(&self) -> impl Iterator<Item = &RackGroup> {
        self.rack_groups.values()
    }

    pub fn racks(&self) -> impl Iterator<Item = &Rack> {
        self.racks.values()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn power_panels(&self) -> impl Iterator<Item = &PowerPanel> {
        self.power_panels.values()
    }

    pub fn cables(&self) -> impl Iterator<Item = &Cable> {
        self.cables.values()
    }

    pub fn child_locations(&self, id: LocationId) -> impl Iterator<Item = &Location> {
        self.index
            .location_children
            .children(id)
            .filter_map(move |child| self.locations.get(&child))
    }

    pub fn child_rack_groups(&self, id: RackGroupId) -> impl Iterator<Item = &RackGroup> {
        self.index
            .group_children
            .children(id)
            .filter_map(move |child| self.rack_groups.get(&child))
    }

    pub fn racks_in_group(&self, id: RackGroupId) -> impl Iterator<Item = &Rack> {
        self.index
            .racks_by_group
            .children(id)
            .filter_map(move |rack| self.racks.get(&rack))
    }

    pub fn devices_in_rack(&self, id: RackId) -> impl Iterator<Item = &Device> {
        self.index
            .devices_by_rack
            .children(id)
            .filter_map(move |device| self.devices.get(&device))
    }

    pub fn components_of_device(&self, id: DeviceId) -> impl Iterator<Item = &Component> {
        self.index
            .components_by_device
            .children(id)
            .filter_map(move |component| self.component(component))
    }

    /// Front ports mapped onto a rear port
    pub fn front_ports_of(&self, rear_port: ComponentId) -> impl Iterator<Item = &Component> {
        self.index
            .front_ports_by_rear
            .children(rear_port)
            .filter_map(move |component| self.component(component))
    }

    pub(crate) fn require_location_type(&self, id: LocationTypeId) -> TopologyResult<&LocationType> {
        self.location_types
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::LocationType, id))
    }

    pub(crate) fn require_location(&self, id: LocationId) -> TopologyResult<&Location> {
        self.locations
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::Location, id))
    }

    pub(crate) fn require_rack_group(&self, id: RackGroupId) -> TopologyResult<&RackGroup> {
        self.rack_groups
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::RackGroup, id))
    }

    pub(crate) fn require_rack(&self, id: RackId) -> TopologyResult<&Rack> {
        self.racks
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::Rack, id))
    }

    pub(crate) fn require_device(&self, id: DeviceId) -> TopologyResult<&Device> {
        self.devices
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::Device, id))
    }

    pub(crate) fn require_power_panel(&self, id: PowerPanelId) -> TopologyResult<&PowerPanel> {
        self.power_panels
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::PowerPanel, id))
    }

    pub(crate) fn require_component(&self, id: ComponentId) -> TopologyResult<&ComponentRecord> {
        self.components
            .get(&id)
            .ok_or_else(|| TopologyError::not_found(ObjectKind::Component, id))
    }

    /// Type of a location, which must exist
    pub(crate) fn type_of_location(&self, id: LocationId) -> TopologyResult<&LocationType> {
        let location = self.require_location(id)?;
        self.require_location_type(location.location_type)
    }

    // ========================================================================
    // Ancestry
    // ========================================================================

    /// `id` followed by its ancestors, nearest first
    pub fn location_ancestry(&self, id: LocationId) -> Vec<LocationId> {
        self.location_ancestry_with(id, None)
    }

    /// Ancestry with one location's parent replaced by a proposed value
    pub(crate) fn location_ancestry_with(
        &self,
        id: LocationId,
        reparent: Option<(LocationId, Option<LocationId>)>,
    ) -> Vec<LocationId> {
        ancestry(
            Some(id),
            |node| match reparent {
                Some((moved, parent)) if moved == node => parent,
                _ => self.locations.get(&node).and_then(|l| l.parent),
            },
            self.config.max_tree_depth,
        )
    }

    /// Whether `location` is `ancestor` or lies beneath it
    pub fn location_within(&self, location: LocationId, ancestor: LocationId) -> bool {
        self.location_ancestry(location).contains(&ancestor)
    }

    pub(crate) fn location_within_with(
        &self,
        location: LocationId,
        ancestor: LocationId,
        reparent: Option<(LocationId, Option<LocationId>)>,
    ) -> bool {
        self.location_ancestry_with(location, reparent)
            .contains(&ancestor)
    }

    pub(crate) fn location_type_ancestry(&self, id: LocationTypeId) -> Vec<LocationTypeId> {
        ancestry(
            Some(id),
            |node| self.location_types.get(&node).and_then(|t| t.parent),
            self.config.max_tree_depth,
        )
    }

    pub(crate) fn rack_group_ancestry(&self, id: RackGroupId) -> Vec<RackGroupId> {
        ancestry(
            Some(id),
            |node| self.rack_groups.get(&node).and_then(|g| g.parent),
            self.config.max_tree_depth,
        )
    }

    /// Display name of an optional location for messages
    pub(crate) fn location_label(&self, id: Option<LocationId>) -> String {
        id.and_then(|id| self.locations.get(&id))
            .map(|l| l.name.clone())
            .unwrap_or_else(|| "None".to_string())
    }

    // ========================================================================
    // Change recording
    // ========================================================================

    /// Start a new operation unless inside [`Topology::atomic`]
    pub(crate) fn begin_change(&mut self) {
        if !self.in_transaction {
            self.correlation_id = Uuid::now_v7();
            self.last_event_id = None;
        }
    }

    pub(crate) fn record(&mut self, action: ChangeAction, object: ObjectRef) {
        let event = TopologyEvent::new(action, object, self.correlation_id, self.last_event_id);
        debug!(subject = %event.subject(), "Recorded topology change");
        self.last_event_id = Some(event.event_id);
        self.version += 1;
        self.uncommitted_events.push(event);
    }

    /// Turn collected violations into the operation result
    pub(crate) fn conclude(errors: ValidationErrors, object: &impl Display) -> TopologyResult<()> {
        if errors.is_empty() {
            return Ok(());
        }
        warn!(object = %object, errors = %errors, "Rejected topology change");
        Err(TopologyError::Validation(errors))
    }

    // ========================================================================
    // Storage with index maintenance
    // ========================================================================

    pub(crate) fn put_location_type(&mut self, location_type: LocationType) {
        let old_parent = self
            .location_types
            .get(&location_type.id)
            .and_then(|t| t.parent);
        self.index
            .type_children
            .relink(old_parent, location_type.parent, location_type.id);
        self.location_types.insert(location_type.id, location_type);
    }

    pub(crate) fn remove_location_type(&mut self, id: LocationTypeId) -> Option<LocationType> {
        let removed = self.location_types.remove(&id)?;
        self.index.type_children.relink(removed.parent, None, id);
        Some(removed)
    }

    pub(crate) fn put_location(&mut self, location: Location) {
        let old = self
            .locations
            .get(&location.id)
            .map(|l| (l.location_type, l.parent));
        let (old_type, old_parent) = match old {
            Some((location_type, parent)) => (Some(location_type), parent),
            None => (None, None),
        };
        self.index
            .locations_by_type
            .relink(old_type, Some(location.location_type), location.id);
        self.index
            .location_children
            .relink(old_parent, location.parent, location.id);
        self.locations.insert(location.id, location);
    }

    pub(crate) fn remove_location(&mut self, id: LocationId) -> Option<Location> {
        let removed = self.locations.remove(&id)?;
        self.index
            .locations_by_type
            .unlink(removed.location_type, id);
        self.index.location_children.relink(removed.parent, None, id);
        Some(removed)
    }

    pub(crate) fn put_rack_group(&mut self, group: RackGroup) {
        let (old_parent, old_location) = self
            .rack_groups
            .get(&group.id)
            .map(|g| (g.parent, g.location))
            .unwrap_or_default();
        self.index
            .group_children
            .relink(old_parent, group.parent, group.id);
        self.index
            .groups_by_location
            .relink(old_location, group.location, group.id);
        self.rack_groups.insert(group.id, group);
    }

    pub(crate) fn remove_rack_group(&mut self, id: RackGroupId) -> Option<RackGroup> {
        let removed = self.rack_groups.remove(&id)?;
        self.index.group_children.relink(removed.parent, None, id);
        self.index
            .groups_by_location
            .relink(removed.location, None, id);
        Some(removed)
    }

    pub(crate) fn put_rack(&mut self, rack: Rack) {
        let (old_group, old_location) = self
            .racks
            .get(&rack.id)
            .map(|r| (r.rack_group, r.location))
            .unwrap_or_default();
        self.index
            .racks_by_group
            .relink(old_group, rack.rack_group, rack.id);
        self.index
            .racks_by_location
            .relink(old_location, rack.location, rack.id);
        self.racks.insert(rack.id, rack);
    }

    pub(crate) fn remove_rack(&mut self, id: RackId) -> Option<Rack> {
        let removed = self.racks.remove(&id)?;
        self.index.racks_by_group.relink(removed.rack_group, None, id);
        self.index.racks_by_location.relink(removed.location, None, id);
        Some(removed)
    }

    pub(crate) fn put_device(&mut self, device: Device) {
        let (old_rack, old_location) = self
            .devices
            .get(&device.id)
            .map(|d| (d.rack, d.location))
            .unwrap_or_default();
        self.index
            .devices_by_rack
            .relink(old_rack, device.rack, device.id);
        self.index
            .devices_by_location
            .relink(old_location, device.location, device.id);
        self.devices.insert(device.id, device);
    }

    pub(crate) fn remove_device(&mut self, id: DeviceId) -> Option<Device> {
        let removed = self.devices.remove(&id)?;
        self.index.devices_by_rack.relink(removed.rack, None, id);
        self.index
            .devices_by_location
            .relink(removed.location, None, id);
        Some(removed)
    }

    pub(crate) fn put_power_panel(&mut self, panel: PowerPanel) {
        let (old_group, old_location) = self
            .power_panels
            .get(&panel.id)
            .map(|p| (p.rack_group, p.location))
            .unwrap_or_default();
        self.index
            .panels_by_group
            .relink(old_group, panel.rack_group, panel.id);
        self.index
            .panels_by_location
            .relink(old_location, panel.location, panel.id);
        self.power_panels.insert(panel.id, panel);
    }

    pub(crate) fn remove_power_panel(&mut self, id: PowerPanelId) -> Option<PowerPanel> {
        let removed = self.power_panels.remove(&id)?;
        self.index.panels_by_group.relink(removed.rack_group, None, id);
        self.index
            .panels_by_location
            .relink(removed.location, None, id);
        Some(removed)
    }

    pub(crate) fn put_component(&mut self, record: ComponentRecord) {
        let id = record.component.id();
        let old = self
            .components
            .get(&id)
            .map(|r| ComponentLinks::of(&r.component))
            .unwrap_or_default();
        let new = ComponentLinks::of(&record.component);
        self.relink_component(id, old, new);
        self.components.insert(id, record);
    }

    pub(crate) fn remove_component(&mut self, id: ComponentId) -> Option<ComponentRecord> {
        let removed = self.components.remove(&id)?;
        let old = ComponentLinks::of(&removed.component);
        self.relink_component(id, old, ComponentLinks::default());
        Some(removed)
    }

    fn relink_component(&mut self, id: ComponentId, old: ComponentLinks, new: ComponentLinks) {
        self.index
            .components_by_device
            .relink(old.device, new.device, id);
        self.index
            .front_ports_by_rear
            .relink(old.rear_port, new.rear_port, id);
        self.index
            .feeds_by_panel
            .relink(old.power_panel, new.power_panel, id);
        self.index.feeds_by_rack.relink(old.rack, new.rack, id);
        self.index
            .terminations_by_location
            .relink(old.location, new.location, id);
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
