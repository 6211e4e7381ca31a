// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for dcim-topology
//!
//! Builders for the small campus every integration test starts from:
//!
//! ```text
//! Campus (type, permits nothing)
//!   └─ Building (type, permits rack groups, racks, devices, power panels,
//!                circuit terminations)
//!        └─ Floor (type, nestable, same content as Building)
//!
//! Campus1 ── Bldg1
//!        └── Bldg2
//! ```
//!
//! Each test file includes this module with `mod fixtures;` and uses only
//! part of it.

#![allow(dead_code)]

use dcim_topology::{
    Component, ContentType, Device, DeviceId, InterfaceType, LocationId, LocationType,
    LocationTypeId, Location, Rack, RackGroup, RackGroupId, RackId, TerminationRef, Topology,
};

pub const PLACEABLE: [ContentType; 5] = [
    ContentType::RackGroup,
    ContentType::Rack,
    ContentType::Device,
    ContentType::PowerPanel,
    ContentType::CircuitTermination,
];

pub struct Campus {
    pub topology: Topology,
    pub campus_type: LocationTypeId,
    pub building_type: LocationTypeId,
    pub floor_type: LocationTypeId,
    pub campus: LocationId,
    pub building: LocationId,
    pub other_building: LocationId,
}

/// Campus1 with two buildings; the event queue is drained
pub fn campus() -> Campus {
    let mut topology = Topology::new();
    let campus_type = topology
        .save_location_type(LocationType::new("Campus"))
        .expect("campus type");
    let building_type = topology
        .save_location_type(
            LocationType::new("Building")
                .with_parent(campus_type)
                .with_content_types(PLACEABLE),
        )
        .expect("building type");
    let floor_type = topology
        .save_location_type(
            LocationType::new("Floor")
                .with_parent(building_type)
                .nestable()
                .with_content_types(PLACEABLE),
        )
        .expect("floor type");

    let campus = topology
        .save_location(Location::new("Campus1", campus_type))
        .expect("campus");
    let building = topology
        .save_location(Location::new("Bldg1", building_type).with_parent(campus))
        .expect("building");
    let other_building = topology
        .save_location(Location::new("Bldg2", building_type).with_parent(campus))
        .expect("second building");
    topology.take_uncommitted_events();

    Campus {
        topology,
        campus_type,
        building_type,
        floor_type,
        campus,
        building,
        other_building,
    }
}

pub fn floor(topology: &mut Topology, floor_type: LocationTypeId, parent: LocationId, name: &str) -> LocationId {
    topology
        .save_location(Location::new(name, floor_type).with_parent(parent))
        .expect("floor")
}

pub fn rack_group(topology: &mut Topology, location: LocationId, name: &str) -> RackGroupId {
    topology
        .save_rack_group(RackGroup::new(name, location))
        .expect("rack group")
}

pub fn rack_in_group(topology: &mut Topology, location: LocationId, group: RackGroupId, name: &str) -> RackId {
    topology
        .save_rack(Rack::new(name, location).with_group(group))
        .expect("rack")
}

pub fn device(topology: &mut Topology, location: LocationId, name: &str) -> DeviceId {
    topology
        .save_device(Device::new(name, location))
        .expect("device")
}

pub fn racked_device(topology: &mut Topology, location: LocationId, rack: RackId, name: &str) -> DeviceId {
    topology
        .save_device(Device::new(name, location).in_rack(rack))
        .expect("racked device")
}

/// Save a component and return its termination
pub fn component(topology: &mut Topology, component: Component) -> TerminationRef {
    let termination = component.termination();
    topology.save_component(component).expect("component");
    termination
}

pub fn interface(topology: &mut Topology, device: DeviceId, name: &str) -> TerminationRef {
    component(topology, Component::interface(device, name, InterfaceType::Base1000T))
}
