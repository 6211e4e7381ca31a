// Copyright (c) 2025 - Cowboy AI, Inc.
//! Location type and location hierarchy tests
//!
//! Location types form a tree that fixes which type a location's parent must
//! have; locations form a second tree that has to agree with the first.

mod fixtures;

use dcim_topology::{
    Field, Location, LocationType, Rack, RackGroup, TopologyError, ValidationError,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case("Region" ; "singular")]
#[test_case("regions" ; "plural")]
#[test_case("Site" ; "capitalized")]
#[test_case("Rack Group" ; "spaced")]
#[test_case("RACKGROUP" ; "shouting")]
fn test_reserved_location_type_names(name: &str) {
    // Given an empty topology
    let mut topology = dcim_topology::Topology::new();

    // When a location type takes a reserved name
    let err = topology.save_location_type(LocationType::new(name)).unwrap_err();

    // Then it is rejected on the name field
    let errors = err.validation_errors().unwrap();
    assert_eq!(
        errors.get(Field::Name)[0].message(),
        "This name is reserved for future use."
    );
}

#[test]
fn test_location_requires_parent_of_parent_type() {
    let mut c = fixtures::campus();

    // A building without a parent
    let err = c
        .topology
        .save_location(Location::new("Orphan", c.building_type))
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get(Field::Parent)[0].message(),
        "A Location of type Building must have a parent Location of type Campus."
    );

    // A building under another building
    let err = c
        .topology
        .save_location(Location::new("Annex", c.building_type).with_parent(c.building))
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get(Field::Parent)[0].message(),
        "A Location of type Building can only have a Location of type Campus as its parent."
    );
}

#[test]
fn test_root_location_rejects_parent() {
    let mut c = fixtures::campus();
    let err = c
        .topology
        .save_location(Location::new("Campus2", c.campus_type).with_parent(c.campus))
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get(Field::Parent)[0].message(),
        "A Location of type Campus must not have a parent Location."
    );
}

#[test]
fn test_nestable_type_accepts_own_type_or_parent_type() {
    let mut c = fixtures::campus();
    let ground = fixtures::floor(&mut c.topology, c.floor_type, c.building, "Ground");
    let mezzanine = fixtures::floor(&mut c.topology, c.floor_type, ground, "Mezzanine");

    assert_eq!(c.topology.location_ancestry(mezzanine), vec![mezzanine, ground, c.building, c.campus]);
    assert!(c.topology.location_within(mezzanine, c.campus));

    let err = c
        .topology
        .save_location(Location::new("Roof", c.floor_type).with_parent(c.campus))
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get(Field::Parent)[0].message(),
        "A Location of type Floor can only have a Location of the same type or of type Building as its parent."
    );
}

#[test]
fn test_location_type_is_immutable() {
    let mut c = fixtures::campus();
    let mut changed = c.topology.location(c.building).unwrap().clone();
    changed.location_type = c.floor_type;

    let err = c.topology.save_location(changed).unwrap_err();
    assert!(matches!(
        err.validation_errors().unwrap().get(Field::LocationType)[0],
        ValidationError::StructuralImmutability(_)
    ));
}

#[test]
fn test_location_type_parent_frozen_while_in_use() {
    let mut c = fixtures::campus();
    let mut changed = c.topology.location_type(c.floor_type).unwrap().clone();
    changed.parent = Some(c.campus_type);

    // Unused: the floor type may move
    assert!(c.topology.save_location_type(changed.clone()).is_ok());

    // In use: it may not move back
    let ground = c
        .topology
        .save_location(Location::new("Ground", c.floor_type).with_parent(c.campus))
        .unwrap();
    assert!(c.topology.location_type_in_use(c.floor_type).unwrap());
    changed.parent = Some(c.building_type);
    let err = c.topology.save_location_type(changed.clone()).unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field(Field::Parent));
    assert_eq!(c.topology.location(ground).unwrap().parent, Some(c.campus));

    // Unused again: the move goes through
    c.topology.delete_location(ground).unwrap();
    assert!(!c.topology.location_type_in_use(c.floor_type).unwrap());
    c.topology.save_location_type(changed).unwrap();
    assert_eq!(
        c.topology.location_type(c.floor_type).unwrap().parent,
        Some(c.building_type)
    );
}

#[test]
fn test_nestable_frozen_while_locations_nest() {
    // Given a nestable type with one location nested under another
    let mut c = fixtures::campus();
    let area_type = c
        .topology
        .save_location_type(LocationType::new("Area").nestable())
        .unwrap();
    let north = c
        .topology
        .save_location(Location::new("North", area_type))
        .unwrap();
    let inner = c
        .topology
        .save_location(Location::new("Inner", area_type).with_parent(north))
        .unwrap();

    // When nesting is switched off
    let mut flat = c.topology.location_type(area_type).unwrap().clone();
    flat.nestable = false;
    let err = c.topology.save_location_type(flat.clone()).unwrap_err();

    // Then the change is refused and the nested location stays valid
    assert!(matches!(
        err.validation_errors().unwrap().get(Field::Nestable)[0],
        ValidationError::StructuralImmutability(_)
    ));
    let unchanged = c.topology.location(inner).unwrap().clone();
    c.topology.validate_location(&unchanged).unwrap();

    // Once nothing nests, nesting may be switched off
    c.topology.delete_location(inner).unwrap();
    c.topology.save_location_type(flat).unwrap();
    assert!(!c.topology.location_type(area_type).unwrap().nestable);
}

#[test]
fn test_location_type_cycle_rejected() {
    let mut c = fixtures::campus();
    let mut campus_type = c.topology.location_type(c.campus_type).unwrap().clone();
    campus_type.parent = Some(c.floor_type);

    let err = c.topology.save_location_type(campus_type).unwrap_err();
    assert!(err
        .validation_errors()
        .unwrap()
        .get(Field::Parent)
        .iter()
        .any(|e| matches!(e, ValidationError::HierarchyMismatch(_))));
}

#[test]
fn test_sibling_names_unique_per_parent() {
    let mut c = fixtures::campus();
    let err = c
        .topology
        .save_location(Location::new("Bldg1", c.building_type).with_parent(c.campus))
        .unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field(Field::Name));

    // The same name under another parent is fine
    fixtures::floor(&mut c.topology, c.floor_type, c.building, "Level 1");
    fixtures::floor(&mut c.topology, c.floor_type, c.other_building, "Level 1");
}

#[test]
fn test_reparent_rechecks_rack_group_containment() {
    // Given a rack group on a floor of Bldg1, with a rack on a nested floor
    let mut c = fixtures::campus();
    let ground = fixtures::floor(&mut c.topology, c.floor_type, c.building, "Ground");
    let cage = fixtures::floor(&mut c.topology, c.floor_type, ground, "Cage");
    let group = fixtures::rack_group(&mut c.topology, ground, "Row A");
    c.topology
        .save_rack(Rack::new("R1", cage).with_group(group))
        .unwrap();

    // When the cage is moved to Bldg2
    let mut moved = c.topology.location(cage).unwrap().clone();
    moved.parent = Some(c.other_building);
    let err = c.topology.save_location(moved).unwrap_err();

    // Then the rack would leave its group's location and the move is refused
    let errors = err.validation_errors().unwrap();
    assert!(errors.contains_field(Field::Parent));
    assert_eq!(c.topology.location(cage).unwrap().parent, Some(ground));

    // Moving it within Bldg1 is fine
    let level2 = fixtures::floor(&mut c.topology, c.floor_type, ground, "Level 2");
    let mut within = c.topology.location(cage).unwrap().clone();
    within.parent = Some(level2);
    c.topology.save_location(within).unwrap();
}

#[test]
fn test_delete_location_protected_by_contents() {
    let mut c = fixtures::campus();
    let group = c
        .topology
        .save_rack_group(RackGroup::new("Row A", c.other_building))
        .unwrap();

    let err = c.topology.delete_location(c.campus).unwrap_err();
    assert!(matches!(
        err.validation_errors().unwrap().get(Field::NonField)[0],
        ValidationError::Protected(_)
    ));
    assert!(c.topology.delete_location(c.other_building).is_err());

    c.topology.delete_rack_group(group).unwrap();
    c.topology.delete_location(c.other_building).unwrap();
    assert!(c.topology.location(c.other_building).is_none());
    assert!(matches!(
        c.topology.delete_location(c.other_building),
        Err(TopologyError::NotFound { .. })
    ));
}
