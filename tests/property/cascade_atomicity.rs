// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cascade atomicity properties
//!
//! Moving a rack group either moves its whole subtree to the target location
//! or, when anything in the subtree is not permitted there, changes nothing.

use dcim_topology::{ContentType, Location, LocationType, RackGroup};
use proptest::prelude::*;

use crate::fixtures;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_rack_group_move_is_all_or_nothing(
        group_count in 1usize..8,
        parent_picks in prop::collection::vec(0usize..64, 8),
        racks_per_group in prop::collection::vec(0usize..3, 8),
        devices_in_racks in any::<bool>(),
        target_permits_racks in any::<bool>(),
        target_permits_devices in any::<bool>(),
    ) {
        // Given a random rack group tree in Bldg1
        let mut c = fixtures::campus();
        let mut groups = Vec::new();
        for i in 0..group_count {
            let mut group = RackGroup::new(format!("G{}", i), c.building);
            if i > 0 {
                group = group.with_parent(groups[parent_picks[i] % i]);
            }
            groups.push(c.topology.save_rack_group(group).unwrap());
        }
        let mut racks = Vec::new();
        let mut devices = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            for r in 0..racks_per_group[i] {
                let rack = fixtures::rack_in_group(&mut c.topology, c.building, *group, &format!("R{}", r));
                if devices_in_racks {
                    devices.push(fixtures::racked_device(
                        &mut c.topology,
                        c.building,
                        rack,
                        &format!("D{}-{}", i, r),
                    ));
                }
                racks.push(rack);
            }
        }

        // And a target whose type may or may not admit racks and devices
        let mut permitted = vec![ContentType::RackGroup];
        if target_permits_racks {
            permitted.push(ContentType::Rack);
        }
        if target_permits_devices {
            permitted.push(ContentType::Device);
        }
        let yard_type = c
            .topology
            .save_location_type(
                LocationType::new("Yard")
                    .with_parent(c.campus_type)
                    .with_content_types(permitted),
            )
            .unwrap();
        let yard = c
            .topology
            .save_location(Location::new("Yard1", yard_type).with_parent(c.campus))
            .unwrap();
        let version = c.topology.version();

        // When the root group moves to the target
        let mut moved = c.topology.rack_group(groups[0]).unwrap().clone();
        moved.location = Some(yard);
        let result = c.topology.save_rack_group(moved);

        // Then either everything moved or nothing did
        let admissible = (racks.is_empty() || target_permits_racks)
            && (devices.is_empty() || target_permits_devices);
        prop_assert_eq!(result.is_ok(), admissible);

        let expected = if admissible { Some(yard) } else { Some(c.building) };
        for group in &groups {
            prop_assert_eq!(c.topology.rack_group(*group).unwrap().location, expected);
        }
        for rack in &racks {
            prop_assert_eq!(c.topology.rack(*rack).unwrap().location, expected);
        }
        for device in &devices {
            prop_assert_eq!(c.topology.device(*device).unwrap().location, expected);
        }
        if admissible {
            let moved_count = groups.len() + racks.len() + devices.len();
            prop_assert_eq!(c.topology.version(), version + moved_count as u64);
        } else {
            prop_assert_eq!(c.topology.version(), version);
        }
    }
}
