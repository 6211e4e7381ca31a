// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rear port position properties
//!
//! A rear port never has fewer positions than front ports mapped onto it,
//! and every front port maps to a distinct position within range. A single
//! position rear port can be cabled to a rear port of any size.

use dcim_topology::{Cable, Component, Field};
use proptest::prelude::*;

use crate::fixtures;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_rear_port_shrinks_only_to_mapped_count(
        positions in 1u16..=32,
        mapped_ratio in 0.0f64..=1.0,
        new_positions in 1u16..=32,
    ) {
        let mut c = fixtures::campus();
        let device = fixtures::device(&mut c.topology, c.building, "panel");
        let rear = Component::rear_port(device, "RP", positions);
        let rear_id = rear.id();
        c.topology.save_component(rear).unwrap();

        let mapped = ((f64::from(positions) * mapped_ratio).floor() as u16).min(positions);
        for position in 1..=mapped {
            c.topology
                .save_component(Component::front_port(device, format!("FP{}", position), rear_id, position))
                .unwrap();
        }

        let Some(Component::RearPort(mut resized)) = c.topology.component(rear_id).cloned() else {
            panic!("rear port missing");
        };
        resized.positions = new_positions;
        let result = c.topology.save_component(Component::RearPort(resized));

        prop_assert_eq!(result.is_ok(), new_positions >= mapped);
        if let Err(err) = result {
            prop_assert!(err.validation_errors().unwrap().contains_field(Field::Positions));
        }
        prop_assert_eq!(c.topology.front_ports_of(rear_id).count(), usize::from(mapped));
    }

    #[test]
    fn prop_front_port_position_must_be_in_range_and_free(
        positions in 1u16..=16,
        taken in 1u16..=16,
        requested in 0u16..=20,
    ) {
        let mut c = fixtures::campus();
        let device = fixtures::device(&mut c.topology, c.building, "panel");
        let rear = Component::rear_port(device, "RP", positions);
        let rear_id = rear.id();
        c.topology.save_component(rear).unwrap();

        let taken = taken.min(positions);
        c.topology
            .save_component(Component::front_port(device, "FP-taken", rear_id, taken))
            .unwrap();

        let result = c
            .topology
            .save_component(Component::front_port(device, "FP-new", rear_id, requested));
        let expected = requested >= 1 && requested <= positions && requested != taken;
        prop_assert_eq!(result.is_ok(), expected);
    }

    #[test]
    fn prop_single_position_rear_port_cables_to_any_size(
        positions in 1u16..=1024,
        single_first in any::<bool>(),
    ) {
        let mut c = fixtures::campus();
        let a = fixtures::device(&mut c.topology, c.building, "panel-a");
        let b = fixtures::device(&mut c.topology, c.building, "panel-b");
        let single = fixtures::component(&mut c.topology, Component::rear_port(a, "RP1", 1));
        let multi = fixtures::component(&mut c.topology, Component::rear_port(b, "RP1", positions));

        let cable = if single_first {
            Cable::new(single, multi)
        } else {
            Cable::new(multi, single)
        };
        let result = c.topology.save_cable(cable);

        prop_assert!(result.is_ok(), "{:?}", result);
        prop_assert_eq!(c.topology.cable_peer(single), Some(multi));
    }
}
