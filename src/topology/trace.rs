// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cable path tracing
//!
//! Follows cables from an origin through front and rear ports until a
//! terminating endpoint is reached. Rear ports with several positions are
//! resolved with a stack: entering a front port pushes its position, leaving
//! through a multi-position rear port pops it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Cable, CableId, Component, ComponentId, TerminationRef};
use crate::errors::{Field, TopologyError, TopologyResult, ValidationError};

use super::Topology;

/// One cable crossed along a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHop {
    pub near_end: TerminationRef,
    pub cable: CableId,
    pub far_end: TerminationRef,
}

/// Result of tracing from an origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CablePath {
    pub origin: TerminationRef,
    pub hops: Vec<PathHop>,
    /// Terminating endpoint reached; `None` when the path stops in a pass-through port
    pub destination: Option<TerminationRef>,
}

impl CablePath {
    pub fn is_complete(&self) -> bool {
        self.destination.is_some()
    }
}

impl Topology {
    /// Trace the cable path leaving `origin`
    pub fn trace(&self, origin: TerminationRef) -> TopologyResult<CablePath> {
        self.require_component(origin.id)?;
        self.walk_path(origin, None).map_err(|at| {
            TopologyError::from((
                Field::NonField,
                ValidationError::CableCompatibility(format!(
                    "The cable path from {} loops back through {}.",
                    self.termination_label(origin),
                    self.termination_label(at)
                )),
            ))
        })
    }

    /// Walk the path from `origin`, treating `overlay` as if it were saved
    ///
    /// Returns the termination at which the walk revisits itself on a loop.
    pub(crate) fn walk_path(
        &self,
        origin: TerminationRef,
        overlay: Option<&Cable>,
    ) -> Result<CablePath, TerminationRef> {
        let mut path = CablePath {
            origin,
            hops: Vec::new(),
            destination: None,
        };
        let mut visited = HashSet::new();
        let mut positions: Vec<u16> = Vec::new();
        let mut near = origin;

        loop {
            if !visited.insert(near) {
                return Err(near);
            }
            let Some(cable) = self.cable_for(near, overlay) else {
                return Ok(path);
            };
            let Some(far) = cable.peer_of(&near) else {
                return Ok(path);
            };
            path.hops.push(PathHop {
                near_end: near,
                cable: cable.id,
                far_end: far,
            });
            if !visited.insert(far) {
                return Err(far);
            }

            let next = match self.component(far.id) {
                Some(Component::FrontPort(front)) => {
                    let positions_on_rear = match self.component(front.rear_port) {
                        Some(Component::RearPort(rear)) => rear.positions,
                        _ => return Ok(path),
                    };
                    if positions_on_rear > 1 {
                        positions.push(front.rear_port_position);
                    }
                    self.component(front.rear_port).map(Component::termination)
                }
                Some(Component::RearPort(rear)) => {
                    let position = if rear.positions == 1 {
                        Some(1)
                    } else {
                        positions.pop()
                    };
                    position.and_then(|position| self.front_port_at(rear.id, position))
                }
                Some(_) => {
                    path.destination = Some(far);
                    return Ok(path);
                }
                None => None,
            };

            match next {
                Some(next) => near = next,
                None => return Ok(path),
            }
        }
    }

    fn cable_for<'a>(&'a self, termination: TerminationRef, overlay: Option<&'a Cable>) -> Option<&'a Cable> {
        if let Some(overlay) = overlay {
            if overlay.termination_a == termination || overlay.termination_b == termination {
                return Some(overlay);
            }
        }
        self.cable_at(termination)
    }

    fn front_port_at(&self, rear_port: ComponentId, position: u16) -> Option<TerminationRef> {
        self.front_ports_of(rear_port)
            .find(|component| {
                matches!(component, Component::FrontPort(front) if front.rear_port_position == position)
            })
            .map(Component::termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentType, Device, DeviceId, InterfaceType, Location, LocationType};

    fn two_devices(topology: &mut Topology) -> (DeviceId, DeviceId) {
        let hall = topology
            .save_location_type(LocationType::new("Hall").with_content_types([ContentType::Device]))
            .unwrap();
        let location = topology.save_location(Location::new("Hall 1", hall)).unwrap();
        let a = topology.save_device(Device::new("panel-a", location)).unwrap();
        let b = topology.save_device(Device::new("panel-b", location)).unwrap();
        (a, b)
    }

    fn save(topology: &mut Topology, component: Component) -> TerminationRef {
        let termination = component.termination();
        topology.save_component(component).unwrap();
        termination
    }

    #[test]
    fn test_trace_through_patch_panel_pair() {
        let mut topology = Topology::new();
        let (a, b) = two_devices(&mut topology);

        let rear_a = Component::rear_port(a, "RP", 2);
        let rear_b = Component::rear_port(b, "RP", 2);
        let (rear_a_id, rear_b_id) = (rear_a.id(), rear_b.id());
        let rear_a = save(&mut topology, rear_a);
        let rear_b = save(&mut topology, rear_b);
        let front_a2 = save(&mut topology, Component::front_port(a, "FP2", rear_a_id, 2));
        let front_b2 = save(&mut topology, Component::front_port(b, "FP2", rear_b_id, 2));
        let eth_a = save(&mut topology, Component::interface(a, "eth0", InterfaceType::Base1000T));
        let eth_b = save(&mut topology, Component::interface(b, "eth0", InterfaceType::Base1000T));

        topology.save_cable(Cable::new(eth_a, front_a2)).unwrap();
        topology.save_cable(Cable::new(rear_a, rear_b)).unwrap();
        topology.save_cable(Cable::new(front_b2, eth_b)).unwrap();

        let path = topology.trace(eth_a).unwrap();
        assert!(path.is_complete());
        assert_eq!(path.destination, Some(eth_b));
        assert_eq!(path.hops.len(), 3);
    }

    #[test]
    fn test_trace_stops_at_unmapped_position() {
        let mut topology = Topology::new();
        let (a, b) = two_devices(&mut topology);

        let rear_a = Component::rear_port(a, "RP", 4);
        let rear_a_id = rear_a.id();
        let rear_a = save(&mut topology, rear_a);
        let rear_b = save(&mut topology, Component::rear_port(b, "RP", 4));
        let front_a1 = save(&mut topology, Component::front_port(a, "FP1", rear_a_id, 1));
        let eth = save(&mut topology, Component::interface(a, "eth0", InterfaceType::Base1000T));

        topology.save_cable(Cable::new(eth, front_a1)).unwrap();
        topology.save_cable(Cable::new(rear_a, rear_b)).unwrap();

        let path = topology.trace(eth).unwrap();
        assert!(!path.is_complete());
        assert_eq!(path.hops.len(), 2);
    }

    #[test]
    fn test_cable_closing_a_loop_is_rejected() {
        let mut topology = Topology::new();
        let (a, b) = two_devices(&mut topology);

        let rear_a = Component::rear_port(a, "RP", 1);
        let rear_b = Component::rear_port(b, "RP", 1);
        let (rear_a_id, rear_b_id) = (rear_a.id(), rear_b.id());
        let rear_a = save(&mut topology, rear_a);
        let rear_b = save(&mut topology, rear_b);
        let front_a = save(&mut topology, Component::front_port(a, "FP", rear_a_id, 1));
        let front_b = save(&mut topology, Component::front_port(b, "FP", rear_b_id, 1));

        topology.save_cable(Cable::new(front_a, rear_b)).unwrap();
        let err = topology.save_cable(Cable::new(front_b, rear_a)).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.get(Field::NonField)[0].message().contains("loop"));
        assert_eq!(topology.cables().count(), 1);
    }
}
