// Copyright (c) 2025 - Cowboy AI, Inc.
//! Components, cables and cached peers
//!
//! A saved cable writes a forward reference and the far-end termination into
//! both of its component records, so "what is on the other end" is a single
//! lookup. Deleting the cable clears both; deleting a component deletes its
//! cable first.

use tracing::{debug, info};

use crate::domain::invariants::{
    validate_cable_ends, validate_cable_length, validate_cable_terminations_unchanged,
    validate_circuit_termination_attachment, validate_front_port_mapping,
    validate_interface_type_with_cable, validate_rear_port_positions, validate_unique, CableEnd,
};
use crate::domain::{
    Cable, CableId, CircuitId, Component, ComponentId, ContentType, DeviceId, ObjectKind,
    PowerPanelId, TerminationRef,
};
use crate::errors::{Field, TopologyError, TopologyResult, ValidationError, ValidationErrors};
use crate::events::{ChangeAction, ObjectRef};

use super::{ComponentRecord, Topology};

/// Owner a component hangs off; fixed after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentParent {
    Device(DeviceId),
    Circuit(CircuitId),
    PowerPanel(PowerPanelId),
}

impl ComponentParent {
    fn of(component: &Component) -> Self {
        match component {
            Component::CircuitTermination(termination) => ComponentParent::Circuit(termination.circuit),
            Component::PowerFeed(feed) => ComponentParent::PowerPanel(feed.power_panel),
            Component::ConsolePort(port)
            | Component::ConsoleServerPort(port)
            | Component::PowerOutlet(port)
            | Component::PowerPort(port) => ComponentParent::Device(port.device),
            Component::FrontPort(port) => ComponentParent::Device(port.device),
            Component::Interface(interface) => ComponentParent::Device(interface.device),
            Component::RearPort(port) => ComponentParent::Device(port.device),
        }
    }
}

impl Topology {
    // ========================================================================
    // Components
    // ========================================================================

    fn check_component(&self, proposed: &Component) -> TopologyResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let id = proposed.id();
        let existing = self.components.get(&id);

        if let Some(existing) = existing {
            if existing.component.kind() != proposed.kind() {
                errors.add(
                    Field::Type,
                    ValidationError::StructuralImmutability(
                        "Changing the kind of an existing component is not permitted.".to_string(),
                    ),
                );
            }
            if ComponentParent::of(&existing.component) != ComponentParent::of(proposed) {
                errors.add(
                    Field::Device,
                    ValidationError::StructuralImmutability(
                        "A component cannot be moved to a different parent.".to_string(),
                    ),
                );
            }
        }
        let has_cable = existing.is_some_and(|record| record.cable.is_some());

        if let Some(device) = proposed.device() {
            self.require_device(device)?;
            let name = proposed.name();
            errors.check(
                Field::Name,
                validate_unique(
                    self.components_of_device(device).any(|other| {
                        other.id() != id && other.kind() == proposed.kind() && other.name() == name
                    }),
                    format!(
                        "A {} named \"{}\" already exists on this device.",
                        proposed.kind(),
                        name
                    ),
                ),
            );
        }

        match proposed {
            Component::RearPort(rear_port) => {
                errors.check(
                    Field::Positions,
                    validate_rear_port_positions(
                        rear_port,
                        self.index.front_ports_by_rear.count(rear_port.id),
                        self.config.max_rear_port_positions,
                    ),
                );
            }
            Component::FrontPort(front_port) => {
                let record = self.require_component(front_port.rear_port)?;
                match &record.component {
                    Component::RearPort(rear_port) => {
                        let position_taken =
                            self.front_ports_of(rear_port.id).any(|other| match other {
                                Component::FrontPort(other) => {
                                    other.id != front_port.id
                                        && other.rear_port_position == front_port.rear_port_position
                                }
                                _ => false,
                            });
                        errors.merge(validate_front_port_mapping(front_port, rear_port, position_taken));
                    }
                    other => errors.add(
                        Field::RearPort,
                        ValidationError::InvalidValue(format!("{} is not a rear port.", other)),
                    ),
                }
            }
            Component::Interface(interface) => {
                errors.check(
                    Field::Type,
                    validate_interface_type_with_cable(interface.interface_type, has_cable),
                );
            }
            Component::CircuitTermination(termination) => {
                errors.check(
                    Field::NonField,
                    validate_circuit_termination_attachment(termination),
                );
                self.check_location_permits(
                    &mut errors,
                    termination.location,
                    ContentType::CircuitTermination,
                )?;
                errors.check(
                    Field::TermSide,
                    validate_unique(
                        self.components.values().any(|record| match &record.component {
                            Component::CircuitTermination(other) => {
                                other.id != termination.id
                                    && other.circuit == termination.circuit
                                    && other.term_side == termination.term_side
                            }
                            _ => false,
                        }),
                        format!(
                            "Circuit {} already has a termination on side {}.",
                            termination.circuit, termination.term_side
                        ),
                    ),
                );
                if has_cable && termination.provider_network.is_some() {
                    errors.add(
                        Field::ProviderNetwork,
                        ValidationError::CableCompatibility(
                            "Circuit terminations attached to a provider network may not be cabled."
                                .to_string(),
                        ),
                    );
                }
            }
            Component::PowerFeed(feed) => {
                let panel = self.require_power_panel(feed.power_panel)?;
                if let Some(rack_id) = feed.rack {
                    let rack = self.require_rack(rack_id)?;
                    if rack.location != panel.location {
                        errors.add(
                            Field::Rack,
                            ValidationError::Containment(format!(
                                "Rack {} ({}) and power panel {} ({}) are in different locations",
                                rack,
                                self.location_label(rack.location),
                                panel,
                                self.location_label(panel.location)
                            )),
                        );
                    }
                }
            }
            Component::ConsolePort(_)
            | Component::ConsoleServerPort(_)
            | Component::PowerOutlet(_)
            | Component::PowerPort(_) => {}
        }

        Ok(errors)
    }

    /// Validate a proposed component
    pub fn validate_component(&self, proposed: &Component) -> TopologyResult<()> {
        let errors = self.check_component(proposed)?;
        Self::conclude(errors, proposed)
    }

    /// Validate and store a component, keeping any cable it already has
    pub fn save_component(&mut self, component: Component) -> TopologyResult<ComponentId> {
        self.begin_change();
        self.validate_component(&component)?;

        let id = component.id();
        let record = match self.components.get(&id) {
            Some(existing) => ComponentRecord {
                component,
                cable: existing.cable,
                cable_peer: existing.cable_peer,
            },
            None => ComponentRecord::new(component),
        };
        let action = if self.components.contains_key(&id) {
            ChangeAction::Updated
        } else {
            ChangeAction::Created
        };
        debug!(component = %record.component, kind = %record.component.kind(), ?action, "Saved component");
        self.put_component(record);
        self.record(action, ObjectRef::new(ObjectKind::Component, id));
        Ok(id)
    }

    /// Delete a component and the cable attached to it
    ///
    /// Deleting a rear port also deletes the front ports mapped onto it.
    pub fn delete_component(&mut self, id: ComponentId) -> TopologyResult<()> {
        self.begin_change();
        self.require_component(id)?;
        self.delete_component_tree(id);
        Ok(())
    }

    pub(crate) fn delete_component_tree(&mut self, id: ComponentId) {
        let mut doomed: Vec<ComponentId> = self.index.front_ports_by_rear.children(id).collect();
        doomed.push(id);

        for component_id in &doomed {
            if let Some(cable) = self.components.get(component_id).and_then(|r| r.cable) {
                self.detach_cable(cable);
            }
        }
        for component_id in doomed {
            if let Some(removed) = self.remove_component(component_id) {
                info!(component = %removed.component, kind = %removed.component.kind(), "Deleted component");
                self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::Component, component_id));
            }
        }
    }

    // ========================================================================
    // Cables
    // ========================================================================

    /// Resolve a termination reference, checking its kind tag
    fn resolve_termination(&self, termination: TerminationRef) -> TopologyResult<&ComponentRecord> {
        let record = self.require_component(termination.id)?;
        if record.component.kind() != termination.kind {
            return Err(TopologyError::not_found(ObjectKind::Component, termination.id));
        }
        Ok(record)
    }

    fn check_cable(&self, cable: &Cable) -> TopologyResult<ValidationErrors> {
        let a = self.resolve_termination(cable.termination_a)?;
        let b = self.resolve_termination(cable.termination_b)?;

        if let Some(existing) = self.cables.get(&cable.id) {
            if let Err(error) = validate_cable_terminations_unchanged(existing, cable) {
                return Ok((Field::NonField, error).into());
            }
        }

        let mut errors = validate_cable_ends(
            cable,
            CableEnd {
                component: &a.component,
                existing_cable: a.cable,
            },
            CableEnd {
                component: &b.component,
                existing_cable: b.cable,
            },
        );
        errors.check(Field::LengthUnit, validate_cable_length(cable));

        if errors.is_empty() {
            for origin in [cable.termination_a, cable.termination_b] {
                if let Err(at) = self.walk_path(origin, Some(cable)) {
                    errors.add(
                        Field::NonField,
                        ValidationError::CableCompatibility(format!(
                            "Connecting {} to {} would create a loop in the cable path at {}.",
                            a.component,
                            b.component,
                            self.termination_label(at)
                        )),
                    );
                    break;
                }
            }
        }

        Ok(errors)
    }

    /// Validate a proposed cable without saving it
    pub fn validate_cable(&self, cable: &Cable) -> TopologyResult<()> {
        let errors = self.check_cable(cable)?;
        Self::conclude(errors, cable)
    }

    /// Validate and store a cable, updating both endpoints' caches
    ///
    /// A length unit given without a length is cleared.
    pub fn save_cable(&mut self, mut cable: Cable) -> TopologyResult<CableId> {
        self.begin_change();
        if cable.length.is_none() {
            cable.length_unit = None;
        }
        self.validate_cable(&cable)?;

        let id = cable.id;
        let action = if self.cables.contains_key(&id) {
            ChangeAction::Updated
        } else {
            ChangeAction::Created
        };
        for (near, far) in [
            (cable.termination_a, cable.termination_b),
            (cable.termination_b, cable.termination_a),
        ] {
            if let Some(record) = self.components.get_mut(&near.id) {
                record.cable = Some(id);
                record.cable_peer = Some(far);
            }
        }
        info!(
            cable = %cable,
            a = %self.termination_label(cable.termination_a),
            b = %self.termination_label(cable.termination_b),
            "Connected cable"
        );
        self.cables.insert(id, cable);
        self.record(action, ObjectRef::new(ObjectKind::Cable, id));
        Ok(id)
    }

    /// Delete a cable, clearing both endpoints' caches
    pub fn delete_cable(&mut self, id: CableId) -> TopologyResult<()> {
        self.begin_change();
        if !self.cables.contains_key(&id) {
            return Err(TopologyError::not_found(ObjectKind::Cable, id));
        }
        self.detach_cable(id);
        Ok(())
    }

    fn detach_cable(&mut self, id: CableId) {
        let Some(cable) = self.cables.remove(&id) else {
            return;
        };
        for end in [cable.termination_a, cable.termination_b] {
            if let Some(record) = self.components.get_mut(&end.id) {
                if record.cable == Some(id) {
                    record.cable = None;
                    record.cable_peer = None;
                }
            }
        }
        info!(cable = %cable, "Disconnected cable");
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::Cable, id));
    }

    /// Cable attached to a termination
    pub fn cable_at(&self, termination: TerminationRef) -> Option<&Cable> {
        self.components
            .get(&termination.id)
            .and_then(|record| record.cable)
            .and_then(|cable| self.cables.get(&cable))
    }

    /// Cached far end of a termination's cable
    pub fn cable_peer(&self, termination: TerminationRef) -> Option<TerminationRef> {
        self.components
            .get(&termination.id)
            .and_then(|record| record.cable_peer)
    }

    pub(crate) fn termination_label(&self, termination: TerminationRef) -> String {
        match self.component(termination.id) {
            Some(component) => match component.device().and_then(|d| self.devices.get(&d)) {
                Some(device) => format!("{} {}", device, component),
                None => component.to_string(),
            },
            None => termination.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, InterfaceType, LengthUnit, Location, LocationType};

    fn device(topology: &mut Topology) -> DeviceId {
        let site = topology
            .save_location_type(LocationType::new("Hall").with_content_types([ContentType::Device]))
            .unwrap();
        let location = topology.save_location(Location::new("Hall 1", site)).unwrap();
        topology.save_device(Device::new("sw1", location)).unwrap()
    }

    #[test]
    fn test_duplicate_component_name_rejected() {
        let mut topology = Topology::new();
        let device = device(&mut topology);
        topology
            .save_component(Component::interface(device, "eth0", InterfaceType::Base1000T))
            .unwrap();
        let err = topology
            .save_component(Component::interface(device, "eth0", InterfaceType::Base1000T))
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains_field(Field::Name));

        topology
            .save_component(Component::console_port(device, "eth0"))
            .unwrap();
    }

    #[test]
    fn test_cabled_interface_cannot_become_virtual() {
        let mut topology = Topology::new();
        let device = device(&mut topology);
        let a = Component::interface(device, "eth0", InterfaceType::Base1000T);
        let b = Component::interface(device, "eth1", InterfaceType::Base1000T);
        let (ta, tb) = (a.termination(), b.termination());
        topology.save_component(a.clone()).unwrap();
        topology.save_component(b).unwrap();
        topology.save_cable(Cable::new(ta, tb)).unwrap();

        let Component::Interface(mut changed) = a else {
            unreachable!()
        };
        changed.interface_type = InterfaceType::Virtual;
        let err = topology
            .save_component(Component::Interface(changed))
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains_field(Field::Type));
    }

    #[test]
    fn test_unit_without_length_is_cleared() {
        let mut topology = Topology::new();
        let device = device(&mut topology);
        let a = Component::interface(device, "eth0", InterfaceType::Base1000T);
        let b = Component::interface(device, "eth1", InterfaceType::Base1000T);
        let mut cable = Cable::new(a.termination(), b.termination());
        cable.length_unit = Some(LengthUnit::M);
        topology.save_component(a).unwrap();
        topology.save_component(b).unwrap();

        let id = topology.save_cable(cable).unwrap();
        assert_eq!(topology.cable(id).unwrap().length_unit, None);
    }

    #[test]
    fn test_mismatched_kind_tag_is_not_found() {
        let mut topology = Topology::new();
        let device = device(&mut topology);
        let port = Component::console_port(device, "con0");
        let mislabelled = TerminationRef::new(crate::domain::TerminationKind::Interface, port.id());
        let other = Component::console_server_port(device, "cs0");
        let cable = Cable::new(mislabelled, other.termination());
        topology.save_component(port).unwrap();
        topology.save_component(other).unwrap();

        assert!(matches!(
            topology.validate_cable(&cable),
            Err(TopologyError::NotFound { .. })
        ));
    }
}
