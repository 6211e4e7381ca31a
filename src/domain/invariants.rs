// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Topology Invariants
//!
//! Every business rule of the topology is a pure function here. Callers look
//! up whatever state a rule needs (a parent's type, whether a location lies
//! inside another, which units other devices occupy) and pass it in; the
//! functions never touch the topology themselves.
//!
//! # Invariant Categories
//!
//! 1. **Structural Invariants**: fields that are fixed after creation
//! 2. **Hierarchy Invariants**: parent/child type agreement, acyclic trees
//! 3. **Containment Invariants**: content types and location ancestry
//! 4. **Cabling Invariants**: termination compatibility and single use
//! 5. **Value Invariants**: ranges, reserved names, rack units

use std::fmt::Display;

use crate::errors::{Field, ValidationError, ValidationErrors, ValidationResult};

use super::{
    Cable, CableId, CircuitTermination, Component, ContentType, Device, FrontPort, InterfaceType,
    LocationType, LocationTypeId, Rack, RearPort,
};

// ============================================================================
// Location types
// ============================================================================

/// Canonical form used to compare names against the reserved list
///
/// Lowercase, whitespace removed, one trailing plural `s` dropped.
pub fn normalize_reserved_name(name: &str) -> String {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    match compact.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => compact,
    }
}

/// Validate a location type name is not reserved
pub fn validate_location_type_name(name: &str, reserved: &[String]) -> ValidationResult {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidValue(
            "Name cannot be empty.".to_string(),
        ));
    }
    let candidate = normalize_reserved_name(name);
    if reserved
        .iter()
        .any(|reserved| normalize_reserved_name(reserved) == candidate)
    {
        return Err(ValidationError::InvalidValue(
            "This name is reserved for future use.".to_string(),
        ));
    }
    Ok(())
}

/// Validate a location type's parent only changes while nothing uses the type
pub fn validate_location_type_parent_change(
    original: Option<LocationTypeId>,
    proposed: Option<LocationTypeId>,
    locations_using_type: usize,
) -> ValidationResult {
    if original != proposed && locations_using_type > 0 {
        return Err(ValidationError::StructuralImmutability(
            "This LocationType currently has Locations using it, therefore its parent cannot be changed at this time."
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate `nestable` is only turned off while no location nests under its own type
pub fn validate_location_type_nestable_change(
    original: bool,
    proposed: bool,
    nested_locations: usize,
) -> ValidationResult {
    if original && !proposed && nested_locations > 0 {
        return Err(ValidationError::StructuralImmutability(format!(
            "Cannot disable nesting while {} Location(s) have a parent of the same type.",
            nested_locations
        )));
    }
    Ok(())
}

// ============================================================================
// Locations
// ============================================================================

/// Validate a location keeps the type it was created with
pub fn validate_location_type_unchanged(
    original: LocationTypeId,
    proposed: LocationTypeId,
) -> ValidationResult {
    if original != proposed {
        return Err(ValidationError::StructuralImmutability(
            "Changing the type of an existing Location is not permitted.".to_string(),
        ));
    }
    Ok(())
}

/// Validate a location's parent against its type's position in the type tree
///
/// # Rules
/// - `location_type.parent` set → a parent location is required
/// - root, non-nestable type → no parent location allowed
/// - non-nestable → parent's type must be `location_type.parent`
/// - nestable → parent's type may be the type itself or `location_type.parent`
///
/// # Parameters
/// - `location_type`: type of the location being saved
/// - `type_parent`: `location_type.parent`, resolved
/// - `parent_type`: type of the proposed parent location, if any
pub fn validate_location_parent(
    location_type: &LocationType,
    type_parent: Option<&LocationType>,
    parent_type: Option<&LocationType>,
) -> ValidationResult {
    let Some(parent_type) = parent_type else {
        return match type_parent {
            Some(required) => Err(ValidationError::HierarchyMismatch(format!(
                "A Location of type {} must have a parent Location of type {}.",
                location_type, required
            ))),
            None => Ok(()),
        };
    };

    if !location_type.nestable {
        return match type_parent {
            Some(required) if required.id == parent_type.id => Ok(()),
            Some(required) => Err(ValidationError::HierarchyMismatch(format!(
                "A Location of type {} can only have a Location of type {} as its parent.",
                location_type, required
            ))),
            None => Err(ValidationError::HierarchyMismatch(format!(
                "A Location of type {} must not have a parent Location.",
                location_type
            ))),
        };
    }

    let candidates = std::iter::once(location_type.id).chain(type_parent.map(|t| t.id));
    for candidate in candidates {
        if candidate == parent_type.id {
            return Ok(());
        }
    }

    match type_parent {
        Some(required) => Err(ValidationError::HierarchyMismatch(format!(
            "A Location of type {} can only have a Location of the same type or of type {} as its parent.",
            location_type, required
        ))),
        None => Err(ValidationError::HierarchyMismatch(format!(
            "A Location of type {} can only have a Location of the same type as its parent.",
            location_type
        ))),
    }
}

/// Validate a GPS coordinate lies within `[-bound, bound]`
pub fn validate_coordinate(value: Option<f64>, bound: f64, label: &str) -> ValidationResult {
    match value {
        Some(v) if !v.is_finite() || v.abs() > bound => Err(ValidationError::InvalidValue(format!(
            "{} must be between -{} and {}.",
            label, bound, bound
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// Trees
// ============================================================================

/// Validate that assigning a parent keeps a tree acyclic
///
/// # Parameters
/// - `node`: the object being saved
/// - `parent_chain`: the proposed parent followed by its ancestors
pub fn validate_acyclic_parent<T, I>(node: T, parent_chain: I, noun: &str) -> ValidationResult
where
    T: PartialEq + Copy,
    I: IntoIterator<Item = T>,
{
    for ancestor in parent_chain {
        if ancestor == node {
            return Err(ValidationError::HierarchyMismatch(format!(
                "A {} cannot be its own parent or the parent of one of its ancestors.",
                noun
            )));
        }
    }
    Ok(())
}

/// Validate a natural key is not already taken
pub fn validate_unique(already_exists: bool, message: impl Into<String>) -> ValidationResult {
    if already_exists {
        return Err(ValidationError::Uniqueness(message.into()));
    }
    Ok(())
}

// ============================================================================
// Placement
// ============================================================================

/// Validate a location type permits a content type
pub fn validate_content_type_permitted(
    content_type: ContentType,
    location_type: &LocationType,
) -> ValidationResult {
    if !location_type.permits(content_type) {
        return Err(ValidationError::Containment(format!(
            "{} may not associate to locations of type \"{}\".",
            content_type.verbose_name_plural(),
            location_type
        )));
    }
    Ok(())
}

/// Validate a rack group's location lies within its parent group's location
pub fn validate_rack_group_within_parent(
    contained: bool,
    location: &impl Display,
    parent_group: &impl Display,
    parent_location: &impl Display,
) -> ValidationResult {
    if !contained {
        return Err(ValidationError::Containment(format!(
            "Location \"{}\" is not descended from parent rack group \"{}\" location \"{}\".",
            location, parent_group, parent_location
        )));
    }
    Ok(())
}

/// Validate a rack's location lies within its group's location
pub fn validate_rack_within_group(
    contained: bool,
    group: &impl Display,
    group_location: &impl Display,
    location: &impl Display,
) -> ValidationResult {
    if !contained {
        return Err(ValidationError::Containment(format!(
            "Assigned rack group \"{}\" belongs to a location (\"{}\") that does not include location \"{}\".",
            group, group_location, location
        )));
    }
    Ok(())
}

/// Validate a power panel's location lies within its group's location
pub fn validate_power_panel_within_group(
    contained: bool,
    group: &impl Display,
    group_location: &impl Display,
    location: &impl Display,
) -> ValidationResult {
    if !contained {
        return Err(ValidationError::Containment(format!(
            "Rack group \"{}\" belongs to a location (\"{}\") that does not contain \"{}\".",
            group, group_location, location
        )));
    }
    Ok(())
}

/// Validate a racked device shares its rack's location
pub fn validate_device_in_rack_location(
    same_location: bool,
    rack: &impl Display,
    location: &impl Display,
) -> ValidationResult {
    if !same_location {
        return Err(ValidationError::Containment(format!(
            "Rack \"{}\" does not belong to location \"{}\".",
            rack, location
        )));
    }
    Ok(())
}

// ============================================================================
// Rack units
// ============================================================================

/// Validate a rack's height against its range and mounted devices
///
/// # Rules
/// - Height is 1..=`max_units`
/// - Height covers the top unit of every mounted device
pub fn validate_rack_height<'a>(
    rack: &Rack,
    mounted: impl IntoIterator<Item = &'a Device>,
    max_units: u16,
) -> ValidationResult {
    if rack.u_height == 0 || rack.u_height > max_units {
        return Err(ValidationError::InvalidValue(format!(
            "Rack height must be between 1 and {}U.",
            max_units
        )));
    }
    let top = mounted
        .into_iter()
        .filter_map(|d| d.occupied_units().map(|units| *units.end()))
        .max();
    if let Some(top) = top {
        if top > rack.u_height {
            return Err(ValidationError::InvalidValue(format!(
                "Rack must be at least {}U tall to house currently installed devices.",
                top
            )));
        }
    }
    Ok(())
}

/// Validate the rack-related fields of a device agree with each other
///
/// Returns every violation with the field it belongs to.
pub fn validate_device_mounting_fields(device: &Device) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if device.rack.is_none() {
        if device.position.is_some() {
            errors.add(
                Field::Position,
                ValidationError::InvalidValue(
                    "Cannot select a rack position without assigning a rack.".to_string(),
                ),
            );
        }
        if device.face.is_some() {
            errors.add(
                Field::Face,
                ValidationError::InvalidValue(
                    "Cannot select a rack face without assigning a rack.".to_string(),
                ),
            );
        }
        return errors;
    }
    if device.position.is_some() && device.face.is_none() {
        errors.add(
            Field::Face,
            ValidationError::InvalidValue(
                "Must specify rack face when defining rack position.".to_string(),
            ),
        );
    }
    if device.position.is_some() && device.u_height == 0 {
        errors.add(
            Field::Position,
            ValidationError::InvalidValue(format!(
                "A U0 device type ({}) cannot be assigned to a rack position.",
                device
            )),
        );
    }
    errors
}

/// Validate a device fits at its position without overlapping neighbours
///
/// Full-depth devices occupy both faces of the units they cover.
pub fn validate_rack_space<'a>(
    device: &Device,
    rack: &Rack,
    others: impl IntoIterator<Item = &'a Device>,
) -> ValidationResult {
    let (Some(position), Some(units)) = (device.position, device.occupied_units()) else {
        return Ok(());
    };
    let no_room = || {
        ValidationError::InvalidValue(format!(
            "U{} is already occupied or does not have sufficient space to accommodate this device type: {}U",
            position, device.u_height
        ))
    };
    if position == 0 || *units.end() > rack.u_height {
        return Err(no_room());
    }
    for other in others {
        if other.id == device.id {
            continue;
        }
        let Some(other_units) = other.occupied_units() else {
            continue;
        };
        let overlaps = units.start() <= other_units.end() && other_units.start() <= units.end();
        let shares_face =
            device.is_full_depth || other.is_full_depth || device.face == other.face;
        if overlaps && shares_face {
            return Err(no_room());
        }
    }
    Ok(())
}

/// Validate a redundancy priority is only set together with a group
pub fn validate_redundancy_priority(device: &Device) -> ValidationResult {
    if device.redundancy_group_priority.is_some() && device.redundancy_group.is_none() {
        return Err(ValidationError::InvalidValue(
            "Must assign a redundancy group when defining a redundancy group priority."
                .to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Components
// ============================================================================

/// Validate a rear port's position count
pub fn validate_rear_port_positions(
    rear_port: &RearPort,
    mapped_front_ports: usize,
    max_positions: u16,
) -> ValidationResult {
    if rear_port.positions == 0 || rear_port.positions > max_positions {
        return Err(ValidationError::InvalidValue(format!(
            "Positions must be between 1 and {}.",
            max_positions
        )));
    }
    if usize::from(rear_port.positions) < mapped_front_ports {
        return Err(ValidationError::InvalidValue(format!(
            "The number of positions cannot be less than the number of mapped front ports ({})",
            mapped_front_ports
        )));
    }
    Ok(())
}

/// Validate a front port's mapping onto its rear port
///
/// # Parameters
/// - `position_taken`: another front port already maps this rear port position
pub fn validate_front_port_mapping(
    front_port: &FrontPort,
    rear_port: &RearPort,
    position_taken: bool,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if rear_port.device != front_port.device {
        errors.add(
            Field::RearPort,
            ValidationError::Containment(format!(
                "Rear port ({}) must belong to the same device",
                rear_port.name
            )),
        );
    }
    if front_port.rear_port_position == 0 || front_port.rear_port_position > rear_port.positions {
        errors.add(
            Field::RearPortPosition,
            ValidationError::InvalidValue(format!(
                "Invalid rear port position ({}): Rear port {} has only {} positions",
                front_port.rear_port_position, rear_port.name, rear_port.positions
            )),
        );
    } else if position_taken {
        errors.add(
            Field::RearPortPosition,
            ValidationError::Uniqueness(format!(
                "Position {} of rear port {} is already mapped to another front port.",
                front_port.rear_port_position, rear_port.name
            )),
        );
    }
    errors
}

/// Validate a circuit termination attaches to exactly one of location or provider network
pub fn validate_circuit_termination_attachment(termination: &CircuitTermination) -> ValidationResult {
    match (termination.location, termination.provider_network) {
        (Some(_), Some(_)) => Err(ValidationError::InvalidValue(
            "A circuit termination cannot attach to both a location and a provider network."
                .to_string(),
        )),
        (None, None) => Err(ValidationError::InvalidValue(
            "A circuit termination must attach to either a location or a provider network."
                .to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate an interface type change keeps an attached cable legal
pub fn validate_interface_type_with_cable(
    interface_type: InterfaceType,
    has_cable: bool,
) -> ValidationResult {
    if has_cable && !interface_type.is_connectable() {
        return Err(ValidationError::CableCompatibility(format!(
            "{} interfaces cannot have a cable attached.",
            interface_type
        )));
    }
    Ok(())
}

// ============================================================================
// Cables
// ============================================================================

/// Endpoint of a proposed cable with the state the rules need
#[derive(Debug, Clone, Copy)]
pub struct CableEnd<'a> {
    pub component: &'a Component,
    /// Cable currently attached to this endpoint
    pub existing_cable: Option<CableId>,
}

fn validate_connectable_end(end: &CableEnd<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match end.component {
        Component::Interface(interface) if interface.interface_type.is_virtual() => {
            errors.add(
                Field::NonField,
                ValidationError::CableCompatibility(
                    "Cannot connect a cable to a virtual interface".to_string(),
                ),
            );
        }
        Component::Interface(interface) if interface.interface_type.is_wireless() => {
            errors.add(
                Field::NonField,
                ValidationError::CableCompatibility(
                    "Cannot connect a cable to a wireless interface".to_string(),
                ),
            );
        }
        Component::CircuitTermination(termination) if termination.provider_network.is_some() => {
            errors.add(
                Field::NonField,
                ValidationError::CableCompatibility(
                    "Circuit terminations attached to a provider network may not be cabled."
                        .to_string(),
                ),
            );
        }
        _ => {}
    }
    errors
}

fn rekey(errors: ValidationErrors, field: Field) -> ValidationErrors {
    let mut rekeyed = ValidationErrors::new();
    for (_, error) in errors.iter() {
        rekeyed.add(field, error.clone());
    }
    rekeyed
}

/// Validate a proposed cable between two resolved endpoints
///
/// # Rules
/// - The two ends are distinct objects
/// - Neither end is a virtual/wireless interface or a provider-network circuit termination
/// - A front port is not cabled to its own rear port
/// - Neither end already carries a different cable
/// - The kinds are compatible
/// - Two rear ports have equal positions unless one has a single position
pub fn validate_cable_ends(cable: &Cable, a: CableEnd<'_>, b: CableEnd<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if cable.termination_a == cable.termination_b {
        errors.add(
            Field::NonField,
            ValidationError::CableCompatibility(
                "A cable cannot be terminated to the same object on both ends.".to_string(),
            ),
        );
    }

    errors.merge(rekey(validate_connectable_end(&a), Field::TerminationA));
    errors.merge(rekey(validate_connectable_end(&b), Field::TerminationB));

    match (a.component, b.component) {
        (Component::FrontPort(front), Component::RearPort(rear))
        | (Component::RearPort(rear), Component::FrontPort(front))
            if front.rear_port == rear.id =>
        {
            errors.add(
                Field::TerminationB,
                ValidationError::CableCompatibility(
                    "A front port cannot be connected to its corresponding rear port".to_string(),
                ),
            );
        }
        _ => {}
    }

    for (field, end) in [(Field::TerminationA, &a), (Field::TerminationB, &b)] {
        if let Some(existing) = end.existing_cable {
            if existing != cable.id {
                errors.add(
                    field,
                    ValidationError::CableCompatibility(format!(
                        "{} already has a cable attached (#{})",
                        end.component, existing
                    )),
                );
            }
        }
    }

    let (kind_a, kind_b) = (a.component.kind(), b.component.kind());
    if !kind_a.is_compatible_with(kind_b) {
        errors.add(
            Field::TerminationB,
            ValidationError::CableCompatibility(format!(
                "Incompatible termination types: {} and {}",
                kind_a, kind_b
            )),
        );
    }

    if let (Component::RearPort(rear_a), Component::RearPort(rear_b)) = (a.component, b.component) {
        if rear_a.positions > 1 && rear_b.positions > 1 && rear_a.positions != rear_b.positions {
            errors.add(
                Field::NonField,
                ValidationError::CableCompatibility(format!(
                    "{} has {} positions; {} has {}. Both terminations must have the same number of positions (if greater than one).",
                    rear_a.name, rear_a.positions, rear_b.name, rear_b.positions
                )),
            );
        }
    }

    errors
}

/// Validate a cable length is recorded together with its unit
pub fn validate_cable_length(cable: &Cable) -> ValidationResult {
    if cable.length.is_some() && cable.length_unit.is_none() {
        return Err(ValidationError::InvalidValue(
            "Must specify a unit when setting a cable length".to_string(),
        ));
    }
    Ok(())
}

/// Validate a saved cable keeps its terminations
pub fn validate_cable_terminations_unchanged(original: &Cable, proposed: &Cable) -> ValidationResult {
    if original.termination_a != proposed.termination_a
        || original.termination_b != proposed.termination_b
    {
        return Err(ValidationError::StructuralImmutability(
            "Cable termination points may not be modified. Delete and recreate the cable instead."
                .to_string(),
        ));
    }
    Ok(())
}
