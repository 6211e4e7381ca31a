// Copyright (c) 2025 - Cowboy AI, Inc.
//! Location type and location validation
//!
//! # Rules
//!
//! - Location type names avoid reserved terms and are unique
//! - A location type's parent is frozen while any location uses the type
//! - `nestable` is only switched off while no location nests under its own type
//! - A location's type is frozen after creation
//! - A location's parent type follows its type's parent (or itself, if nestable)
//! - `(parent, name)` is unique among locations
//! - Reparenting a location keeps every rack group containment relation intact

use tracing::{debug, info};

use crate::domain::invariants::{
    validate_acyclic_parent, validate_coordinate, validate_location_parent,
    validate_location_type_name, validate_location_type_nestable_change,
    validate_location_type_parent_change,
    validate_location_type_unchanged, validate_power_panel_within_group,
    validate_rack_group_within_parent, validate_rack_within_group, validate_unique,
};
use crate::domain::{
    round_coordinate, Location, LocationId, LocationType, LocationTypeId, ObjectKind,
};
use crate::errors::{Field, TopologyError, TopologyResult, ValidationError, ValidationErrors};
use crate::events::{ChangeAction, ObjectRef};

use super::Topology;

fn depth_exceeded(noun: &str, max: usize) -> ValidationError {
    ValidationError::HierarchyMismatch(format!(
        "A {} tree may not be deeper than {} levels.",
        noun, max
    ))
}

fn protected(noun: &str, name: &str, count: usize, dependents: &str) -> ValidationError {
    ValidationError::Protected(format!(
        "Cannot delete {} \"{}\" because {} {} still reference it.",
        noun, name, count, dependents
    ))
}

impl Topology {
    // ========================================================================
    // Location types
    // ========================================================================

    /// Validate a proposed location type against the current state
    pub fn validate_location_type(&self, proposed: &LocationType) -> TopologyResult<()> {
        let mut errors = ValidationErrors::new();
        let max_depth = self.config.max_tree_depth;

        errors.check(
            Field::Name,
            validate_location_type_name(&proposed.name, &self.config.reserved_location_type_names),
        );
        errors.check(
            Field::Name,
            validate_unique(
                self.location_types
                    .values()
                    .any(|t| t.id != proposed.id && t.name == proposed.name),
                "Location type with this Name already exists.",
            ),
        );

        if let Some(parent) = proposed.parent {
            self.require_location_type(parent)?;
            let chain = self.location_type_ancestry(parent);
            errors.check(
                Field::Parent,
                validate_acyclic_parent(proposed.id, chain.iter().copied(), "location type"),
            );
            if chain.len() >= max_depth {
                errors.add(Field::Parent, depth_exceeded("location type", max_depth));
            }
        }

        if let Some(existing) = self.location_types.get(&proposed.id) {
            errors.check(
                Field::Parent,
                validate_location_type_parent_change(
                    existing.parent,
                    proposed.parent,
                    self.index.locations_by_type.count(proposed.id),
                ),
            );
            if existing.nestable && !proposed.nestable {
                let nested = self
                    .locations_of_type(proposed.id)
                    .filter(|l| {
                        l.parent
                            .and_then(|p| self.locations.get(&p))
                            .is_some_and(|p| p.location_type == proposed.id)
                    })
                    .count();
                errors.check(
                    Field::Nestable,
                    validate_location_type_nestable_change(existing.nestable, proposed.nestable, nested),
                );
            }
        }

        Self::conclude(errors, proposed)
    }

    /// Validate and store a location type
    pub fn save_location_type(&mut self, location_type: LocationType) -> TopologyResult<LocationTypeId> {
        self.begin_change();
        self.validate_location_type(&location_type)?;

        let id = location_type.id;
        let action = if self.location_types.contains_key(&id) {
            ChangeAction::Updated
        } else {
            ChangeAction::Created
        };
        debug!(location_type = %location_type, ?action, "Saved location type");
        self.put_location_type(location_type);
        self.record(action, ObjectRef::new(ObjectKind::LocationType, id));
        Ok(id)
    }

    /// Delete a location type nothing references
    pub fn delete_location_type(&mut self, id: LocationTypeId) -> TopologyResult<()> {
        self.begin_change();
        let location_type = self.require_location_type(id)?;

        let mut errors = ValidationErrors::new();
        let in_use = self.index.locations_by_type.count(id);
        if in_use > 0 {
            errors.add(
                Field::NonField,
                protected("location type", &location_type.name, in_use, "location(s)"),
            );
        }
        let children = self.index.type_children.count(id);
        if children > 0 {
            errors.add(
                Field::NonField,
                protected("location type", &location_type.name, children, "child location type(s)"),
            );
        }
        Self::conclude(errors, location_type)?;

        if let Some(removed) = self.remove_location_type(id) {
            info!(location_type = %removed, "Deleted location type");
        }
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::LocationType, id));
        Ok(())
    }

    // ========================================================================
    // Locations
    // ========================================================================

    /// Validate a proposed location against the current state
    pub fn validate_location(&self, proposed: &Location) -> TopologyResult<()> {
        let mut errors = ValidationErrors::new();
        let max_depth = self.config.max_tree_depth;
        let location_type = self.require_location_type(proposed.location_type)?;
        let existing = self.locations.get(&proposed.id);

        if let Some(existing) = existing {
            errors.check(
                Field::LocationType,
                validate_location_type_unchanged(existing.location_type, proposed.location_type),
            );
        }

        let type_parent = location_type
            .parent
            .map(|parent| self.require_location_type(parent))
            .transpose()?;
        let parent_type = match proposed.parent {
            Some(parent) => {
                let chain = self.location_ancestry(parent);
                errors.check(
                    Field::Parent,
                    validate_acyclic_parent(proposed.id, chain.iter().copied(), "location"),
                );
                if chain.len() >= max_depth {
                    errors.add(Field::Parent, depth_exceeded("location", max_depth));
                }
                Some(self.type_of_location(parent)?)
            }
            None => None,
        };
        errors.check(
            Field::Parent,
            validate_location_parent(location_type, type_parent, parent_type),
        );

        errors.check(
            Field::Name,
            validate_unique(
                self.locations.values().any(|l| {
                    l.id != proposed.id && l.parent == proposed.parent && l.name == proposed.name
                }),
                format!(
                    "A Location named \"{}\" already exists under this parent.",
                    proposed.name
                ),
            ),
        );

        errors.check(
            Field::Latitude,
            validate_coordinate(proposed.latitude, 90.0, "Latitude"),
        );
        errors.check(
            Field::Longitude,
            validate_coordinate(proposed.longitude, 180.0, "Longitude"),
        );

        if let Some(existing) = existing {
            if existing.parent != proposed.parent {
                errors.merge(self.revalidate_containment(proposed.id, proposed.parent));
            }
        }

        Self::conclude(errors, proposed)
    }

    /// Re-check every rack group containment relation with a location reparented
    ///
    /// Violations are reported against the location's `parent` field.
    fn revalidate_containment(
        &self,
        moved: LocationId,
        new_parent: Option<LocationId>,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let reparent = Some((moved, new_parent));
        let within = |location, ancestor| self.location_within_with(location, ancestor, reparent);

        for group in self.rack_groups.values() {
            let Some(parent) = group.parent.and_then(|p| self.rack_groups.get(&p)) else {
                continue;
            };
            if let (Some(location), Some(parent_location)) = (group.location, parent.location) {
                errors.check(
                    Field::Parent,
                    validate_rack_group_within_parent(
                        within(location, parent_location),
                        &self.location_label(Some(location)),
                        parent,
                        &self.location_label(Some(parent_location)),
                    ),
                );
            }
        }

        for rack in self.racks.values() {
            let Some(group) = rack.rack_group.and_then(|g| self.rack_groups.get(&g)) else {
                continue;
            };
            if let (Some(location), Some(group_location)) = (rack.location, group.location) {
                errors.check(
                    Field::Parent,
                    validate_rack_within_group(
                        within(location, group_location),
                        group,
                        &self.location_label(Some(group_location)),
                        &self.location_label(Some(location)),
                    ),
                );
            }
        }

        for panel in self.power_panels.values() {
            let Some(group) = panel.rack_group.and_then(|g| self.rack_groups.get(&g)) else {
                continue;
            };
            if let (Some(location), Some(group_location)) = (panel.location, group.location) {
                errors.check(
                    Field::Parent,
                    validate_power_panel_within_group(
                        within(location, group_location),
                        group,
                        &self.location_label(Some(group_location)),
                        &self.location_label(Some(location)),
                    ),
                );
            }
        }

        errors
    }

    /// Validate and store a location
    ///
    /// Coordinates are rounded to six decimal places before validation.
    pub fn save_location(&mut self, mut location: Location) -> TopologyResult<LocationId> {
        self.begin_change();
        location.latitude = location.latitude.map(round_coordinate);
        location.longitude = location.longitude.map(round_coordinate);
        self.validate_location(&location)?;

        let id = location.id;
        let action = if self.locations.contains_key(&id) {
            ChangeAction::Updated
        } else {
            ChangeAction::Created
        };
        debug!(location = %location, ?action, "Saved location");
        self.put_location(location);
        self.record(action, ObjectRef::new(ObjectKind::Location, id));
        Ok(id)
    }

    /// Delete a location nothing is placed at
    pub fn delete_location(&mut self, id: LocationId) -> TopologyResult<()> {
        self.begin_change();
        let location = self.require_location(id)?;

        let dependents = [
            (self.index.location_children.count(id), "child location(s)"),
            (self.index.groups_by_location.count(id), "rack group(s)"),
            (self.index.racks_by_location.count(id), "rack(s)"),
            (self.index.devices_by_location.count(id), "device(s)"),
            (self.index.panels_by_location.count(id), "power panel(s)"),
            (
                self.index.terminations_by_location.count(id),
                "circuit termination(s)",
            ),
        ];
        let mut errors = ValidationErrors::new();
        for (count, noun) in dependents {
            if count > 0 {
                errors.add(
                    Field::NonField,
                    protected("location", &location.name, count, noun),
                );
            }
        }
        Self::conclude(errors, location)?;

        if let Some(removed) = self.remove_location(id) {
            info!(location = %removed, "Deleted location");
        }
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::Location, id));
        Ok(())
    }

    /// Locations of a given type
    pub fn locations_of_type(&self, id: LocationTypeId) -> impl Iterator<Item = &Location> {
        self.index
            .locations_by_type
            .children(id)
            .filter_map(move |location| self.locations.get(&location))
    }

    /// Whether a location type may be reparented right now
    pub fn location_type_in_use(&self, id: LocationTypeId) -> TopologyResult<bool> {
        if !self.location_types.contains_key(&id) {
            return Err(TopologyError::not_found(ObjectKind::LocationType, id));
        }
        Ok(self.index.locations_by_type.has_children(id))
    }
}
