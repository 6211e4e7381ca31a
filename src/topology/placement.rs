// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rack group, rack, device and power panel placement
//!
//! Each placement object may sit at a location. The location's type must
//! permit the object's content type, and an object filed under a rack group
//! must sit within that group's location. Changing the location of a rack
//! group or rack cascades to its contents (see [`super::cascade`]).

use tracing::{debug, info};

use crate::domain::invariants::{
    validate_acyclic_parent, validate_content_type_permitted, validate_device_in_rack_location,
    validate_device_mounting_fields, validate_power_panel_within_group, validate_rack_group_within_parent,
    validate_rack_height, validate_rack_space, validate_rack_within_group, validate_redundancy_priority,
    validate_unique,
};
use crate::domain::{
    Component, ContentType, Device, DeviceId, LocationId, ObjectKind, PowerPanel, PowerPanelId, Rack,
    RackGroup, RackGroupId, RackId,
};
use crate::errors::{Field, TopologyResult, ValidationError, ValidationErrors};
use crate::events::{ChangeAction, ObjectRef};

use super::{CascadePlan, Topology};

impl Topology {
    pub(crate) fn check_location_permits(
        &self,
        errors: &mut ValidationErrors,
        location: Option<LocationId>,
        content_type: ContentType,
    ) -> TopologyResult<()> {
        if let Some(location) = location {
            let location_type = self.type_of_location(location)?;
            errors.check(
                Field::Location,
                validate_content_type_permitted(content_type, location_type),
            );
        }
        Ok(())
    }

    /// Whether `location` lies within `container`; unset sides never conflict
    fn contained(&self, location: Option<LocationId>, container: Option<LocationId>) -> bool {
        match (location, container) {
            (Some(location), Some(container)) => self.location_within(location, container),
            _ => true,
        }
    }

    fn action_for<T>(exists: Option<T>) -> ChangeAction {
        match exists {
            Some(_) => ChangeAction::Updated,
            None => ChangeAction::Created,
        }
    }

    // ========================================================================
    // Rack groups
    // ========================================================================

    fn check_rack_group(&self, proposed: &RackGroup) -> TopologyResult<(ValidationErrors, Option<CascadePlan>)> {
        let mut errors = ValidationErrors::new();
        let max_depth = self.config.max_tree_depth;

        self.check_location_permits(&mut errors, proposed.location, ContentType::RackGroup)?;

        if let Some(parent_id) = proposed.parent {
            let parent = self.require_rack_group(parent_id)?;
            let chain = self.rack_group_ancestry(parent_id);
            errors.check(
                Field::Parent,
                validate_acyclic_parent(proposed.id, chain.iter().copied(), "rack group"),
            );
            if chain.len() >= max_depth {
                errors.add(
                    Field::Parent,
                    ValidationError::HierarchyMismatch(format!(
                        "A rack group tree may not be deeper than {} levels.",
                        max_depth
                    )),
                );
            }
            errors.check(
                Field::Location,
                validate_rack_group_within_parent(
                    self.contained(proposed.location, parent.location),
                    &self.location_label(proposed.location),
                    parent,
                    &self.location_label(parent.location),
                ),
            );
        }

        errors.check(
            Field::Name,
            validate_unique(
                self.rack_groups.values().any(|g| {
                    g.id != proposed.id && g.location == proposed.location && g.name == proposed.name
                }),
                format!(
                    "A rack group named \"{}\" already exists at this location.",
                    proposed.name
                ),
            ),
        );

        let mut plan = None;
        if let Some(existing) = self.rack_groups.get(&proposed.id) {
            if existing.location != proposed.location {
                let cascade = self.plan_rack_group_move(proposed.id, proposed.location)?;
                errors.merge(self.validate_cascade(&cascade, &[])?);
                plan = Some(cascade);
            }
        }

        Ok((errors, plan))
    }

    /// Validate a proposed rack group, including any cascade its move implies
    pub fn validate_rack_group(&self, proposed: &RackGroup) -> TopologyResult<()> {
        let (errors, _) = self.check_rack_group(proposed)?;
        Self::conclude(errors, proposed)
    }

    /// Validate and store a rack group, moving its contents with it
    pub fn save_rack_group(&mut self, group: RackGroup) -> TopologyResult<RackGroupId> {
        self.begin_change();
        let (errors, plan) = self.check_rack_group(&group)?;
        Self::conclude(errors, &group)?;

        let id = group.id;
        let action = Self::action_for(self.rack_groups.get(&id));
        debug!(rack_group = %group, ?action, "Saved rack group");
        self.put_rack_group(group);
        self.record(action, ObjectRef::new(ObjectKind::RackGroup, id));
        if let Some(plan) = plan {
            self.apply_cascade(&plan);
        }
        Ok(id)
    }

    /// Delete a rack group and its descendant groups
    ///
    /// Racks and power panels filed under any deleted group stay where they
    /// are and lose their group.
    pub fn delete_rack_group(&mut self, id: RackGroupId) -> TopologyResult<()> {
        self.begin_change();
        let subtree = self.plan_rack_group_move(id, None)?;

        for rack_id in &subtree.racks {
            if let Some(mut rack) = self.racks.get(rack_id).cloned() {
                rack.rack_group = None;
                self.put_rack(rack);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::Rack, *rack_id));
            }
        }
        for panel_id in &subtree.power_panels {
            if let Some(mut panel) = self.power_panels.get(panel_id).cloned() {
                panel.rack_group = None;
                self.put_power_panel(panel);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::PowerPanel, *panel_id));
            }
        }
        for group_id in subtree.rack_groups.iter().rev().chain(std::iter::once(&id)) {
            if self.remove_rack_group(*group_id).is_some() {
                self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::RackGroup, *group_id));
            }
        }

        info!(
            rack_group = %id,
            descendants = subtree.rack_groups.len(),
            "Deleted rack group"
        );
        Ok(())
    }

    // ========================================================================
    // Racks
    // ========================================================================

    fn check_rack(&self, proposed: &Rack) -> TopologyResult<(ValidationErrors, Option<CascadePlan>)> {
        let mut errors = ValidationErrors::new();

        self.check_location_permits(&mut errors, proposed.location, ContentType::Rack)?;

        if let Some(group_id) = proposed.rack_group {
            let group = self.require_rack_group(group_id)?;
            errors.check(
                Field::RackGroup,
                validate_rack_within_group(
                    self.contained(proposed.location, group.location),
                    group,
                    &self.location_label(group.location),
                    &self.location_label(proposed.location),
                ),
            );

            errors.check(
                Field::Name,
                validate_unique(
                    self.racks.values().any(|r| {
                        r.id != proposed.id && r.rack_group == proposed.rack_group && r.name == proposed.name
                    }),
                    format!("A rack named \"{}\" already exists in this rack group.", proposed.name),
                ),
            );
            if let Some(facility_id) = &proposed.facility_id {
                errors.check(
                    Field::FacilityId,
                    validate_unique(
                        self.racks.values().any(|r| {
                            r.id != proposed.id
                                && r.rack_group == proposed.rack_group
                                && r.facility_id.as_ref() == Some(facility_id)
                        }),
                        format!(
                            "A rack with facility ID \"{}\" already exists in this rack group.",
                            facility_id
                        ),
                    ),
                );
            }
        }

        errors.check(
            Field::UHeight,
            validate_rack_height(
                proposed,
                self.devices_in_rack(proposed.id),
                self.config.max_rack_units,
            ),
        );

        let mut plan = None;
        if let Some(existing) = self.racks.get(&proposed.id) {
            if existing.location != proposed.location {
                let cascade = self.plan_rack_move(proposed.id, proposed.location)?;
                errors.merge(self.validate_cascade(&cascade, &[proposed.id])?);
                plan = Some(cascade);
            }
        }

        Ok((errors, plan))
    }

    /// Validate a proposed rack, including moving its devices
    pub fn validate_rack(&self, proposed: &Rack) -> TopologyResult<()> {
        let (errors, _) = self.check_rack(proposed)?;
        Self::conclude(errors, proposed)
    }

    /// Validate and store a rack, moving its devices with it
    pub fn save_rack(&mut self, rack: Rack) -> TopologyResult<RackId> {
        self.begin_change();
        let (errors, plan) = self.check_rack(&rack)?;
        Self::conclude(errors, &rack)?;

        let id = rack.id;
        let action = Self::action_for(self.racks.get(&id));
        debug!(rack = %rack, ?action, "Saved rack");
        self.put_rack(rack);
        self.record(action, ObjectRef::new(ObjectKind::Rack, id));
        if let Some(plan) = plan {
            self.apply_cascade(&plan);
        }
        Ok(id)
    }

    /// Delete an empty rack
    pub fn delete_rack(&mut self, id: RackId) -> TopologyResult<()> {
        self.begin_change();
        let rack = self.require_rack(id)?;

        let mut errors = ValidationErrors::new();
        let devices = self.index.devices_by_rack.count(id);
        let feeds = self.index.feeds_by_rack.count(id);
        if devices > 0 {
            errors.add(
                Field::NonField,
                ValidationError::Protected(format!(
                    "Cannot delete rack \"{}\" because {} device(s) still reference it.",
                    rack, devices
                )),
            );
        }
        if feeds > 0 {
            errors.add(
                Field::NonField,
                ValidationError::Protected(format!(
                    "Cannot delete rack \"{}\" because {} power feed(s) still reference it.",
                    rack, feeds
                )),
            );
        }
        Self::conclude(errors, rack)?;

        if let Some(removed) = self.remove_rack(id) {
            info!(rack = %removed, "Deleted rack");
        }
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::Rack, id));
        Ok(())
    }

    // ========================================================================
    // Devices
    // ========================================================================

    /// Validate a proposed device
    pub fn validate_device(&self, proposed: &Device) -> TopologyResult<()> {
        let mut errors = ValidationErrors::new();

        self.check_location_permits(&mut errors, proposed.location, ContentType::Device)?;

        errors.merge(validate_device_mounting_fields(proposed));
        if let Some(rack_id) = proposed.rack {
            let rack = self.require_rack(rack_id)?;
            errors.check(
                Field::Rack,
                validate_device_in_rack_location(
                    rack.location == proposed.location,
                    rack,
                    &self.location_label(proposed.location),
                ),
            );
            errors.check(
                Field::Position,
                validate_rack_space(proposed, rack, self.devices_in_rack(rack_id)),
            );
        }

        errors.check(
            Field::RedundancyGroupPriority,
            validate_redundancy_priority(proposed),
        );

        if let Some(name) = proposed.name.as_deref().filter(|n| !n.is_empty()) {
            errors.check(
                Field::Name,
                validate_unique(
                    self.devices.values().any(|d| {
                        d.id != proposed.id
                            && d.location == proposed.location
                            && d.tenant == proposed.tenant
                            && d.name.as_deref() == Some(name)
                    }),
                    "Device name must be unique per location and tenant.",
                ),
            );
        }

        Self::conclude(errors, proposed)
    }

    /// Validate and store a device
    pub fn save_device(&mut self, device: Device) -> TopologyResult<DeviceId> {
        self.begin_change();
        self.validate_device(&device)?;

        let id = device.id;
        let action = Self::action_for(self.devices.get(&id));
        debug!(device = %device, ?action, "Saved device");
        self.put_device(device);
        self.record(action, ObjectRef::new(ObjectKind::Device, id));
        Ok(id)
    }

    /// Delete a device with its components and their cables
    pub fn delete_device(&mut self, id: DeviceId) -> TopologyResult<()> {
        self.begin_change();
        let device = self.require_device(id)?.clone();

        let components: Vec<_> = self.index.components_by_device.children(id).collect();
        for component in components {
            self.delete_component_tree(component);
        }

        self.remove_device(id);
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::Device, id));
        info!(device = %device, "Deleted device");
        Ok(())
    }

    // ========================================================================
    // Power panels
    // ========================================================================

    /// Validate a proposed power panel
    pub fn validate_power_panel(&self, proposed: &PowerPanel) -> TopologyResult<()> {
        let mut errors = ValidationErrors::new();

        self.check_location_permits(&mut errors, proposed.location, ContentType::PowerPanel)?;

        if let Some(group_id) = proposed.rack_group {
            let group = self.require_rack_group(group_id)?;
            errors.check(
                Field::RackGroup,
                validate_power_panel_within_group(
                    self.contained(proposed.location, group.location),
                    group,
                    &self.location_label(group.location),
                    &self.location_label(proposed.location),
                ),
            );
        }

        errors.check(
            Field::Name,
            validate_unique(
                self.power_panels.values().any(|p| {
                    p.id != proposed.id && p.location == proposed.location && p.name == proposed.name
                }),
                format!(
                    "A power panel named \"{}\" already exists at this location.",
                    proposed.name
                ),
            ),
        );

        if let Some(existing) = self.power_panels.get(&proposed.id) {
            if existing.location != proposed.location {
                for feed_id in self.index.feeds_by_panel.children(proposed.id) {
                    let Some(Component::PowerFeed(feed)) = self.component(feed_id) else {
                        continue;
                    };
                    let Some(rack) = feed.rack.and_then(|r| self.racks.get(&r)) else {
                        continue;
                    };
                    if rack.location != proposed.location {
                        errors.add(
                            Field::Location,
                            ValidationError::Containment(format!(
                                "Rack {} ({}) and power panel {} ({}) are in different locations",
                                rack,
                                self.location_label(rack.location),
                                proposed,
                                self.location_label(proposed.location)
                            )),
                        );
                    }
                }
            }
        }

        Self::conclude(errors, proposed)
    }

    /// Validate and store a power panel
    pub fn save_power_panel(&mut self, panel: PowerPanel) -> TopologyResult<PowerPanelId> {
        self.begin_change();
        self.validate_power_panel(&panel)?;

        let id = panel.id;
        let action = Self::action_for(self.power_panels.get(&id));
        debug!(power_panel = %panel, ?action, "Saved power panel");
        self.put_power_panel(panel);
        self.record(action, ObjectRef::new(ObjectKind::PowerPanel, id));
        Ok(id)
    }

    /// Delete a power panel no feed draws from
    pub fn delete_power_panel(&mut self, id: PowerPanelId) -> TopologyResult<()> {
        self.begin_change();
        let panel = self.require_power_panel(id)?;

        let feeds = self.index.feeds_by_panel.count(id);
        if feeds > 0 {
            let errors: ValidationErrors = (
                Field::NonField,
                ValidationError::Protected(format!(
                    "Cannot delete power panel \"{}\" because {} power feed(s) still reference it.",
                    panel, feeds
                )),
            )
                .into();
            Self::conclude(errors, panel)?;
        }

        if let Some(removed) = self.remove_power_panel(id) {
            info!(power_panel = %removed, "Deleted power panel");
        }
        self.record(ChangeAction::Deleted, ObjectRef::new(ObjectKind::PowerPanel, id));
        Ok(())
    }
}
