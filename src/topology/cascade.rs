// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cascading location moves
//!
//! Moving a rack group drags its whole subtree along: descendant groups, the
//! racks and power panels filed under any of them, and the devices in those
//! racks. Moving a rack drags its devices. The move is planned first, the
//! plan is checked against the target location's type, and only a clean plan
//! is applied.
//!
//! ```text
//! group (moved)
//!   ├─ child group ─┬─ rack ── device
//!   │               └─ power panel
//!   └─ rack ── device
//! ```

use std::collections::HashSet;

use tracing::info;

use crate::domain::invariants::validate_content_type_permitted;
use crate::domain::{
    Component, ContentType, DeviceId, LocationId, ObjectKind, PowerPanelId, RackGroupId, RackId,
};
use crate::errors::{Field, TopologyResult, ValidationError, ValidationErrors};
use crate::events::{ChangeAction, ObjectRef};

use super::Topology;

/// Objects a location move will rewrite, excluding the object being saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadePlan {
    /// New location for every object in the plan; `None` clears it
    pub target: Option<LocationId>,
    pub rack_groups: Vec<RackGroupId>,
    pub racks: Vec<RackId>,
    pub power_panels: Vec<PowerPanelId>,
    pub devices: Vec<DeviceId>,
}

impl CascadePlan {
    pub fn is_empty(&self) -> bool {
        self.rack_groups.is_empty()
            && self.racks.is_empty()
            && self.power_panels.is_empty()
            && self.devices.is_empty()
    }

    /// Number of objects the plan rewrites
    pub fn len(&self) -> usize {
        self.rack_groups.len() + self.racks.len() + self.power_panels.len() + self.devices.len()
    }
}

impl Topology {
    /// Plan moving a rack group, and everything beneath it, to `target`
    ///
    /// Depth-first over the group tree with an explicit stack; each group is
    /// visited once and the walk stops at the configured maximum depth.
    pub fn plan_rack_group_move(
        &self,
        group: RackGroupId,
        target: Option<LocationId>,
    ) -> TopologyResult<CascadePlan> {
        self.require_rack_group(group)?;
        let max_depth = self.config.max_tree_depth;

        let mut plan = CascadePlan {
            target,
            ..Default::default()
        };
        let mut visited = HashSet::from([group]);
        let mut subtree = vec![group];
        let mut stack = vec![(group, 0usize)];

        while let Some((current, depth)) = stack.pop() {
            for child in self.index.group_children.children(current) {
                if depth + 1 > max_depth {
                    return Err((
                        Field::Location,
                        ValidationError::HierarchyMismatch(format!(
                            "A rack group tree may not be deeper than {} levels.",
                            max_depth
                        )),
                    )
                        .into());
                }
                if visited.insert(child) {
                    plan.rack_groups.push(child);
                    subtree.push(child);
                    stack.push((child, depth + 1));
                }
            }
        }

        for member in &subtree {
            plan.racks.extend(self.index.racks_by_group.children(*member));
            plan.power_panels
                .extend(self.index.panels_by_group.children(*member));
        }
        for rack in &plan.racks {
            plan.devices.extend(self.index.devices_by_rack.children(*rack));
        }

        Ok(plan)
    }

    /// Plan moving a rack and its devices to `target`
    pub fn plan_rack_move(&self, rack: RackId, target: Option<LocationId>) -> TopologyResult<CascadePlan> {
        self.require_rack(rack)?;
        Ok(CascadePlan {
            target,
            devices: self.index.devices_by_rack.children(rack).collect(),
            ..Default::default()
        })
    }

    /// Check a plan against the target location
    ///
    /// Every content type in the plan must be permitted by the target's type,
    /// and every power feed touched by the move must keep its rack and panel
    /// in the same location.
    /// Violations are reported against `location`, once per content type.
    pub fn validate_cascade(&self, plan: &CascadePlan, moved_racks: &[RackId]) -> TopologyResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(target) = plan.target {
            let target_type = self.type_of_location(target)?;
            let moved = [
                (ContentType::RackGroup, plan.rack_groups.len()),
                (ContentType::Rack, plan.racks.len()),
                (ContentType::PowerPanel, plan.power_panels.len()),
                (ContentType::Device, plan.devices.len()),
            ];
            for (content_type, count) in moved {
                if count > 0 {
                    errors.check(
                        Field::Location,
                        validate_content_type_permitted(content_type, target_type),
                    );
                }
            }
        }

        let panels_moving: HashSet<PowerPanelId> = plan.power_panels.iter().copied().collect();
        for rack_id in plan.racks.iter().chain(moved_racks) {
            for feed_id in self.index.feeds_by_rack.children(*rack_id) {
                let Some(Component::PowerFeed(feed)) = self.component(feed_id) else {
                    continue;
                };
                let Some(panel) = self.power_panels.get(&feed.power_panel) else {
                    continue;
                };
                let panel_location = if panels_moving.contains(&panel.id) {
                    plan.target
                } else {
                    panel.location
                };
                if panel_location != plan.target {
                    let rack_name = self
                        .racks
                        .get(rack_id)
                        .map(|r| r.name.clone())
                        .unwrap_or_default();
                    errors.add(
                        Field::Location,
                        ValidationError::Containment(format!(
                            "Rack {} ({}) and power panel {} ({}) are in different locations",
                            rack_name,
                            self.location_label(plan.target),
                            panel,
                            self.location_label(panel_location)
                        )),
                    );
                }
            }
        }

        // Feeds on moved panels whose rack stays behind
        let racks_moving: HashSet<RackId> = plan.racks.iter().chain(moved_racks).copied().collect();
        for panel_id in &plan.power_panels {
            for feed_id in self.index.feeds_by_panel.children(*panel_id) {
                let Some(Component::PowerFeed(feed)) = self.component(feed_id) else {
                    continue;
                };
                let Some(rack) = feed.rack.and_then(|r| self.racks.get(&r)) else {
                    continue;
                };
                if racks_moving.contains(&rack.id) || rack.location == plan.target {
                    continue;
                }
                let panel_name = self
                    .power_panels
                    .get(panel_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                errors.add(
                    Field::Location,
                    ValidationError::Containment(format!(
                        "Rack {} ({}) and power panel {} ({}) are in different locations",
                        rack,
                        self.location_label(rack.location),
                        panel_name,
                        self.location_label(plan.target)
                    )),
                );
            }
        }

        Ok(errors)
    }

    /// Write a validated plan, recording one update per object
    pub(crate) fn apply_cascade(&mut self, plan: &CascadePlan) {
        for id in &plan.rack_groups {
            if let Some(mut group) = self.rack_groups.get(id).cloned() {
                group.location = plan.target;
                self.put_rack_group(group);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::RackGroup, *id));
            }
        }
        for id in &plan.racks {
            if let Some(mut rack) = self.racks.get(id).cloned() {
                rack.location = plan.target;
                self.put_rack(rack);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::Rack, *id));
            }
        }
        for id in &plan.power_panels {
            if let Some(mut panel) = self.power_panels.get(id).cloned() {
                panel.location = plan.target;
                self.put_power_panel(panel);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::PowerPanel, *id));
            }
        }
        for id in &plan.devices {
            if let Some(mut device) = self.devices.get(id).cloned() {
                device.location = plan.target;
                self.put_device(device);
                self.record(ChangeAction::Updated, ObjectRef::new(ObjectKind::Device, *id));
            }
        }

        if !plan.is_empty() {
            info!(
                target = %self.location_label(plan.target),
                rack_groups = plan.rack_groups.len(),
                racks = plan.racks.len(),
                power_panels = plan.power_panels.len(),
                devices = plan.devices.len(),
                "Cascaded location change"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, LocationType, Rack, RackGroup};

    #[test]
    fn test_plan_visits_each_descendant_once() {
        let mut topology = Topology::new();
        let site = topology
            .save_location_type(
                LocationType::new("Site-like").with_content_types([ContentType::RackGroup, ContentType::Rack]),
            )
            .unwrap();
        let location = topology.save_location(Location::new("L1", site)).unwrap();
        let root = topology.save_rack_group(RackGroup::new("root", location)).unwrap();
        let a = topology
            .save_rack_group(RackGroup::new("a", location).with_parent(root))
            .unwrap();
        let b = topology
            .save_rack_group(RackGroup::new("b", location).with_parent(a))
            .unwrap();
        topology
            .save_rack(Rack::new("r1", location).with_group(b))
            .unwrap();

        let plan = topology.plan_rack_group_move(root, None).unwrap();
        assert_eq!(plan.rack_groups.len(), 2);
        assert!(plan.rack_groups.contains(&a) && plan.rack_groups.contains(&b));
        assert_eq!(plan.racks.len(), 1);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_plan_respects_depth_bound() {
        let config = crate::config::EngineConfig::default().with_max_tree_depth(2);
        let mut topology = Topology::with_config(config);
        let site = topology
            .save_location_type(LocationType::new("Hall").with_content_types([ContentType::RackGroup]))
            .unwrap();
        let location = topology.save_location(Location::new("H1", site)).unwrap();
        let root = topology.save_rack_group(RackGroup::new("g0", location)).unwrap();
        let g1 = topology
            .save_rack_group(RackGroup::new("g1", location).with_parent(root))
            .unwrap();
        let err = topology
            .save_rack_group(RackGroup::new("g2", location).with_parent(g1))
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains_field(Field::Parent));

        let plan = topology.plan_rack_group_move(root, None).unwrap();
        assert_eq!(plan.rack_groups, vec![g1]);
    }
}
