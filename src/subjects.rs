// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for topology change events
//!
//! # Subject Pattern
//!
//! Every change is published on:
//!
//! ```text
//! dcim.{object}.{action}
//! ```
//!
//! This allows for:
//! - Precise subscriptions (`dcim.cable.created`)
//! - Object-level wildcards (`dcim.rack.>`)
//! - Action-level wildcards (`dcim.*.deleted`)
//! - Global subscriptions (`dcim.>`)
//!
//! # Examples
//!
//! ```rust
//! use dcim_topology::domain::ObjectKind;
//! use dcim_topology::events::ChangeAction;
//! use dcim_topology::subjects::SubjectBuilder;
//!
//! let subject = SubjectBuilder::new()
//!     .object(ObjectKind::Cable)
//!     .action(ChangeAction::Created)
//!     .build()
//!     .unwrap();
//! assert_eq!(subject, "dcim.cable.created");
//!
//! let wildcard = SubjectBuilder::new()
//!     .object(ObjectKind::Rack)
//!     .build_wildcard()
//!     .unwrap();
//! assert_eq!(wildcard, "dcim.rack.>");
//! ```

use crate::domain::ObjectKind;
use crate::errors::{TopologyError, TopologyResult};
use crate::events::ChangeAction;

/// Root namespace for all topology subjects
pub const DCIM_ROOT: &str = "dcim";

/// Builder for topology NATS subjects
#[derive(Debug, Clone, Default)]
pub struct SubjectBuilder {
    object: Option<ObjectKind>,
    action: Option<ChangeAction>,
}

impl SubjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(mut self, object: ObjectKind) -> Self {
        self.object = Some(object);
        self
    }

    pub fn action(mut self, action: ChangeAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Build the complete subject string
    ///
    /// A missing part is reported as a configuration error.
    pub fn build(self) -> TopologyResult<String> {
        match (self.object, self.action) {
            (Some(object), Some(action)) => Ok(format!("{}.{}.{}", DCIM_ROOT, object, action)),
            (Some(object), None) => Err(TopologyError::Configuration(format!(
                "subject for {} has no action",
                object
            ))),
            (None, Some(action)) => Ok(format!("{}.*.{}", DCIM_ROOT, action)),
            (None, None) => Err(TopologyError::Configuration(
                "subject has neither object nor action".to_string(),
            )),
        }
    }

    /// Build a wildcard subscription for every action on the object
    ///
    /// Returns: `dcim.{object}.>`
    pub fn build_wildcard(self) -> TopologyResult<String> {
        match self.object {
            Some(object) => Ok(format!("{}.{}.>", DCIM_ROOT, object)),
            None => Err(TopologyError::Configuration(
                "wildcard subject has no object".to_string(),
            )),
        }
    }

    /// Build a subscription for all topology events
    ///
    /// Returns: `dcim.>`
    pub fn build_all() -> String {
        format!("{}.>", DCIM_ROOT)
    }
}

/// Subject a change to `object` is published on
pub fn change_subject(object: ObjectKind, action: ChangeAction) -> String {
    format!("{}.{}.{}", DCIM_ROOT, object, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let subject = SubjectBuilder::new()
            .object(ObjectKind::LocationType)
            .action(ChangeAction::Updated)
            .build()
            .unwrap();
        assert_eq!(subject, "dcim.location_type.updated");
    }

    #[test]
    fn test_action_wildcard() {
        let subject = SubjectBuilder::new()
            .action(ChangeAction::Deleted)
            .build()
            .unwrap();
        assert_eq!(subject, "dcim.*.deleted");
    }

    #[test]
    fn test_incomplete_subject_is_an_error() {
        assert!(SubjectBuilder::new().object(ObjectKind::Rack).build().is_err());
        assert!(SubjectBuilder::new().build_wildcard().is_err());
    }

    #[test]
    fn test_all_events_subscription() {
        assert_eq!(SubjectBuilder::build_all(), "dcim.>");
    }

    #[test]
    fn test_change_subject() {
        assert_eq!(
            change_subject(ObjectKind::RackGroup, ChangeAction::Created),
            "dcim.rack_group.created"
        );
    }
}
