// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology operations
//!
//! Validation failures are collected per offending field into
//! [`ValidationErrors`] so forms and API serializers can render them next to
//! the input that caused them. Everything that is not a validation failure
//! (missing objects, messaging, configuration) is a [`TopologyError`].

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::ObjectKind;

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Attempt to change a field that is fixed after creation
    #[error("{0}")]
    StructuralImmutability(String),

    /// Parent/child type incompatibility in a tree
    #[error("{0}")]
    HierarchyMismatch(String),

    /// Location not contained where it must be, or content type not permitted
    #[error("{0}")]
    Containment(String),

    /// Incompatible, duplicate or self-paired cable terminations
    #[error("{0}")]
    CableCompatibility(String),

    /// Duplicate natural key
    #[error("{0}")]
    Uniqueness(String),

    /// Value outside its allowed domain
    #[error("{0}")]
    InvalidValue(String),

    /// Delete blocked by dependent objects
    #[error("{0}")]
    Protected(String),
}

impl ValidationError {
    /// Human-readable message
    pub fn message(&self) -> &str {
        match self {
            ValidationError::StructuralImmutability(m)
            | ValidationError::HierarchyMismatch(m)
            | ValidationError::Containment(m)
            | ValidationError::CableCompatibility(m)
            | ValidationError::Uniqueness(m)
            | ValidationError::InvalidValue(m)
            | ValidationError::Protected(m) => m,
        }
    }
}

/// Result of a pure invariant check
pub type ValidationResult = Result<(), ValidationError>;

/// Field a violation is reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    NonField,
    Name,
    Parent,
    Nestable,
    LocationType,
    Location,
    Latitude,
    Longitude,
    RackGroup,
    Rack,
    UHeight,
    FacilityId,
    Position,
    Face,
    RedundancyGroupPriority,
    Device,
    Type,
    Positions,
    RearPort,
    RearPortPosition,
    Circuit,
    TermSide,
    ProviderNetwork,
    PowerPanel,
    TerminationA,
    TerminationB,
    LengthUnit,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::NonField => "__all__",
            Field::Name => "name",
            Field::Parent => "parent",
            Field::Nestable => "nestable",
            Field::LocationType => "location_type",
            Field::Location => "location",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::RackGroup => "rack_group",
            Field::Rack => "rack",
            Field::UHeight => "u_height",
            Field::FacilityId => "facility_id",
            Field::Position => "position",
            Field::Face => "face",
            Field::RedundancyGroupPriority => "device_redundancy_group_priority",
            Field::Device => "device",
            Field::Type => "type",
            Field::Positions => "positions",
            Field::RearPort => "rear_port",
            Field::RearPortPosition => "rear_port_position",
            Field::Circuit => "circuit",
            Field::TermSide => "term_side",
            Field::ProviderNetwork => "provider_network",
            Field::PowerPanel => "power_panel",
            Field::TerminationA => "termination_a",
            Field::TerminationB => "termination_b",
            Field::LengthUnit => "length_unit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Field-keyed collection of violations from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation against a field
    pub fn add(&mut self, field: Field, error: ValidationError) {
        let messages = self.errors.entry(field).or_default();
        if !messages.contains(&error) {
            messages.push(error);
        }
    }

    /// Record the error of a check, if it failed
    pub fn check(&mut self, field: Field, result: ValidationResult) {
        if let Err(error) = result {
            self.add(field, error);
        }
    }

    /// Fold another collection into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            for error in errors {
                self.add(field, error);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Violations for one field
    pub fn get(&self, field: Field) -> &[ValidationError] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_field(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    /// Iterate over every (field, violation) pair
    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.errors
            .iter()
            .flat_map(|(field, errors)| errors.iter().map(move |e| (*field, e)))
    }

    /// Messages keyed by field name, the shape forms and serializers expect
    pub fn by_field(&self) -> BTreeMap<Field, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, errors)| {
                (*field, errors.iter().map(|e| e.message().to_string()).collect())
            })
            .collect()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<(Field, ValidationError)> for ValidationErrors {
    fn from((field, error): (Field, ValidationError)) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match field {
                Field::NonField => write!(f, "{}", error)?,
                _ => write!(f, "{}: {}", field, error)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.by_field().serialize(serializer)
    }
}

/// Errors that can occur in topology operations
#[derive(Debug, Error)]
pub enum TopologyError {
    /// One or more rules rejected the change
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Referenced object does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: ObjectKind, id: Uuid },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TopologyError {
    pub fn not_found(kind: ObjectKind, id: impl Into<Uuid>) -> Self {
        TopologyError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Validation details, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            TopologyError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<(Field, ValidationError)> for TopologyError {
    fn from(pair: (Field, ValidationError)) -> Self {
        TopologyError::Validation(pair.into())
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(err.to_string())
    }
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;
