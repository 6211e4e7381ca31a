// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cable Entity

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CableId, TerminationRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CableStatus {
    #[default]
    Connected,
    Planned,
    Decommissioning,
}

/// Unit a cable length is recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Km,
    M,
    Cm,
    Mi,
    Ft,
    In,
}

impl LengthUnit {
    /// Meters per one unit
    pub fn meters(&self) -> f64 {
        match self {
            LengthUnit::Km => 1000.0,
            LengthUnit::M => 1.0,
            LengthUnit::Cm => 0.01,
            LengthUnit::Mi => 1609.344,
            LengthUnit::Ft => 0.3048,
            LengthUnit::In => 0.0254,
        }
    }
}

/// Physical connection between two terminations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cable {
    pub id: CableId,
    pub termination_a: TerminationRef,
    pub termination_b: TerminationRef,
    #[serde(default)]
    pub status: CableStatus,
    #[serde(default)]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_unit: Option<LengthUnit>,
}

impl Cable {
    pub fn new(termination_a: TerminationRef, termination_b: TerminationRef) -> Self {
        Self {
            id: CableId::new(),
            termination_a,
            termination_b,
            status: CableStatus::default(),
            label: String::new(),
            length: None,
            length_unit: None,
        }
    }

    pub fn with_status(mut self, status: CableStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_length(mut self, length: u32, unit: LengthUnit) -> Self {
        self.length = Some(length);
        self.length_unit = Some(unit);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Length normalised to meters
    pub fn abs_length_meters(&self) -> Option<f64> {
        match (self.length, self.length_unit) {
            (Some(length), Some(unit)) => Some(f64::from(length) * unit.meters()),
            _ => None,
        }
    }

    /// The end opposite `termination`, if it is one of this cable's ends
    pub fn peer_of(&self, termination: &TerminationRef) -> Option<TerminationRef> {
        if &self.termination_a == termination {
            Some(self.termination_b)
        } else if &self.termination_b == termination {
            Some(self.termination_a)
        } else {
            None
        }
    }
}

impl fmt::Display for Cable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "#{}", self.id)
        } else {
            write!(f, "{}", self.label)
        }
    }
}
