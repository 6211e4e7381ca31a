// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Change Events
//!
//! Every successful save or delete on a [`Topology`](crate::topology::Topology)
//! queues one event per object it touched. A cascade therefore yields the
//! event for the object the caller saved, followed by one event per child it
//! moved.
//!
//! # Correlation and Causation
//!
//! - **correlation_id**: shared by every event of one operation, or of one
//!   [`Topology::atomic`](crate::topology::Topology::atomic) block
//! - **causation_id**: the event that directly preceded this one in the
//!   same operation
//!
//! ```text
//! save_rack_group (move)
//!   correlation_id: op-1
//!   ↓
//! rack_group updated      event_id: evt-1  causation_id: None
//!   ↓
//! rack updated            event_id: evt-2  causation_id: evt-1
//!   ↓
//! device updated          event_id: evt-3  causation_id: evt-2
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::ObjectKind;
use crate::subjects::change_subject;

/// Current schema version of [`TopologyEvent`]
pub const EVENT_VERSION: u32 = 1;

/// What happened to an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "created"),
            ChangeAction::Updated => write!(f, "updated"),
            ChangeAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// Reference to the object an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: Uuid,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, id: impl Into<Uuid>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Immutable record of one change to the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyEvent {
    pub event_id: Uuid,
    pub event_version: u32,
    pub action: ChangeAction,
    pub object: ObjectRef,
    pub correlation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl TopologyEvent {
    pub fn new(
        action: ChangeAction,
        object: ObjectRef,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_version: EVENT_VERSION,
            action,
            object,
            correlation_id,
            causation_id,
            timestamp: Utc::now(),
        }
    }

    /// NATS subject this event is published on
    pub fn subject(&self) -> String {
        change_subject(self.object.kind, self.action)
    }

    /// Human-readable event type name
    pub fn event_type_name(&self) -> String {
        format!("{}.{}", self.object.kind, self.action)
    }
}
