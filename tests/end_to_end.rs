// Copyright (c) 2025 - Cowboy AI, Inc.
//! End-to-end topology scenarios
//!
//! Builds a campus from an empty topology, then publishes the recorded
//! changes over NATS.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dcim_topology::{
    ChangeAction, ChangeHandler, ChangeProcessor, ChangePublisher, ContentType, EngineConfig,
    Field, Location, LocationType, NatsClient, NatsConfig, ObjectKind, Rack, RackGroup,
    SubjectBuilder, Topology, TopologyEvent, TopologyResult,
};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

#[test]
fn test_campus_to_rack_and_misplaced_rack() {
    dcim_topology::logging::init_tracing("dcim_topology=debug");
    let mut topology = Topology::new();

    // Campus → Building → Campus1 → Bldg1 → rack group → rack
    let campus = topology
        .save_location_type(LocationType::new("Campus"))
        .unwrap();
    let building = topology
        .save_location_type(
            LocationType::new("Building")
                .with_parent(campus)
                .with_content_types([ContentType::RackGroup, ContentType::Rack]),
        )
        .unwrap();
    let campus1 = topology
        .save_location(Location::new("Campus1", campus))
        .unwrap();
    let bldg1 = topology
        .save_location(Location::new("Bldg1", building).with_parent(campus1))
        .unwrap();
    let group = topology
        .save_rack_group(RackGroup::new("Row A", bldg1))
        .unwrap();
    let rack = topology
        .save_rack(Rack::new("R1", bldg1).with_group(group))
        .unwrap();
    assert_eq!(topology.racks_in_group(group).map(|r| r.id).collect::<Vec<_>>(), vec![rack]);

    // A rack directly at the campus is refused, naming the campus type
    let err = topology.save_rack(Rack::new("R2", campus1)).unwrap_err();
    let message = err.validation_errors().unwrap().get(Field::Location)[0].message().to_string();
    assert!(message.contains("Campus"), "{message}");
    assert_eq!(topology.racks().count(), 1);

    // Six accepted saves, six events, in order
    let events = topology.take_uncommitted_events();
    let kinds: Vec<_> = events.iter().map(|e| e.object.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::LocationType,
            ObjectKind::LocationType,
            ObjectKind::Location,
            ObjectKind::Location,
            ObjectKind::RackGroup,
            ObjectKind::Rack,
        ]
    );
    assert!(events.iter().all(|e| e.action == ChangeAction::Created));
    assert_eq!(events[5].subject(), "dcim.rack.created");
}

#[test]
fn test_custom_reserved_names() -> anyhow::Result<()> {
    let config = EngineConfig::from_json_str(r#"{"reserved_location_type_names": ["zone"]}"#)?;
    let mut topology = Topology::with_config(config);

    assert!(topology.save_location_type(LocationType::new("Zones")).is_err());
    topology.save_location_type(LocationType::new("Region"))?;
    Ok(())
}

#[test]
fn test_validation_errors_serialize_by_field() -> anyhow::Result<()> {
    let mut topology = Topology::new();
    let campus = topology.save_location_type(LocationType::new("Campus"))?;
    let campus1 = topology.save_location(Location::new("Campus1", campus))?;

    let err = topology
        .save_rack_group(RackGroup::new("Row A", campus1))
        .unwrap_err();
    let json = serde_json::to_value(err.validation_errors())?;
    assert_eq!(
        json,
        serde_json::json!({
            "location": ["Rack groups may not associate to locations of type \"Campus\"."]
        })
    );
    Ok(())
}

struct Forwarder {
    subject: String,
    sender: mpsc::UnboundedSender<TopologyEvent>,
}

#[async_trait]
impl ChangeHandler for Forwarder {
    async fn handle(&self, event: TopologyEvent) -> TopologyResult<()> {
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subject(&self) -> String {
        self.subject.clone()
    }
}

#[tokio::test]
#[ignore] // Requires a NATS server on NATS_URL
async fn test_changes_round_trip_over_nats() {
    let client = NatsClient::new(NatsConfig::from_env()).await.unwrap();

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let subject = SubjectBuilder::new()
        .object(ObjectKind::Location)
        .build_wildcard()
        .unwrap();
    let processor = ChangeProcessor::new(client.clone());
    processor
        .run_handler(Arc::new(Forwarder { subject, sender }))
        .await
        .unwrap();

    let mut topology = Topology::new();
    let campus = topology
        .save_location_type(LocationType::new("Campus"))
        .unwrap();
    let campus1 = topology
        .save_location(Location::new("Campus1", campus))
        .unwrap();

    let published = ChangePublisher::new(client)
        .publish_pending(&mut topology)
        .await
        .unwrap();
    assert_eq!(published, 2);
    assert!(topology.uncommitted_events().is_empty());

    let received = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received.object.id, campus1.as_uuid());
    assert_eq!(received.action, ChangeAction::Created);
}
