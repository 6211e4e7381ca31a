// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS change publishing
//!
//! The topology queues one [`TopologyEvent`] per accepted mutation. This
//! module ships those events over NATS on `dcim.{object}.{action}` subjects
//! and runs handlers for subscribers on the other side.

use async_nats::{Client, ConnectOptions, Subscriber};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::{TopologyError, TopologyResult};
use crate::events::TopologyEvent;
use crate::topology::Topology;

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "dcim-topology".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl NatsConfig {
    /// Defaults overridden by `NATS_URL` (comma separated) and `NATS_CLIENT_NAME`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(urls) = std::env::var("NATS_URL") {
            let servers: Vec<String> = urls
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect();
            if !servers.is_empty() {
                config.servers = servers;
            }
        }
        if let Ok(name) = std::env::var("NATS_CLIENT_NAME") {
            config.name = name;
        }
        config
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect with the given configuration
    pub async fn new(config: NatsConfig) -> TopologyResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| TopologyError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Publish a JSON message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> TopologyResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| TopologyError::NatsPublish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    pub async fn subscribe(&self, subject: &str) -> TopologyResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| TopologyError::NatsSubscribe(e.to_string()))?;

        info!("Subscribed to subject: {}", subject);
        Ok(subscriber)
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Destination for published topology changes
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, event: &TopologyEvent) -> TopologyResult<()>;
}

#[async_trait::async_trait]
impl EventSink for NatsClient {
    async fn send(&self, event: &TopologyEvent) -> TopologyResult<()> {
        self.publish(&event.subject(), event).await
    }
}

/// Publishes queued topology changes
pub struct ChangePublisher<S = NatsClient> {
    sink: S,
}

impl<S: EventSink> ChangePublisher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Publish events in order, stopping at the first failure
    pub async fn publish_events(&self, events: &[TopologyEvent]) -> TopologyResult<usize> {
        match self.publish_prefix(events).await {
            (published, None) => Ok(published),
            (_, Some(error)) => Err(error),
        }
    }

    /// Drain a topology's pending events and publish them
    ///
    /// On failure the unpublished events go back to the front of the queue,
    /// so a later call retries them in their original order.
    pub async fn publish_pending(&self, topology: &mut Topology) -> TopologyResult<usize> {
        let events = topology.take_uncommitted_events();
        let (published, failure) = self.publish_prefix(&events).await;

        if let Some(error) = failure {
            let unpublished = events.len() - published;
            topology.requeue_events(events.into_iter().skip(published));
            warn!(published, unpublished, error = %error, "Requeued unpublished topology changes");
            return Err(error);
        }
        if published > 0 {
            info!(count = published, version = topology.version(), "Published topology changes");
        }
        Ok(published)
    }

    async fn publish_prefix(&self, events: &[TopologyEvent]) -> (usize, Option<TopologyError>) {
        for (published, event) in events.iter().enumerate() {
            if let Err(error) = self.sink.send(event).await {
                return (published, Some(error));
            }
        }
        (events.len(), None)
    }
}

/// Consumer of published topology changes
#[async_trait::async_trait]
pub trait ChangeHandler: Send + Sync {
    async fn handle(&self, event: TopologyEvent) -> TopologyResult<()>;

    /// Subject pattern to subscribe to, e.g. `dcim.rack.*`
    fn subject(&self) -> String;
}

/// Decode a payload and hand it to `handler`
pub async fn dispatch<H>(handler: &H, payload: &[u8]) -> TopologyResult<()>
where
    H: ChangeHandler + ?Sized,
{
    let event: TopologyEvent = serde_json::from_slice(payload)?;
    handler.handle(event).await
}

/// Runs change handlers against their subscriptions
pub struct ChangeProcessor {
    client: NatsClient,
}

impl ChangeProcessor {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    /// Subscribe for `handler` and process messages on a background task
    pub async fn run_handler<H>(&self, handler: Arc<H>) -> TopologyResult<()>
    where
        H: ChangeHandler + 'static,
    {
        let subject = handler.subject();
        let mut subscriber = self.client.subscribe(&subject).await?;

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                if let Err(e) = dispatch(handler.as_ref(), &msg.payload).await {
                    error!("Handler error for subject {}: {}", msg.subject, e);
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationType, ObjectKind, RackId};
    use crate::events::{ChangeAction, ObjectRef};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct Recorder {
        seen: Mutex<Vec<TopologyEvent>>,
    }

    #[async_trait::async_trait]
    impl ChangeHandler for Recorder {
        async fn handle(&self, event: TopologyEvent) -> TopologyResult<()> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(event);
            }
            Ok(())
        }

        fn subject(&self) -> String {
            "dcim.>".to_string()
        }
    }

    /// Accepts `capacity` events, then refuses everything
    struct FlakySink {
        capacity: usize,
        sent: Mutex<Vec<TopologyEvent>>,
    }

    #[async_trait::async_trait]
    impl EventSink for FlakySink {
        async fn send(&self, event: &TopologyEvent) -> TopologyResult<()> {
            let mut sent = self.sent.lock().unwrap();
            if sent.len() >= self.capacity {
                return Err(TopologyError::NatsPublish("connection closed".to_string()));
            }
            sent.push(event.clone());
            Ok(())
        }
    }

    fn topology_with_three_changes() -> Topology {
        let mut topology = Topology::new();
        for name in ["Campus", "Building", "Floor"] {
            topology.save_location_type(LocationType::new(name)).unwrap();
        }
        topology
    }

    #[test]
    fn test_publish_pending_requeues_unpublished_tail() {
        let mut topology = topology_with_three_changes();
        let queued = topology.uncommitted_events().to_vec();
        let publisher = ChangePublisher::new(FlakySink {
            capacity: 1,
            sent: Mutex::new(Vec::new()),
        });

        let err = tokio_test::block_on(publisher.publish_pending(&mut topology)).unwrap_err();
        assert!(matches!(err, TopologyError::NatsPublish(_)));
        assert_eq!(publisher.sink.sent.lock().unwrap().as_slice(), &queued[..1]);
        assert_eq!(topology.uncommitted_events(), &queued[1..]);

        // Newer changes queue behind the requeued ones
        topology.save_location_type(LocationType::new("Room")).unwrap();
        assert_eq!(topology.uncommitted_events().len(), 3);
        assert_eq!(&topology.uncommitted_events()[..2], &queued[1..]);

        let err = tokio_test::block_on(publisher.publish_events(&queued)).unwrap_err();
        assert!(matches!(err, TopologyError::NatsPublish(_)));
    }

    #[test]
    fn test_publish_pending_drains_on_success() {
        let mut topology = topology_with_three_changes();
        let publisher = ChangePublisher::new(FlakySink {
            capacity: usize::MAX,
            sent: Mutex::new(Vec::new()),
        });

        let published = tokio_test::block_on(publisher.publish_pending(&mut topology)).unwrap();
        assert_eq!(published, 3);
        assert!(topology.uncommitted_events().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = NatsConfig::default();
        assert_eq!(config.servers, vec!["nats://localhost:4222".to_string()]);
        assert_eq!(config.name, "dcim-topology");
    }

    #[test]
    fn test_dispatch_decodes_event() {
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let event = TopologyEvent::new(
            ChangeAction::Created,
            ObjectRef::new(ObjectKind::Rack, RackId::new()),
            Uuid::now_v7(),
            None,
        );
        let payload = serde_json::to_vec(&event).unwrap();

        tokio_test::block_on(dispatch(&recorder, &payload)).unwrap();
        assert_eq!(recorder.seen.lock().unwrap().as_slice(), &[event]);
    }

    #[test]
    fn test_dispatch_rejects_garbage() {
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let err = tokio_test::block_on(dispatch(&recorder, b"not json")).unwrap_err();
        assert!(matches!(err, TopologyError::Serialization(_)));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }
}
