//! Push feed backed by an in-process channel.

use crate::message::ports::{FeedError, PushEvent, PushEventFeed};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Receiving half of an in-process push feed.
#[derive(Debug)]
pub struct ChannelFeed {
    receiver: mpsc::UnboundedReceiver<PushEvent>,
}

/// Sending half of an in-process push feed.
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    sender: mpsc::UnboundedSender<PushEvent>,
}

impl ChannelFeed {
    /// Creates a connected publisher and feed.
    ///
    /// The feed ends once every publisher has been dropped and all queued
    /// events have been consumed.
    #[must_use]
    pub fn new() -> (FeedPublisher, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (FeedPublisher { sender }, Self { receiver })
    }
}

impl FeedPublisher {
    /// Queues an event for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Closed`] once the feed has been dropped.
    pub fn publish(&self, event: PushEvent) -> Result<(), FeedError> {
        self.sender.send(event).map_err(|_| FeedError::Closed)
    }

    /// Decodes a JSON event and queues it for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] for malformed input and
    /// [`FeedError::Closed`] once the feed has been dropped.
    pub fn publish_json(&self, raw: &str) -> Result<(), FeedError> {
        self.publish(PushEvent::from_json(raw)?)
    }
}

#[async_trait]
impl PushEventFeed for ChannelFeed {
    async fn next_event(&mut self) -> Option<PushEvent> {
        self.receiver.recv().await
    }
}
