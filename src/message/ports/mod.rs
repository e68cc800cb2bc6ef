//! Port definitions for the message subsystem.
//!
//! Ports are the seams to the remote service: the request/response
//! transport and the asynchronous push-event feed.

pub mod feed;
pub mod transport;

pub use feed::{FeedError, PushEvent, PushEventBody, PushEventFeed, PushEventKind};
pub use transport::{MessageTransport, TransportError, TransportResult};
