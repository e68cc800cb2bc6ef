//! In-memory adapter implementations for testing.
//!
//! These adapters simulate the remote service and its push feed without any
//! network access, which makes them suitable for unit and integration tests
//! and for deterministic local flows.

mod feed;
mod transport;

pub use feed::{ChannelFeed, FeedPublisher};
pub use transport::InMemoryTransport;
