//! Cached chat messages and their remote mutation.
//!
//! A message is owned by the remote service. The client holds a cached copy
//! that is changed in two ways only: by a confirmed response to a local
//! request, or by a notification the service pushes. Failed requests never
//! change the cached copy.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure domain types ([`domain::MessageRecord`], [`domain::Attachment`], [`domain::MessageSnapshot`], etc.)
//! - **Ports**: Abstract trait interfaces ([`ports::MessageTransport`], [`ports::PushEventFeed`])
//! - **Adapters**: Concrete implementations ([`adapters::memory::InMemoryTransport`], [`adapters::memory::ChannelFeed`])
//! - **Services**: Cache, mutation, and reconciliation ([`services::RemoteMutator`], [`services::ReconciliationHook`])
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use herald::message::adapters::memory::InMemoryTransport;
//! use herald::message::domain::{ChannelId, MessageId, MessageSnapshot, UserId};
//! use herald::message::services::{MessageCache, RemoteMutator};
//! use mockable::DefaultClock;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let me = UserId::new("7");
//! let snapshot = MessageSnapshot::new(
//!     MessageId::new("100"),
//!     ChannelId::new("general"),
//!     me.clone(),
//!     "hello",
//!     Utc::now(),
//! );
//!
//! let transport = Arc::new(InMemoryTransport::new(me.clone()));
//! transport.seed(snapshot.clone())?;
//!
//! let mutator = Arc::new(
//!     RemoteMutator::new(transport, Arc::new(MessageCache::new()), Arc::new(DefaultClock))
//!         .with_identity(me),
//! );
//! let message = mutator.observe(snapshot);
//! message.edit("hello, world").await?;
//! assert_eq!(message.content(), "hello, world");
//! assert!(message.edited_timestamp().is_some());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
