//! Herald: cached chat messages with remote mutation and reconciliation.
//!
//! This crate keeps a local cache of chat messages that live on a remote
//! service, issues edits, replies, deletions, and read acknowledgements
//! against that service, and folds server-pushed notifications back into the
//! cache.
//!
//! # Architecture
//!
//! Herald follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the remote service and its push feed
//! - **Adapters**: Concrete implementations of ports
//! - **Services**: The cache, the remote mutator, and the reconciliation hook
//!
//! # Modules
//!
//! - [`message`]: Message entities, their remote mutation, and reconciliation

pub mod message;
