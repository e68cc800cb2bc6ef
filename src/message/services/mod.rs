//! Application services for cached message entities.
//!
//! - [`MessageCache`] and [`MessageEntry`] hold local state
//! - [`RemoteMutator`] pushes local changes to the remote service
//! - [`ReconciliationHook`] pulls server changes into the cache
//! - [`MessageHandle`] is what callers read from and mutate through

mod cache;
mod config;
mod entry;
mod handle;
mod mutator;
mod reconcile;

pub use cache::{MessageCache, ReadMarker};
pub use config::{MutatorConfig, MutatorConfigError, RateLimitPolicy};
pub use entry::MessageEntry;
pub use handle::MessageHandle;
pub use mutator::RemoteMutator;
pub use reconcile::{ReconcileOutcome, ReconciliationHook};
