//! Shared world state for remote message lifecycle scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use herald::message::{
    adapters::memory::InMemoryTransport,
    domain::{ChannelId, UserId},
    error::MessageError,
    services::{
        MessageCache, MessageHandle, RateLimitPolicy, ReconciliationHook, RemoteMutator,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Mutator type used by the BDD world.
pub type TestMutator = RemoteMutator<InMemoryTransport, DefaultClock>;

/// Handle type used by the BDD world.
pub type TestHandle = MessageHandle<InMemoryTransport, DefaultClock>;

/// Scenario world for message lifecycle behaviour tests.
pub struct MessageWorld {
    pub transport: Arc<InMemoryTransport>,
    pub cache: Arc<MessageCache>,
    pub mutator: Arc<TestMutator>,
    pub hook: ReconciliationHook,
    pub handles: HashMap<String, TestHandle>,
    pub policy: Option<RateLimitPolicy>,
    pub last_result: Option<Result<(), MessageError>>,
}

impl MessageWorld {
    /// Creates a world whose transport authenticates as `identity`.
    #[must_use]
    pub fn connected_as(identity: UserId) -> Self {
        let transport = Arc::new(InMemoryTransport::new(identity.clone()));
        let cache = Arc::new(MessageCache::new());
        let mutator = Arc::new(
            RemoteMutator::new(
                Arc::clone(&transport),
                Arc::clone(&cache),
                Arc::new(DefaultClock),
            )
            .with_identity(identity),
        );
        let hook = ReconciliationHook::new(Arc::clone(&cache));

        Self {
            transport,
            cache,
            mutator,
            hook,
            handles: HashMap::new(),
            policy: None,
            last_result: None,
        }
    }

    /// Returns the handle for a seeded message, applying the scenario's
    /// rate-limit policy if one was chosen.
    ///
    /// # Errors
    ///
    /// Returns an error if no message with `id` was seeded.
    pub fn handle(&self, id: &str) -> Result<TestHandle, eyre::Report> {
        let handle = self
            .handles
            .get(id)
            .ok_or_else(|| eyre::eyre!("no message {id} in scenario world"))?;
        Ok(match self.policy {
            Some(policy) => handle.with_rate_limit_policy(policy),
            None => handle.clone(),
        })
    }
}

impl Default for MessageWorld {
    fn default() -> Self {
        Self::connected_as(UserId::new("alice"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MessageWorld {
    MessageWorld::default()
}

/// The channel every scenario message lives in.
pub fn channel() -> ChannelId {
    ChannelId::new("general")
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
