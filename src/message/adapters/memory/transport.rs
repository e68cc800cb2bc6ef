//! In-memory transport that simulates the remote message service.

use crate::message::{
    domain::{
        Capability, ChannelId, MessageId, MessageSnapshot, Operation, UserId, parse_mentions,
    },
    ports::{MessageTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

/// In-memory message service.
///
/// The adapter authenticates as a single account, stores every message it
/// has seen or created, and enforces the same authorship and capability rules
/// the remote service does. Failures can be scripted per operation so tests
/// can exercise rate limits and transient errors deterministically.
///
/// Creation and edit instants are read from `C`.
pub struct InMemoryTransport<C = DefaultClock> {
    identity: UserId,
    clock: Arc<C>,
    state: Arc<RwLock<InMemoryTransportState>>,
}

impl<C> Clone for InMemoryTransport<C> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            clock: Arc::clone(&self.clock),
            state: Arc::clone(&self.state),
        }
    }
}

impl<C> fmt::Debug for InMemoryTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTransport")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    messages: HashMap<MessageId, MessageSnapshot>,
    granted: HashSet<Capability>,
    scripted: HashMap<Operation, VecDeque<TransportError>>,
    calls: HashMap<Operation, usize>,
    read_positions: HashMap<ChannelId, MessageId>,
    latency: Option<Duration>,
}

impl InMemoryTransport {
    /// Creates a service authenticated as `identity` that stamps messages
    /// with the system clock.
    ///
    /// The account may send messages and read history, but not manage other
    /// users' messages.
    #[must_use]
    pub fn new(identity: UserId) -> Self {
        Self::with_clock(identity, Arc::new(DefaultClock))
    }
}

impl<C: Clock> InMemoryTransport<C> {
    /// Creates a service authenticated as `identity` that stamps messages
    /// with `clock`.
    #[must_use]
    pub fn with_clock(identity: UserId, clock: Arc<C>) -> Self {
        let state = InMemoryTransportState {
            granted: HashSet::from([Capability::SendMessages, Capability::ReadMessageHistory]),
            ..InMemoryTransportState::default()
        };
        Self {
            identity,
            clock,
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn read_state(&self) -> TransportResult<RwLockReadGuard<'_, InMemoryTransportState>> {
        self.state
            .read()
            .map_err(|err| TransportError::failure(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> TransportResult<RwLockWriteGuard<'_, InMemoryTransportState>> {
        self.state
            .write()
            .map_err(|err| TransportError::failure(std::io::Error::other(err.to_string())))
    }

    /// Stores a message as if it already existed on the service.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn seed(&self, snapshot: MessageSnapshot) -> TransportResult<()> {
        let mut state = self.write_state()?;
        state.messages.insert(snapshot.id.clone(), snapshot);
        Ok(())
    }

    /// Returns the service's current view of a message.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn stored(&self, id: &MessageId) -> TransportResult<Option<MessageSnapshot>> {
        Ok(self.read_state()?.messages.get(id).cloned())
    }

    /// Returns every stored message in a channel, oldest first.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn messages_in(&self, channel_id: &ChannelId) -> TransportResult<Vec<MessageSnapshot>> {
        let state = self.read_state()?;
        let mut messages: Vec<MessageSnapshot> = state
            .messages
            .values()
            .filter(|message| &message.channel_id == channel_id)
            .cloned()
            .collect();
        messages.sort_by(|left, right| {
            left.timestamp
                .cmp(&right.timestamp)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(messages)
    }

    /// Returns the last message acknowledged in a channel.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn read_position(&self, channel_id: &ChannelId) -> TransportResult<Option<MessageId>> {
        Ok(self.read_state()?.read_positions.get(channel_id).cloned())
    }

    /// Returns how many requests of one kind have been received, including
    /// those that failed.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn calls(&self, operation: Operation) -> TransportResult<usize> {
        Ok(self
            .read_state()?
            .calls
            .get(&operation)
            .copied()
            .unwrap_or_default())
    }

    /// Queues a failure for the next request of one kind.
    ///
    /// Queued failures are returned in order, one per request, before the
    /// service resumes normal handling.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn script_failure(&self, operation: Operation, err: TransportError) -> TransportResult<()> {
        let mut state = self.write_state()?;
        state.scripted.entry(operation).or_default().push_back(err);
        Ok(())
    }

    /// Grants a capability to the account.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn grant(&self, capability: Capability) -> TransportResult<()> {
        self.write_state()?.granted.insert(capability);
        Ok(())
    }

    /// Revokes a capability from the account.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn revoke(&self, capability: Capability) -> TransportResult<()> {
        self.write_state()?.granted.remove(&capability);
        Ok(())
    }

    /// Delays every subsequent request by `latency` before it is handled.
    ///
    /// # Errors
    ///
    /// Returns transport failures when lock acquisition fails.
    pub fn set_latency(&self, latency: Option<Duration>) -> TransportResult<()> {
        self.write_state()?.latency = latency;
        Ok(())
    }

    /// Simulates the round-trip and counts the request.
    ///
    /// Returns the scripted failure for this request, if any.
    async fn begin(&self, operation: Operation) -> TransportResult<()> {
        let latency = self.read_state()?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write_state()?;
        *state.calls.entry(operation).or_default() += 1;
        match state
            .scripted
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl InMemoryTransportState {
    fn require(&self, capability: Capability) -> TransportResult<()> {
        if self.granted.contains(&capability) {
            Ok(())
        } else {
            Err(TransportError::PermissionDenied(capability))
        }
    }

    fn message_mut(
        &mut self,
        channel_id: &ChannelId,
        message_id: &MessageId,
    ) -> TransportResult<&mut MessageSnapshot> {
        self.messages
            .get_mut(message_id)
            .filter(|message| &message.channel_id == channel_id)
            .ok_or_else(|| unknown_message(message_id))
    }
}

fn unknown_message(message_id: &MessageId) -> TransportError {
    TransportError::failure(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("unknown message {message_id}"),
    ))
}

#[async_trait]
impl<C: Clock + 'static> MessageTransport for InMemoryTransport<C> {
    async fn send_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
    ) -> TransportResult<MessageSnapshot> {
        self.begin(Operation::Reply).await?;
        let mut state = self.write_state()?;
        state.require(Capability::SendMessages)?;

        let parsed = parse_mentions(content);
        let snapshot = MessageSnapshot::new(
            MessageId::new(Uuid::new_v4().to_string()),
            channel_id.clone(),
            self.identity.clone(),
            content,
            self.clock.utc(),
        )
        .with_mentions(parsed.users)
        .with_mentions_everyone(parsed.everyone);

        state
            .messages
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn edit_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        content: &str,
    ) -> TransportResult<MessageSnapshot> {
        self.begin(Operation::Edit).await?;
        let mut state = self.write_state()?;
        let message = state.message_mut(channel_id, message_id)?;
        if message.author_id != self.identity {
            return Err(TransportError::PermissionDenied(Capability::Authorship));
        }

        let now = self.clock.utc();
        let parsed = parse_mentions(content);
        content.clone_into(&mut message.content);
        message.mentions = parsed.users;
        message.mentions_everyone = parsed.everyone;
        message.edited_timestamp = Some(now.max(message.timestamp));
        Ok(message.clone())
    }

    async fn delete_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
    ) -> TransportResult<()> {
        self.begin(Operation::Delete).await?;
        let mut state = self.write_state()?;
        let Some(author_id) = state
            .messages
            .get(message_id)
            .filter(|message| &message.channel_id == channel_id)
            .map(|message| message.author_id.clone())
        else {
            // Deleting a message that is already gone succeeds.
            return Ok(());
        };

        if author_id != self.identity {
            state.require(Capability::ManageMessages)?;
        }
        state.messages.remove(message_id);
        Ok(())
    }

    async fn acknowledge_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
    ) -> TransportResult<()> {
        self.begin(Operation::Acknowledge).await?;
        let mut state = self.write_state()?;
        state.require(Capability::ReadMessageHistory)?;
        state.message_mut(channel_id, message_id)?;
        state
            .read_positions
            .insert(channel_id.clone(), message_id.clone());
        Ok(())
    }
}
