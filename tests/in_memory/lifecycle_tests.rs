//! In-memory integration tests for message mutation round-trips.

use super::helpers::{Harness, alice, bob, general, harness};
use herald::message::{
    domain::{Capability, MessageId, Operation},
    error::MessageError,
    ports::{MessageTransport, TransportError},
    services::{MessageCache, RemoteMutator},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_round_trip_matches_server_state(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;

    let record = message.edit("final <@bob>").await?;

    let stored = harness
        .transport
        .stored(&MessageId::new("1"))?
        .ok_or_else(|| eyre::eyre!("message missing on server"))?;
    assert_eq!(record.content(), stored.content);
    assert_eq!(record.edited_timestamp(), stored.edited_timestamp);
    assert_eq!(message.mentions(), vec![bob()]);
    assert!(message.edited_timestamp() >= Some(message.timestamp()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_edit_converges(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;

    message.edit("final").await?;
    message.edit("final").await?;

    assert_eq!(message.content(), "final");
    assert_eq!(harness.transport.calls(Operation::Edit)?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_edit_is_refused_before_any_request(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("2", &bob(), "bob's words", 60)?;

    let result = message.edit("alice's words").await;

    assert!(matches!(
        result,
        Err(MessageError::InsufficientPermissions {
            capability: Capability::Authorship
        })
    ));
    assert_eq!(harness.transport.calls(Operation::Edit)?, 0);
    assert_eq!(message.content(), "bob's words");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_edit_without_known_identity_is_denied_by_server(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let anonymous = Arc::new(RemoteMutator::new(
        Arc::clone(&harness.transport),
        Arc::new(MessageCache::new()),
        Arc::new(DefaultClock),
    ));
    harness.seed("2", &bob(), "bob's words", 60)?;
    let snapshot = harness
        .transport
        .stored(&MessageId::new("2"))?
        .ok_or_else(|| eyre::eyre!("seeded message missing"))?;
    let message = anonymous.observe(snapshot);

    let result = message.edit("alice's words").await;

    assert!(matches!(
        result,
        Err(MessageError::InsufficientPermissions {
            capability: Capability::Authorship
        })
    ));
    assert_eq!(harness.transport.calls(Operation::Edit)?, 1);
    assert_eq!(message.content(), "bob's words");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reply_mentions_author_in_same_channel(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("2", &bob(), "anyone around?", 60)?;
    let before = message.snapshot();

    message.reply("here").await?;

    assert_eq!(message.snapshot(), before);
    let posted = harness.transport.messages_in(&general())?;
    let reply = posted
        .last()
        .ok_or_else(|| eyre::eyre!("no reply posted"))?;
    assert_eq!(reply.content, "<@bob>, here");
    assert_eq!(reply.mentions, vec![bob()]);
    assert!(harness.cache.contains(&reply.id));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_reply_is_not_retryable(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("2", &bob(), "ping", 60)?;
    harness.transport.script_failure(
        Operation::Reply,
        TransportError::failure(std::io::Error::other("connection reset")),
    )?;

    let err = message
        .reply("pong")
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("reply should fail"))?;

    assert!(matches!(err, MessageError::RemoteFailure(_)));
    assert!(!err.is_retryable(Operation::Reply));
    assert_eq!(harness.transport.messages_in(&general())?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_makes_every_later_call_fail(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "oops", 60)?;

    message.delete().await?;

    assert!(message.is_deleted());
    assert!(harness.cache.is_empty());
    assert!(harness.transport.stored(&MessageId::new("1"))?.is_none());
    assert!(matches!(message.edit("x").await, Err(MessageError::EntityGone(_))));
    assert!(matches!(message.reply("x").await, Err(MessageError::EntityGone(_))));
    assert!(matches!(message.acknowledge().await, Err(MessageError::EntityGone(_))));
    assert!(matches!(message.delete().await, Err(MessageError::EntityGone(_))));
    assert_eq!(harness.transport.calls(Operation::Delete)?, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_of_already_removed_message_succeeds(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "oops", 60)?;
    harness
        .transport
        .delete_message(&general(), &MessageId::new("1"))
        .await?;

    message.delete().await?;

    assert!(message.is_deleted());
    assert!(harness.cache.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moderator_delete_requires_manage_messages(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("2", &bob(), "spam", 60)?;

    let denied = message.delete().await;
    assert!(matches!(
        denied,
        Err(MessageError::InsufficientPermissions {
            capability: Capability::ManageMessages
        })
    ));
    assert!(!message.is_deleted());

    harness.transport.grant(Capability::ManageMessages)?;
    message.delete().await?;
    assert!(message.is_deleted());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn acknowledge_advances_read_position(harness: Harness) -> Result<(), eyre::Report> {
    let older = harness.seed("1", &bob(), "first", 120)?;
    let target = harness.seed("2", &bob(), "second", 60)?;
    let newer = harness.seed("3", &bob(), "third", 0)?;

    target.acknowledge().await?;
    target.acknowledge().await?;

    assert!(older.is_acknowledged());
    assert!(target.is_acknowledged());
    assert!(!newer.is_acknowledged());
    assert_eq!(
        harness.transport.read_position(&general())?,
        Some(MessageId::new("2"))
    );
    assert_eq!(harness.transport.calls(Operation::Acknowledge)?, 1);
    Ok(())
}
