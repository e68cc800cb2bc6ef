//! In-memory integration tests for push notifications racing local calls.

use super::helpers::{Harness, alice, general, harness};
use chrono::Utc;
use herald::message::{
    domain::{MessageEdit, MessageId, Operation},
    error::MessageError,
    ports::PushEvent,
    services::ReconcileOutcome,
};
use rstest::rstest;
use std::time::Duration;

const LATENCY: Duration = Duration::from_millis(200);

fn pushed_edit(id: &str, content: &str) -> PushEvent {
    PushEvent::edit(
        general(),
        MessageId::new(id),
        MessageEdit::new(content, Vec::new(), Utc::now()),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pushed_edit_is_visible_during_in_flight_edit(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.set_latency(Some(LATENCY))?;

    let local = message.clone();
    let in_flight = tokio::spawn(async move { local.edit("local").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let outcome = harness.hook.apply(pushed_edit("1", "pushed"));
    assert_eq!(outcome, ReconcileOutcome::Applied);
    assert!(!in_flight.is_finished());
    assert_eq!(message.content(), "pushed");

    let record = in_flight.await??;
    let stored = harness
        .transport
        .stored(&MessageId::new("1"))?
        .ok_or_else(|| eyre::eyre!("message missing on server"))?;
    let settled = message.snapshot();
    assert_eq!(record.content(), "local");
    assert_eq!(settled.content(), stored.content);
    assert_eq!(settled.edited_timestamp(), stored.edited_timestamp);
    assert_eq!(settled.revision(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn aborted_edit_leaves_entry_untouched_and_releases_gate(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.set_latency(Some(LATENCY))?;

    let local = message.clone();
    let in_flight = tokio::spawn(async move { local.edit("local").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    in_flight.abort();
    let joined = in_flight.await;
    assert!(joined.is_err_and(|err| err.is_cancelled()));

    let settled = message.snapshot();
    assert_eq!(settled.content(), "draft");
    assert_eq!(settled.revision(), 0);

    let outcome = harness.hook.apply(pushed_edit("1", "pushed"));
    assert_eq!(outcome, ReconcileOutcome::Applied);
    assert_eq!(message.content(), "pushed");

    harness.transport.set_latency(None)?;
    let record = tokio::time::timeout(Duration::from_secs(2), message.edit("again")).await??;
    assert_eq!(record.content(), "again");
    assert_eq!(message.content(), "again");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pushed_delete_during_in_flight_edit_reports_gone(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.set_latency(Some(LATENCY))?;

    let local = message.clone();
    let in_flight = tokio::spawn(async move { local.edit("too late").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let outcome = harness
        .hook
        .apply(PushEvent::delete(general(), MessageId::new("1")));
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let result = in_flight.await?;

    assert!(matches!(result, Err(MessageError::EntityGone(_))));
    assert!(message.is_deleted());
    assert_eq!(message.content(), "draft");
    assert!(harness.cache.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pushed_delete_during_in_flight_delete_still_succeeds(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.set_latency(Some(LATENCY))?;

    let local = message.clone();
    let in_flight = tokio::spawn(async move { local.delete().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness
        .hook
        .apply(PushEvent::delete(general(), MessageId::new("1")));

    in_flight.await??;

    assert!(message.is_deleted());
    assert!(harness.cache.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_local_edits_apply_in_server_order(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness
        .transport
        .set_latency(Some(Duration::from_millis(20)))?;

    let edits: Vec<_> = ["one", "two", "three"]
        .into_iter()
        .map(|content| {
            let handle = message.clone();
            tokio::spawn(async move { handle.edit(content).await })
        })
        .collect();
    for edit in edits {
        edit.await??;
    }

    let stored = harness
        .transport
        .stored(&MessageId::new("1"))?
        .ok_or_else(|| eyre::eyre!("message missing on server"))?;
    let settled = message.snapshot();
    assert_eq!(settled.content(), stored.content);
    assert_eq!(settled.edited_timestamp(), stored.edited_timestamp);
    assert_eq!(settled.revision(), 3);
    assert_eq!(harness.transport.calls(Operation::Edit)?, 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_notification_for_evicted_message_is_ignored(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    let bystander = harness.seed("2", &alice(), "still here", 30)?;
    message.delete().await?;
    let cached = harness.cache.len();

    let outcome = harness.hook.apply(pushed_edit("1", "resurrected"));

    assert_eq!(outcome, ReconcileOutcome::Unknown);
    assert_eq!(harness.cache.len(), cached);
    assert!(message.is_deleted());
    assert_eq!(message.content(), "draft");
    assert_eq!(bystander.content(), "still here");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn feed_task_reconciles_until_publisher_drops(harness: Harness) -> Result<(), eyre::Report> {
    use herald::message::adapters::memory::ChannelFeed;

    let message = harness.seed("1", &alice(), "draft", 60)?;
    let (publisher, feed) = ChannelFeed::new();
    let task = std::sync::Arc::clone(&harness.hook).spawn(feed);

    publisher.publish(pushed_edit("1", "pushed"))?;
    publisher.publish(PushEvent::delete(general(), MessageId::new("404")))?;
    drop(publisher);

    assert_eq!(task.await?, 2);
    assert_eq!(message.content(), "pushed");
    Ok(())
}
