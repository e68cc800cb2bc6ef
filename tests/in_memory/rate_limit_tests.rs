//! In-memory integration tests for rate-limit handling.

use super::helpers::{Harness, alice, harness};
use herald::message::{
    domain::Operation,
    error::MessageError,
    ports::TransportError,
    services::{MutatorConfig, RateLimitPolicy},
};
use rstest::rstest;
use std::time::{Duration, Instant};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rate_limit_is_surfaced_by_default(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.script_failure(
        Operation::Edit,
        TransportError::rate_limited(Duration::from_millis(50)),
    )?;

    let err = message
        .edit("final")
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("edit should be rate limited"))?;

    assert!(matches!(
        err,
        MessageError::RateLimited { retry_after } if retry_after == Duration::from_millis(50)
    ));
    assert!(err.is_retryable(Operation::Edit));
    assert_eq!(message.content(), "draft");
    assert_eq!(harness.transport.calls(Operation::Edit)?, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retry_once_sleeps_out_the_wait() -> Result<(), eyre::Report> {
    let harness = Harness::with_config(MutatorConfig::retry_once());
    let message = harness.seed("1", &alice(), "draft", 60)?;
    harness.transport.script_failure(
        Operation::Edit,
        TransportError::rate_limited(Duration::from_millis(50)),
    )?;

    let started = Instant::now();
    let record = message.edit("final").await?;

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(record.content(), "final");
    assert_eq!(record.revision(), 1);
    assert_eq!(harness.transport.calls(Operation::Edit)?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn per_handle_policy_overrides_configuration(harness: Harness) -> Result<(), eyre::Report> {
    let message = harness
        .seed("1", &alice(), "draft", 60)?
        .with_rate_limit_policy(RateLimitPolicy::RetryOnce);
    harness.transport.script_failure(
        Operation::Delete,
        TransportError::rate_limited(Duration::from_millis(10)),
    )?;

    message.delete().await?;

    assert!(message.is_deleted());
    assert_eq!(harness.transport.calls(Operation::Delete)?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_calls_proceed_while_a_retry_sleeps() -> Result<(), eyre::Report> {
    let harness = Harness::with_config(MutatorConfig::retry_once());
    let patient = harness.seed("1", &alice(), "draft", 60)?;
    let eager = patient.with_rate_limit_policy(RateLimitPolicy::Surface);
    harness.transport.script_failure(
        Operation::Edit,
        TransportError::rate_limited(Duration::from_millis(300)),
    )?;

    let slow = tokio::spawn(async move { patient.edit("patient").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    eager.edit("eager").await?;

    assert!(!slow.is_finished());
    assert_eq!(eager.content(), "eager");

    let record = slow.await??;
    assert_eq!(record.content(), "patient");
    assert_eq!(eager.content(), "patient");
    assert_eq!(harness.transport.calls(Operation::Edit)?, 3);
    Ok(())
}
