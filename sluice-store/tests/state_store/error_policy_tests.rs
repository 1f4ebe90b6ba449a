// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::SluiceError;
use sluice_store::{ErrorPolicy, StateStore, StoreConfig};
use sluice_test_utils::{
    assert_no_element_emitted, recv_timeout, test_channel, test_error,
};

/// Adds non-negative deltas and rejects negative ones.
fn checked_store(config: StoreConfig) -> StateStore<i64, i64> {
    StateStore::with_config(
        0,
        |count: &i64, delta: i64| {
            if delta < 0 {
                Err(test_error("negative delta"))
            } else {
                Ok(count + delta)
            }
        },
        config,
    )
}

#[tokio::test]
async fn test_log_policy_keeps_store_open() -> anyhow::Result<()> {
    // Arrange
    let store = checked_store(StoreConfig::default());
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, 0);

    // Act
    store.dispatch(-1)?;
    store.dispatch(3)?;

    // Assert
    assert_eq!(recv_timeout(&states, 500).await, 3);
    assert_no_element_emitted(&states, 50).await;
    assert!(!store.is_closed());
    Ok(())
}

#[tokio::test]
async fn test_handler_policy_receives_dispatch_failures() -> anyhow::Result<()> {
    // Arrange
    let (failures_tx, failures) = test_channel::<String>();
    let policy = ErrorPolicy::handler(move |error: &SluiceError| {
        let _ = failures_tx.try_send(error.to_string());
    });
    let store = checked_store(StoreConfig::default().with_error_policy(policy));
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, 0);

    // Act
    store.dispatch(-5)?;
    store.dispatch(2)?;

    // Assert
    assert_eq!(
        recv_timeout(&failures, 500).await,
        "User error: test error: negative delta"
    );
    assert_eq!(recv_timeout(&states, 500).await, 2);
    assert!(!store.is_closed());
    Ok(())
}

#[tokio::test]
async fn test_handler_policy_ignores_handle_failures() -> anyhow::Result<()> {
    // Arrange
    let (failures_tx, failures) = test_channel::<String>();
    let policy = ErrorPolicy::handler(move |error: &SluiceError| {
        let _ = failures_tx.try_send(error.to_string());
    });
    let store = checked_store(StoreConfig::default().with_error_policy(policy));

    // Act
    let result = store.handle(-1).await;

    // Assert
    assert!(result.is_err());
    assert_no_element_emitted(&failures, 50).await;
    Ok(())
}

#[tokio::test]
async fn test_error_stream_policy_publishes_failures() -> anyhow::Result<()> {
    // Arrange
    let store = checked_store(StoreConfig::default().with_error_policy(ErrorPolicy::ErrorStream));
    let errors = store.errors()?;
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, 0);

    // Act
    store.dispatch(-1)?;
    store.dispatch(4)?;

    // Assert
    let error = recv_timeout(&errors, 500).await;
    assert_eq!(error.to_string(), "User error: test error: negative delta");
    assert_eq!(recv_timeout(&states, 500).await, 4);
    assert_no_element_emitted(&errors, 50).await;
    Ok(())
}

#[tokio::test]
async fn test_fail_store_policy_fails_subscribers() -> anyhow::Result<()> {
    // Arrange
    let store = checked_store(StoreConfig::default().with_error_policy(ErrorPolicy::FailStore));
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, 0);

    // Act
    store.dispatch(-1)?;

    // Assert
    let failure = tokio::time::timeout(std::time::Duration::from_millis(500), states.recv())
        .await?
        .unwrap_err();
    assert_eq!(failure.to_string(), "User error: test error: negative delta");
    assert!(store.is_closed());
    assert_eq!(
        store.handle(1).await.unwrap_err().to_string(),
        "User error: test error: negative delta"
    );
    assert!(store.dispatch(1).is_err());
    assert!(store.subscribe().is_err());
    assert_eq!(store.get(), 0);
    Ok(())
}

#[tokio::test]
async fn test_close_wins_over_later_failures() -> anyhow::Result<()> {
    // Arrange
    let store = checked_store(StoreConfig::default().with_error_policy(ErrorPolicy::FailStore));
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, 0);

    // Act
    store.close();

    // Assert
    assert_eq!(states.recv().await?, None);
    assert!(store.dispatch(-1).is_err());
    assert!(store.is_closed());
    Ok(())
}
