// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::{Capacity, SluiceError};
use sluice_stream::prelude::*;
use sluice_test_utils::{channel_of, failing_after, recv_timeout, test_channel, test_error};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_source_failure_fails_output_after_items() -> anyhow::Result<()> {
    // Arrange
    let source = failing_after(vec![1, 2], test_error("source broke"));

    // Act
    let mapped = source.map(|x| x * 3);

    // Assert
    assert_eq!(mapped.recv().await?, Some(3));
    assert_eq!(mapped.recv().await?, Some(6));
    let error = mapped.recv().await.unwrap_err();
    assert_eq!(error.to_string(), "User error: test error: source broke");
    Ok(())
}

#[tokio::test]
async fn test_source_failing_before_any_item_fails_output() -> anyhow::Result<()> {
    // Arrange
    let source = failing_after(Vec::<i32>::new(), test_error("early"));

    // Act
    let mapped = source.map(|x| x + 1);

    // Assert
    assert!(mapped.to_vec().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_body_error_fails_output_and_cancels_source_with_same_error() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let checked = rx.transform(Capacity::default(), |source, output| async move {
        while let Some(x) = source.recv().await? {
            if x < 0 {
                return Err(test_error("negative"));
            }
            output.send(x).await?;
        }
        Ok(())
    });

    // Act
    tx.send(1).await?;
    tx.send(-1).await?;

    // Assert
    assert_eq!(recv_timeout(&checked, 500).await, 1);
    let error = checked.recv().await.unwrap_err();
    assert_eq!(error.to_string(), "User error: test error: negative");

    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    let rejected = tx.send(2).await.unwrap_err();
    assert_eq!(rejected.to_string(), error.to_string());
    Ok(())
}

#[tokio::test]
async fn test_output_cancel_cause_reaches_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let mapped = rx.map(|x| x);

    // Act
    mapped.cancel(Some(SluiceError::cancelled("shutting down")));

    // Assert
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    let rejected = tx.send(1).await.unwrap_err();
    assert!(rejected.is_cancellation());
    assert_eq!(rejected.to_string(), "Stream cancelled: shutting down");
    Ok(())
}

#[tokio::test]
async fn test_cancelled_output_stays_cancelled_after_source_completes() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let mapped = rx.map(|x| x);

    // Act
    mapped.cancel(None);
    tx.close();

    // Assert
    assert!(mapped.is_cancelled());
    assert!(mapped.recv().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_panicking_body_fails_output_and_cancels_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let mapped = rx.map(|x| {
        if x == 2 {
            panic!("mapper cannot handle 2");
        }
        x * 10
    });

    // Act
    tx.send(1).await?;
    tx.send(2).await?;

    // Assert
    assert_eq!(recv_timeout(&mapped, 500).await, 10);
    let error = timeout(Duration::from_millis(500), mapped.recv()).await?.unwrap_err();
    assert_eq!(error.to_string(), "Stream processing error: stage panicked");

    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    let rejected = tx.send(3).await.unwrap_err();
    assert_eq!(rejected.to_string(), error.to_string());
    Ok(())
}

#[tokio::test]
async fn test_panicking_body_does_not_end_output_as_completed() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![1, 2, 3]);

    // Act
    let mapped = source.map(|x| if x == 3 { panic!("mapper cannot handle 3") } else { x });

    // Assert
    let error = mapped.to_vec().await.unwrap_err();
    assert_eq!(error.to_string(), "Stream processing error: stage panicked");
    Ok(())
}
