// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_stream::prelude::*;
use sluice_test_utils::{failing_after, test_channel, test_error};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_failing_source_fails_merged_output() -> anyhow::Result<()> {
    // Arrange
    let (_tx, healthy) = test_channel::<i32>();
    let broken = failing_after(vec![1], test_error("boom"));

    // Act
    let merged = healthy.merge_with(vec![broken]);

    // Assert
    assert_eq!(merged.recv().await?, Some(1));
    let error = merged.recv().await.unwrap_err();
    assert_eq!(error.to_string(), "User error: test error: boom");
    Ok(())
}

#[tokio::test]
async fn test_failing_source_cancels_siblings_with_its_error() -> anyhow::Result<()> {
    // Arrange
    let (tx, healthy) = test_channel::<i32>();
    let broken = failing_after(Vec::new(), test_error("boom"));

    // Act
    let merged = healthy.merge_with(vec![broken]);
    assert!(merged.to_vec().await.is_err());

    // Assert
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    let rejected = tx.send(1).await.unwrap_err();
    assert_eq!(rejected.to_string(), "User error: test error: boom");
    Ok(())
}
