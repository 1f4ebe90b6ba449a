// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_stream::prelude::*;
use sluice_test_utils::{recv_timeout, test_channel, test_error};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_failing_side_fails_output_and_cancels_other_side() -> anyhow::Result<()> {
    // Arrange
    let (left_tx, left) = test_channel::<i32>();
    let (right_tx, right) = test_channel::<i32>();
    let sums = left.combine_latest_with(right, |l, r| l + r);

    left_tx.send(1).await?;
    right_tx.send(2).await?;
    assert_eq!(recv_timeout(&sums, 500).await, 3);

    // Act
    right_tx.close_with_error(test_error("right side failed"));

    // Assert
    let error = sums.recv().await.unwrap_err();
    assert_eq!(error.to_string(), "User error: test error: right side failed");
    timeout(Duration::from_millis(500), left_tx.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn test_failure_before_first_combination_fails_output() -> anyhow::Result<()> {
    // Arrange
    let (left_tx, left) = test_channel::<i32>();
    let (_right_tx, right) = test_channel::<i32>();
    let sums = left.combine_latest_with(right, |l, r| l + r);

    // Act
    left_tx.send(1).await?;
    left_tx.close_with_error(test_error("left side failed"));

    // Assert
    assert!(sums.to_vec().await.is_err());
    Ok(())
}
