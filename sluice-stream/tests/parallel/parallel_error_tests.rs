// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::Capacity;
use sluice_stream::prelude::*;
use sluice_test_utils::{failing_after, test_channel, test_error};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_failing_worker_fails_output_and_cancels_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let results = rx.parallel(2, |worker| {
        worker.transform(Capacity::default(), |source, output| async move {
            while let Some(x) = source.recv().await? {
                if x == 3 {
                    return Err(test_error("three"));
                }
                output.send(x).await?;
            }
            Ok(())
        })
    });

    // Act
    for i in 1..=5 {
        tx.send(i).await?;
    }

    // Assert
    let error = results.to_vec().await.unwrap_err();
    assert_eq!(error.to_string(), "User error: test error: three");
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn test_failing_source_fails_parallel_output() -> anyhow::Result<()> {
    // Arrange
    let source = failing_after(vec![1, 2, 3], test_error("source broke"));

    // Act
    let results = source.parallel_map(2, |x| async move { x });

    // Assert
    assert!(results.to_vec().await.is_err());
    Ok(())
}
