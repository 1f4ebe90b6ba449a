// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_runtime::TokioRuntime;
use sluice_stream_time::prelude::*;
use sluice_test_utils::{
    assert_no_element_emitted, assert_stream_ended, person_alice, person_bob, person_charlie,
    recv_timeout, test_channel, TestData,
};
use std::time::Duration;
use tokio::time::{pause, sleep, timeout};

#[tokio::test]
async fn test_debounce_emits_after_quiet_period() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce(Duration::from_millis(500));

    // Act
    tx.send(person_alice()).await?;

    // Assert
    assert_no_element_emitted(&debounced, 400).await;
    assert_eq!(recv_timeout(&debounced, 200).await, person_alice());
    Ok(())
}

#[tokio::test]
async fn test_debounce_resets_on_new_value() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce(Duration::from_millis(500));

    // Act & Assert
    tx.send(person_alice()).await?;
    sleep(Duration::from_millis(300)).await;

    tx.send(person_bob()).await?;
    assert_no_element_emitted(&debounced, 300).await;

    assert_eq!(recv_timeout(&debounced, 300).await, person_bob());
    Ok(())
}

#[tokio::test]
async fn test_debounce_emits_only_last_item_of_burst() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce_with_runtime(Duration::from_millis(100), &TokioRuntime);

    // Act
    tx.send(person_alice()).await?;
    tx.send(person_bob()).await?;
    tx.send(person_charlie()).await?;

    // Assert
    assert_eq!(recv_timeout(&debounced, 200).await, person_charlie());
    assert_no_element_emitted(&debounced, 1000).await;
    Ok(())
}

#[tokio::test]
async fn test_debounce_emits_every_item_separated_by_quiet_periods() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<u32>();
    let debounced = stream.debounce(Duration::from_millis(100));

    // Act & Assert
    for i in 0..3 {
        tx.send(i).await?;
        assert_eq!(recv_timeout(&debounced, 150).await, i);
        sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}

#[tokio::test]
async fn test_debounce_flushes_pending_item_on_completion() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce(Duration::from_secs(10));

    // Act
    tx.send(person_alice()).await?;
    tx.close();

    // Assert
    assert_eq!(recv_timeout(&debounced, 10).await, person_alice());
    assert_stream_ended(&debounced, 10).await;
    Ok(())
}

#[tokio::test]
async fn test_debounce_of_idle_source_completes_without_items() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce(Duration::from_millis(100));

    // Act
    tx.close();

    // Assert
    assert_stream_ended(&debounced, 10).await;
    Ok(())
}

#[tokio::test]
async fn test_cancelling_debounced_output_cancels_source() -> anyhow::Result<()> {
    // Arrange
    pause();

    let (tx, stream) = test_channel::<TestData>();
    let debounced = stream.debounce(Duration::from_millis(100));
    tx.send(person_alice()).await?;

    // Act
    debounced.cancel(None);

    // Assert
    timeout(Duration::from_millis(10), tx.cancelled()).await?;
    Ok(())
}
