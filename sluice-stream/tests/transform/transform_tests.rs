// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::{Capacity, Receiver};
use sluice_runtime::TokioRuntime;
use sluice_stream::prelude::*;
use sluice_stream::{pipe, produce, transform};
use sluice_test_utils::{assert_stream_ended, channel_of, recv_timeout, test_channel};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_transform_forwards_items_and_completes() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![1, 2, 3]);

    // Act
    let doubled = transform(source, Capacity::default(), &TokioRuntime, |source, output| async move {
        while let Some(x) = source.recv().await? {
            output.send(x * 2).await?;
        }
        Ok(())
    });

    // Assert
    assert_eq!(doubled.to_vec().await?, vec![2, 4, 6]);
    Ok(())
}

#[tokio::test]
async fn test_transform_body_returning_early_completes_output_and_cancels_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let first = rx.transform(Capacity::default(), |source, output| async move {
        if let Some(x) = source.recv().await? {
            output.send(x).await?;
        }
        Ok(())
    });

    // Act
    tx.send(7).await?;

    // Assert
    assert_eq!(first.to_vec().await?, vec![7]);
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    assert!(tx.send(8).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_source_of_dropped_senders_stays_completed_after_stage_ends() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let token = tx.cancellation_token();
    let handle = rx.cancel_handle();
    tx.send(1).await?;
    drop(tx);

    // Act
    let mapped = rx.map(|x| x * 10);

    // Assert
    assert_eq!(mapped.to_vec().await?, vec![10]);
    assert!(handle.is_completed());
    assert!(!token.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_transform_of_empty_source_completes_without_items() -> anyhow::Result<()> {
    // Arrange
    let source = Receiver::<i32>::empty();

    // Act
    let mapped = source.map(|x| x + 1);

    // Assert
    assert_stream_ended(&mapped, 500).await;
    Ok(())
}

#[tokio::test]
async fn test_dropping_output_cancels_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let mapped = rx.map(|x| x + 1);
    tx.send(1).await?;
    assert_eq!(recv_timeout(&mapped, 500).await, 2);

    // Act
    drop(mapped);

    // Assert
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn test_cancel_propagates_through_whole_pipeline() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let pipeline = rx.map(|x| x * 10).filter(|x| *x > 0).scan(0, |acc, x| acc + x);
    assert_eq!(recv_timeout(&pipeline, 500).await, 0);

    // Act
    pipeline.cancel(None);

    // Assert
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn test_produce_closes_output_when_body_returns() -> anyhow::Result<()> {
    // Arrange & Act
    let numbers = produce(Capacity::Bounded(1), &TokioRuntime, |output| async move {
        for i in 0..5 {
            output.send(i).await?;
        }
        Ok(())
    });

    // Assert
    assert_eq!(numbers.to_vec().await?, vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_pipe_copies_items_without_closing_sink() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec!["a", "b"]);
    let (sink, out) = test_channel();

    // Act
    pipe(&source, &sink).await?;

    // Assert
    assert!(!sink.is_closed());
    sink.close();
    assert_eq!(out.to_vec().await?, vec!["a", "b"]);
    Ok(())
}
