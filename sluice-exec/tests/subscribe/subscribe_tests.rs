// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::CancellationToken;
use sluice_exec::SubscribeExt;
use sluice_test_utils::{
    channel_of, person_alice, person_bob, person_charlie, recv_timeout, test_channel, TestData,
    TestError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_subscribe_handles_items_in_order() -> anyhow::Result<()> {
    // Arrange
    let stream = channel_of(vec![person_alice(), person_bob(), person_charlie()]);
    let results = Arc::new(Mutex::new(Vec::new()));

    // Act
    let sink = Arc::clone(&results);
    stream
        .subscribe(
            move |item: TestData, _token| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push(item);
                    Ok::<(), TestError>(())
                }
            },
            None,
            None::<fn(TestError)>,
        )
        .await?;

    // Assert
    assert_eq!(
        *results.lock().unwrap(),
        vec![person_alice(), person_bob(), person_charlie()]
    );
    Ok(())
}

#[tokio::test]
async fn test_subscribe_waits_for_each_handler() -> anyhow::Result<()> {
    // Arrange
    let stream = channel_of(1..=5);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    // Act
    let (running_in, peak_in) = (Arc::clone(&running), Arc::clone(&peak));
    stream
        .subscribe(
            move |_item: i32, _token| {
                let running = Arc::clone(&running_in);
                let peak = Arc::clone(&peak_in);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<(), TestError>(())
                }
            },
            None,
            None::<fn(TestError)>,
        )
        .await?;

    // Assert
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_subscribe_processes_items_as_they_arrive() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<TestData>();
    let (notify_tx, notify_rx) = test_channel::<TestData>();

    let subscription = tokio::spawn(rx.subscribe(
        move |item: TestData, _token| {
            let notify_tx = notify_tx.clone();
            async move {
                let _ = notify_tx.try_send(item);
                Ok::<(), TestError>(())
            }
        },
        None,
        None::<fn(TestError)>,
    ));

    // Act & Assert
    tx.try_send(person_alice())?;
    assert_eq!(recv_timeout(&notify_rx, 500).await, person_alice());

    tx.try_send(person_bob())?;
    assert_eq!(recv_timeout(&notify_rx, 500).await, person_bob());

    tx.close();
    subscription.await??;
    Ok(())
}

#[tokio::test]
async fn test_cancellation_token_ends_subscription() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let (notify_tx, notify_rx) = test_channel::<i32>();
    let token = CancellationToken::new();

    let subscription = tokio::spawn(rx.subscribe(
        move |item: i32, _token| {
            let notify_tx = notify_tx.clone();
            async move {
                let _ = notify_tx.try_send(item);
                Ok::<(), TestError>(())
            }
        },
        Some(token.clone()),
        None::<fn(TestError)>,
    ));

    tx.try_send(1)?;
    assert_eq!(recv_timeout(&notify_rx, 500).await, 1);

    // Act
    token.cancel();

    // Assert
    tokio::time::timeout(Duration::from_millis(500), subscription).await???;
    tx.cancelled().await;
    assert!(tx.is_cancelled());
    assert!(tx.send(2).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_handler_receives_subscription_token() -> anyhow::Result<()> {
    // Arrange
    let stream = channel_of(vec![1]);
    let token = CancellationToken::new();
    let seen_cancelled = Arc::new(Mutex::new(None));

    // Act
    let seen = Arc::clone(&seen_cancelled);
    let outer = token.clone();
    stream
        .subscribe(
            move |_item: i32, handler_token: CancellationToken| {
                let seen = Arc::clone(&seen);
                let outer = outer.clone();
                async move {
                    outer.cancel();
                    *seen.lock().unwrap() = Some(handler_token.is_cancelled());
                    Ok::<(), TestError>(())
                }
            },
            Some(token),
            None::<fn(TestError)>,
        )
        .await?;

    // Assert
    assert_eq!(*seen_cancelled.lock().unwrap(), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_empty_stream_completes() -> anyhow::Result<()> {
    // Arrange
    let stream = channel_of(Vec::<i32>::new());
    let calls = Arc::new(AtomicUsize::new(0));

    // Act
    let counter = Arc::clone(&calls);
    stream
        .subscribe(
            move |_item: i32, _token| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), TestError>(()) }
            },
            None,
            None::<fn(TestError)>,
        )
        .await?;

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}
