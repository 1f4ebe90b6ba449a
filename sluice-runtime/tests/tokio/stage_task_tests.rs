// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::CancellationToken;
use sluice_runtime::{StageTask, TokioRuntime};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_task_runs_to_completion() -> anyhow::Result<()> {
    // Arrange
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);

    // Act
    let task = StageTask::spawn(&TokioRuntime, |_cancel| async move {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    tokio::time::timeout(Duration::from_millis(500), task.join()).await?;

    // Assert
    assert!(task.is_finished());
    assert!(!task.is_cancelled());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_cancel_and_join_stops_pending_work() -> anyhow::Result<()> {
    let task = StageTask::spawn(&TokioRuntime, |_cancel| async move {
        futures::future::pending::<()>().await;
    });

    tokio::time::timeout(Duration::from_millis(500), task.cancel_and_join()).await?;

    assert!(task.is_finished());
    Ok(())
}

#[tokio::test]
async fn test_drop_cancels_task() -> anyhow::Result<()> {
    // Arrange
    let observed = CancellationToken::new();
    let task = StageTask::spawn(&TokioRuntime, |cancel| {
        let observed = observed.clone();
        async move {
            cancel.cancelled().await;
            observed.cancel();
        }
    });
    let token = task.token();

    // Act
    drop(task);

    // Assert
    assert!(token.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_child_task_follows_parent_scope() -> anyhow::Result<()> {
    // Arrange
    let parent = CancellationToken::new();
    let task = StageTask::spawn_child(&TokioRuntime, &parent, |_cancel| async move {
        futures::future::pending::<()>().await;
    });

    // Act
    parent.cancel();

    // Assert
    tokio::time::timeout(Duration::from_millis(500), task.join()).await?;
    assert!(task.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_cancelling_child_leaves_parent() -> anyhow::Result<()> {
    let parent = CancellationToken::new();
    let task = StageTask::spawn_child(&TokioRuntime, &parent, |_cancel| async move {
        futures::future::pending::<()>().await;
    });

    task.cancel_and_join().await;

    assert!(!parent.is_cancelled());
    Ok(())
}
