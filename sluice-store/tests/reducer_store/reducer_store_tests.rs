// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_store::ReducerStore;
use sluice_test_utils::{assert_no_element_emitted, recv_timeout, test_error};

#[tokio::test]
async fn test_handle_fn_applies_reducer() -> anyhow::Result<()> {
    // Arrange
    let store = ReducerStore::reducing(10_u32);

    // Act
    let doubled = store.handle_fn(|count| Ok(count * 2)).await?;

    // Assert
    assert_eq!(doubled, 20);
    assert_eq!(store.get(), 20);
    Ok(())
}

#[tokio::test]
async fn test_dispatch_fn_applies_reducers_in_order() -> anyhow::Result<()> {
    // Arrange
    let store = ReducerStore::reducing(String::new());
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, "");

    // Act
    for word in ["a", "b", "c"] {
        store.dispatch_fn(move |text: &String| Ok(format!("{text}{word}")))?;
    }

    // Assert
    assert_eq!(recv_timeout(&states, 500).await, "a");
    assert_eq!(recv_timeout(&states, 500).await, "ab");
    assert_eq!(recv_timeout(&states, 500).await, "abc");
    Ok(())
}

#[tokio::test]
async fn test_failing_reducer_leaves_state_unchanged() -> anyhow::Result<()> {
    // Arrange
    let store = ReducerStore::reducing(vec![1, 2]);
    let states = store.subscribe()?;
    assert_eq!(recv_timeout(&states, 500).await, vec![1, 2]);

    // Act
    let result = store
        .handle_fn(|_: &Vec<i32>| Err(test_error("rejected")))
        .await;

    // Assert
    assert_eq!(
        result.unwrap_err().to_string(),
        "User error: test error: rejected"
    );
    assert_eq!(store.get(), vec![1, 2]);
    assert_no_element_emitted(&states, 50).await;
    Ok(())
}
