// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_runtime::TokioRuntime;
use sluice_stream::prelude::*;
use sluice_test_utils::{
    animal_dog, animal_spider, assert_stream_ended, channel_of, person_alice, person_bob,
    recv_timeout, test_channel, Animal, Person,
};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_map_applies_function_in_order() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![person_alice(), animal_dog(), person_bob()]);

    // Act
    let names = source.map(|data| data.to_string());

    // Assert
    assert_eq!(
        names.to_vec().await?,
        vec![
            "Person[name=Alice, age=25]".to_string(),
            "Animal[species=Dog, legs=4]".to_string(),
            "Person[name=Bob, age=30]".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_filter_map_drops_none() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec!["1", "x", "3"]);

    // Act
    let parsed = source.filter_map_with_runtime(|s| s.parse::<i32>().ok(), &TokioRuntime);

    // Assert
    assert_eq!(parsed.to_vec().await?, vec![1, 3]);
    Ok(())
}

#[tokio::test]
async fn test_filter_keeps_matching_items() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(1..=10);

    // Act
    let evens = source.filter(|x| x % 2 == 0);

    // Assert
    assert_eq!(evens.to_vec().await?, vec![2, 4, 6, 8, 10]);
    Ok(())
}

#[tokio::test]
async fn test_filter_cast_keeps_only_convertible_items() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![person_alice(), animal_dog(), person_bob(), animal_spider()]);

    // Act
    let people = source.filter_cast::<Person>();

    // Assert
    assert_eq!(
        people.to_vec().await?,
        vec![
            Person::new("Alice".to_string(), 25),
            Person::new("Bob".to_string(), 30),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_filter_cast_to_other_variant() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![person_alice(), animal_spider()]);

    // Act
    let animals = source.filter_cast::<Animal>();

    // Assert
    assert_eq!(animals.to_vec().await?, vec![Animal::new("Spider".to_string(), 8)]);
    Ok(())
}

#[tokio::test]
async fn test_take_completes_after_n_items_and_cancels_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let first_two = rx.take(2);

    // Act
    for i in 0..2 {
        tx.send(i).await?;
    }

    // Assert
    assert_eq!(recv_timeout(&first_two, 500).await, 0);
    assert_eq!(recv_timeout(&first_two, 500).await, 1);
    assert_stream_ended(&first_two, 500).await;
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn test_take_of_shorter_source_forwards_everything() -> anyhow::Result<()> {
    // Arrange
    let source = channel_of(vec![1, 2]);

    // Act
    let taken = source.take(5);

    // Assert
    assert_eq!(taken.to_vec().await?, vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_take_zero_completes_immediately() -> anyhow::Result<()> {
    // Arrange
    let (tx, rx) = test_channel::<i32>();

    // Act
    let nothing = rx.take(0);

    // Assert
    assert_stream_ended(&nothing, 500).await;
    timeout(Duration::from_millis(500), tx.cancelled()).await?;
    Ok(())
}
