// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Person {
    #[must_use]
    pub const fn new(name: String, age: u32) -> Self {
        Self { name, age }
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person[name={}, age={}]", self.name, self.age)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Animal {
    pub species: String,
    pub legs: u32,
}

impl Animal {
    #[must_use]
    pub const fn new(species: String, legs: u32) -> Self {
        Self { species, legs }
    }
}

impl Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Animal[species={}, legs={}]", self.species, self.legs)
    }
}

/// Heterogeneous test record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestData {
    Person(Person),
    Animal(Animal),
}

impl TryFrom<TestData> for Person {
    type Error = TestData;

    fn try_from(data: TestData) -> Result<Self, TestData> {
        match data {
            TestData::Person(person) => Ok(person),
            other => Err(other),
        }
    }
}

impl TryFrom<TestData> for Animal {
    type Error = TestData;

    fn try_from(data: TestData) -> Result<Self, TestData> {
        match data {
            TestData::Animal(animal) => Ok(animal),
            other => Err(other),
        }
    }
}

impl Display for TestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(p) => write!(f, "{p}"),
            Self::Animal(a) => write!(f, "{a}"),
        }
    }
}

pub fn person_alice() -> TestData {
    TestData::Person(Person::new("Alice".to_string(), 25))
}

pub fn person_bob() -> TestData {
    TestData::Person(Person::new("Bob".to_string(), 30))
}

pub fn person_charlie() -> TestData {
    TestData::Person(Person::new("Charlie".to_string(), 35))
}

pub fn animal_dog() -> TestData {
    TestData::Animal(Animal::new("Dog".to_string(), 4))
}

pub fn animal_spider() -> TestData {
    TestData::Animal(Animal::new("Spider".to_string(), 8))
}
