//! Generation of request IDs used to correlate responses with the requests that produced them.
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Id;

/// How a client generates IDs for requests when the caller doesn't supply one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Monotonically increasing numeric IDs starting at 1, unique for the lifetime of the client
    #[default]
    Sequential,

    /// UUIDv7 strings.  Useful when several clients share a log stream or a server wants IDs that
    /// are unique across clients.
    Uuid,
}

/// Source of request IDs for a single client.
///
/// IDs only need to be unique among the requests a client has in flight, but both strategies go
/// further than that: the sequential counter never repeats for the lifetime of the generator, and
/// UUIDv7 collisions are not a practical concern.
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next: AtomicU64::new(1),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Produce the next ID.
    pub fn next_id(&self) -> Id {
        match self.strategy {
            IdStrategy::Sequential => Id::Number(self.next.fetch_add(1, Ordering::Relaxed)),
            IdStrategy::Uuid => Id::Str(Uuid::now_v7().to_string()),
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
