use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::Rng;

use crate::clock::{Clock, SystemClock};

use super::Id;

/// Abstraction over ID generation to support deterministic tests.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Id;
}

#[derive(Debug, Clone, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> Id {
        Id::new()
    }
}

/// Numeric ids of the form `<epoch millis><3 random digits>`.
///
/// Ids are strictly increasing within a process, so several records
/// synthesized in the same millisecond never collide.
pub struct TimestampIdGenerator {
    clock: Arc<dyn Clock>,
    last: Mutex<i64>,
}

impl TimestampIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(0),
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::default()))
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn new_id(&self) -> Id {
        let millis = self.clock.now().timestamp_millis();
        let offset: i64 = rand::thread_rng().gen_range(0..1000);
        let candidate = millis.saturating_mul(1000).saturating_add(offset);

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let value = if candidate > *last { candidate } else { *last + 1 };
        *last = value;
        Id::from_string(value.to_string())
    }
}

/// A deterministic generator that returns a pre-seeded sequence of IDs.
///
/// Panics if you request more IDs than provided.
#[derive(Debug, Default)]
pub struct FixedIdGenerator {
    ids: Mutex<VecDeque<Id>>,
}

impl FixedIdGenerator {
    pub fn new(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
        }
    }
}

impl IdGenerator for FixedIdGenerator {
    fn new_id(&self) -> Id {
        self.ids
            .lock()
            .expect("fixed id generator lock poisoned")
            .pop_front()
            .expect("fixed id generator exhausted")
    }
}
