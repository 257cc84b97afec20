//! Time source for the services.
//!
//! Everything that stamps a record or advances the combat timeline reads
//! the time through [`Clock`], so tests and the harness can run the whole
//! lifecycle on a [`ManualClock`] without sleeping.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use mechfront_logic::common::Timestamp;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(millis)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start.millis()),
        }
    }

    pub fn advance(&self, millis: u64) -> Timestamp {
        self.now.set(self.now.get().saturating_add(millis));
        self.now()
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at.millis());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
