use std::time::Instant;

use crate::Millis;

pub trait Clock {
    /// Monotonic milliseconds since some fixed origin.
    fn now_ms(&self) -> Millis;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}
