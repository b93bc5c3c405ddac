//! Time keeping for the watchface

use chrono::{DateTime, Duration, NaiveDateTime};
use embassy_time::Instant;

use simple_digital::clock::{datetime_from_cts, WallClock};

/// Wall-clock time at a known uptime
pub struct TimeReference {
    /// Clock time
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Reference the given time to now.
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self {
            time,
            instant: Instant::now(),
        }
    }

    /// Reference a Unix timestamp (whole seconds) to now.
    pub fn from_epoch(epoch: i64) -> Option<Self> {
        DateTime::from_timestamp(epoch, 0).map(|time| Self::from_datetime(time.naive_utc()))
    }

    /// Reference a Current Time Service value to now.
    pub fn from_cts_bytes(bytes: &[u8]) -> Option<Self> {
        datetime_from_cts(bytes).map(Self::from_datetime)
    }
}

/// Local wall clock running from the last reference
pub struct TimeManager {
    reference: TimeReference,
    is_24h: bool,
}

impl TimeManager {
    pub fn new(reference: TimeReference, is_24h: bool) -> Self {
        Self { reference, is_24h }
    }

    /// Get current time
    pub fn get_time(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference.time + Duration::microseconds(elapsed.as_micros() as i64)
    }

    /// Update time reference
    pub fn set_time(&mut self, reference: TimeReference) {
        self.reference = reference;
    }
}

impl WallClock for TimeManager {
    fn now(&self) -> NaiveDateTime {
        self.get_time()
    }

    fn is_24h(&self) -> bool {
        self.is_24h
    }
}
