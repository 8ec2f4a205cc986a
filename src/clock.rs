use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, with saturating arithmetic.
///
/// The store never reads a clock by itself: staleness is a passive deadline
/// compared against a caller-supplied `Timestamp` at match time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp {
    pub ms_since_1970: u64,
}

impl Timestamp {
    pub fn adding(&self, ms: u64) -> Self {
        Self {
            ms_since_1970: self.ms_since_1970.saturating_add(ms),
        }
    }

}

pub trait Clock {
    fn now(&mut self) -> Timestamp;
}

/// Wall-clock-anchored monotonic time source.
pub struct MonotonicClock {
    reference: Instant,
    reference_ms: u64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        let reference_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| u64::try_from(d.as_millis()).ok())
            .flatten()
            .unwrap_or(u64::MAX);
        let reference = Instant::now();
        Self {
            reference,
            reference_ms,
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Timestamp {
        let millis = u64::try_from(Instant::now().duration_since(self.reference).as_millis())
            .unwrap_or(u64::MAX);

        Timestamp {
            ms_since_1970: self.reference_ms.saturating_add(millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adding_saturates() {
        let t = Timestamp { ms_since_1970: 100 };
        assert_eq!(t.adding(50).ms_since_1970, 150);
        assert_eq!(t.adding(u64::MAX).ms_since_1970, u64::MAX);
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let mut clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a.ms_since_1970 > 0);
        assert!(b >= a);
    }
}
