use time::OffsetDateTime;

pub type Timestamp = OffsetDateTime;

pub fn now() -> Timestamp {
	OffsetDateTime::now_utc()
}

/// A source of "now". Token expiry is checked against this instead of the ambient wall clock.
pub trait Clock: Send + Sync {
	fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	#[inline]
	fn now(&self) -> Timestamp {
		now()
	}
}

#[cfg(test)]
pub use fixed::FixedClock;


#[cfg(test)]
mod test {
	use time::macros::datetime;
	use time::Duration;

	use super::{Clock, FixedClock, SystemClock};

	#[test]
	fn fixed_clock_moves_only_when_told() {
		let clock = FixedClock::new(datetime!(2022-10-14 12:00 UTC));
		assert_eq!(clock.now(), datetime!(2022-10-14 12:00 UTC));
		clock.advance(Duration::hours(25));
		assert_eq!(clock.now(), datetime!(2022-10-15 13:00 UTC));
		clock.set(datetime!(2021-01-01 0:00 UTC));
		assert_eq!(clock.now(), datetime!(2021-01-01 0:00 UTC));
	}

	#[test]
	fn system_clock_is_utc() {
		assert!(SystemClock.now().offset().is_utc());
	}
}
