use std::time::Duration;

use tokio::time::Instant;

/// Absolute wall-clock cutoff shared by every fetch of one retrieval phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
	at: Instant,
}
impl Deadline {
	pub fn after(budget: Duration) -> Self {
		Self { at: Instant::now() + budget }
	}

	pub fn instant(&self) -> Instant {
		self.at
	}

	pub fn is_elapsed(&self) -> bool {
		Instant::now() >= self.at
	}

	pub fn remaining(&self) -> Duration {
		self.at.saturating_duration_since(Instant::now())
	}

	/// `local` clipped to the time left, or `None` once the deadline has passed.
	pub fn bound(&self, local: Duration) -> Option<Duration> {
		let remaining = self.remaining();

		if remaining.is_zero() {
			return None;
		}

		Some(local.min(remaining))
	}
}
