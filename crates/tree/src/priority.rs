use std::cmp::Ordering;

/// Total order used to pick among providers competing for the same node.
///
/// Higher rank sorts first; on equal rank the provider registered earlier
/// (lower registration id) wins. Registration ids are assigned once from a
/// monotonic counter and never reused, so the order is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority {
	pub rank: i32,
	pub registration_id: u64,
}

impl Priority {
	/// Creates a priority from a rank and an assigned registration id.
	pub fn new(rank: i32, registration_id: u64) -> Self {
		Self {
			rank,
			registration_id,
		}
	}
}

impl Ord for Priority {
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.rank
			.cmp(&self.rank)
			.then(self.registration_id.cmp(&other.registration_id))
	}
}

impl PartialOrd for Priority {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
