use serde::{Deserialize, Serialize};

/// Whole seconds of timeline position
pub type Seconds = u64;

/// Identifier viewers use to locate a playable piece of content
pub type ReferenceId = String;

/// A named external source that may or may not be broadcasting.
/// Priority is given by position in the candidate list; index 0 wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveSource {
	pub name: String,
}

impl LiveSource {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

/// Where an elapsed offset lands inside a playlist entry.
/// Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPart {
	pub reference_id: ReferenceId,
	/// Always 0 for simple entries
	pub part_index: usize,
	pub offset_in_part_secs: Seconds,
}
