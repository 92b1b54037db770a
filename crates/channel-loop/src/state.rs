use crate::playlist::Playlist;
use crate::types::{ReferenceId, Seconds};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where the fallback timeline currently is: elapsed seconds into one
/// playlist entry (which may span multiple parts)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPosition {
	pub entry_index: usize,
	pub offset_secs: Seconds,
}

impl FallbackPosition {
	pub fn new(entry_index: usize, offset_secs: Seconds) -> Self {
		Self { entry_index, offset_secs }
	}
}

/// The single source of truth for what the channel is doing. Exactly one
/// instance exists for the process lifetime, mutated only by the
/// orchestrator actor.
#[derive(Debug, Clone)]
pub struct ChannelState {
	pub is_live: bool,
	pub active_reference_id: Option<ReferenceId>,
	/// Index into the candidate list, only while live
	pub live_source_index: Option<usize>,
	pub live_started_at: Option<DateTime<Utc>>,
	pub fallback_position: FallbackPosition,
	/// Snapshot taken at live entry; consumed exactly once on live exit
	pub saved_fallback_position: Option<FallbackPosition>,
	pub last_notified_reference_id: Option<ReferenceId>,
	pub last_notified_part_index: Option<usize>,
}

impl ChannelState {
	/// Fresh state starting in fallback at the given position
	pub fn with_position(position: FallbackPosition) -> Self {
		Self {
			is_live: false,
			active_reference_id: None,
			live_source_index: None,
			live_started_at: None,
			fallback_position: position,
			saved_fallback_position: None,
			last_notified_reference_id: None,
			last_notified_part_index: None,
		}
	}

	/// Fresh state with no prior position: a uniformly random entry at
	/// offset 0, so a restarted process lands somewhere new in the loop
	pub fn cold_start(playlist: &Playlist) -> Self {
		let entry_index = rand::rng().random_range(0..playlist.len());
		Self::with_position(FallbackPosition::new(entry_index, 0))
	}

	/// Forget what was last pushed to viewers, forcing the next resolve to
	/// count as a boundary
	pub fn clear_last_notified(&mut self) {
		self.last_notified_reference_id = None;
		self.last_notified_part_index = None;
	}
}
