use crate::error::{ChannelError, Result};
use crate::types::{ReferenceId, ResolvedPart, Seconds};
use serde::{Deserialize, Serialize};

/// A single playable piece of filler content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FillerClip {
	pub reference_id: ReferenceId,
	pub duration_secs: Seconds,
}

impl FillerClip {
	pub fn new(reference_id: impl Into<ReferenceId>, duration_secs: Seconds) -> Self {
		Self {
			reference_id: reference_id.into(),
			duration_secs,
		}
	}
}

/// One logical item in the filler loop. A composite entry plays as one
/// continuous unit; viewers only ever see the active part's reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PlaylistEntry {
	Composite { parts: Vec<FillerClip> },
	Simple(FillerClip),
}

impl PlaylistEntry {
	pub fn simple(reference_id: impl Into<ReferenceId>, duration_secs: Seconds) -> Self {
		Self::Simple(FillerClip::new(reference_id, duration_secs))
	}

	pub fn composite(parts: Vec<FillerClip>) -> Self {
		Self::Composite { parts }
	}

	/// Total duration of this entry; for a composite, the sum of its parts
	pub fn duration_secs(&self) -> Seconds {
		match self {
			Self::Simple(clip) => clip.duration_secs,
			Self::Composite { parts } => parts.iter().map(|p| p.duration_secs).sum(),
		}
	}

	/// Map an elapsed offset into this entry onto the part playing at that
	/// moment. Callers keep `elapsed_secs` below `duration_secs()`; an
	/// out-of-range offset on a composite clamps to the start of part 0
	/// instead of panicking.
	pub fn resolve(&self, elapsed_secs: Seconds) -> ResolvedPart {
		match self {
			Self::Simple(clip) => ResolvedPart {
				reference_id: clip.reference_id.clone(),
				part_index: 0,
				offset_in_part_secs: elapsed_secs,
			},
			Self::Composite { parts } => {
				let mut remainder = elapsed_secs;
				for (part_index, part) in parts.iter().enumerate() {
					if remainder < part.duration_secs {
						return ResolvedPart {
							reference_id: part.reference_id.clone(),
							part_index,
							offset_in_part_secs: remainder,
						};
					}
					remainder -= part.duration_secs;
				}

				// Out of range for every part; clamp to the start
				ResolvedPart {
					reference_id: parts[0].reference_id.clone(),
					part_index: 0,
					offset_in_part_secs: 0,
				}
			}
		}
	}
}

/// Ordered, non-empty, cyclic sequence of filler entries. Immutable after
/// startup validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
	entries: Vec<PlaylistEntry>,
}

impl Playlist {
	/// Validate and build the playlist. Empty playlists, zero-duration
	/// clips and empty composites refuse to start the channel.
	pub fn new(entries: Vec<PlaylistEntry>) -> Result<Self> {
		if entries.is_empty() {
			return Err(ChannelError::EmptyPlaylist);
		}

		for (index, entry) in entries.iter().enumerate() {
			match entry {
				PlaylistEntry::Simple(clip) => {
					if clip.duration_secs == 0 {
						return Err(ChannelError::ZeroDuration(index));
					}
				}
				PlaylistEntry::Composite { parts } => {
					if parts.is_empty() {
						return Err(ChannelError::EmptyComposite(index));
					}
					if parts.iter().any(|p| p.duration_secs == 0) {
						return Err(ChannelError::ZeroDuration(index));
					}
				}
			}
		}

		Ok(Self { entries })
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entry(&self, index: usize) -> &PlaylistEntry {
		&self.entries[index]
	}

	/// Next entry index, wrapping from the last entry back to 0
	pub fn next_index(&self, index: usize) -> usize {
		(index + 1) % self.entries.len()
	}
}
