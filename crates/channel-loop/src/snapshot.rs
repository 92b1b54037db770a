use crate::types::{ReferenceId, ResolvedPart, Seconds};
use serde::{Deserialize, Serialize};

/// Outbound wire snapshot pushed to viewers. The shape
/// `{type:"update", isLive, referenceId, offsetSec}` is a stable contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Snapshot {
	#[serde(rename = "update")]
	#[serde(rename_all = "camelCase")]
	Update {
		is_live: bool,
		reference_id: ReferenceId,
		offset_sec: Seconds,
	},
}

impl Snapshot {
	pub fn live(reference_id: impl Into<ReferenceId>, offset_sec: Seconds) -> Self {
		Self::Update {
			is_live: true,
			reference_id: reference_id.into(),
			offset_sec,
		}
	}

	pub fn fallback(part: &ResolvedPart) -> Self {
		Self::Update {
			is_live: false,
			reference_id: part.reference_id.clone(),
			offset_sec: part.offset_in_part_secs,
		}
	}

	pub fn is_live(&self) -> bool {
		match self {
			Self::Update { is_live, .. } => *is_live,
		}
	}

	pub fn reference_id(&self) -> &str {
		match self {
			Self::Update { reference_id, .. } => reference_id,
		}
	}

	pub fn offset_sec(&self) -> Seconds {
		match self {
			Self::Update { offset_sec, .. } => *offset_sec,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_shape_is_stable() {
		let snapshot = Snapshot::live("feed-1", 45);
		let json = serde_json::to_value(&snapshot).unwrap();

		assert_eq!(json["type"], "update");
		assert_eq!(json["isLive"], true);
		assert_eq!(json["referenceId"], "feed-1");
		assert_eq!(json["offsetSec"], 45);
	}

	#[test]
	fn fallback_snapshot_carries_part_offset() {
		let part = ResolvedPart {
			reference_id: "clip-b".to_string(),
			part_index: 1,
			offset_in_part_secs: 3,
		};

		let snapshot = Snapshot::fallback(&part);
		assert!(!snapshot.is_live());
		assert_eq!(snapshot.reference_id(), "clip-b");
		assert_eq!(snapshot.offset_sec(), 3);
	}
}
