use crate::playlist::Playlist;
use crate::snapshot::Snapshot;
use crate::state::{ChannelState, FallbackPosition};
use crate::types::ResolvedPart;
use tracing::debug;

/// The fallback timeline state machine. Pure logic: the orchestrator's
/// actor drives `tick` once per tick interval while the channel is in
/// fallback, and `start` whenever fallback (re)gains control.
#[derive(Debug, Clone)]
pub struct FallbackScheduler {
	playlist: Playlist,
}

impl FallbackScheduler {
	pub fn new(playlist: Playlist) -> Self {
		Self { playlist }
	}

	pub fn playlist(&self) -> &Playlist {
		&self.playlist
	}

	/// Advance the timeline by one second. Returns a snapshot only when the
	/// visible unit (reference or part) changed; a tick inside a part is
	/// silent by contract.
	pub fn tick(&self, state: &mut ChannelState) -> Option<Snapshot> {
		state.fallback_position.offset_secs += 1;

		let entry = self.playlist.entry(state.fallback_position.entry_index);
		if state.fallback_position.offset_secs >= entry.duration_secs() {
			state.fallback_position.entry_index = self.playlist.next_index(state.fallback_position.entry_index);
			state.fallback_position.offset_secs = 0;
			state.clear_last_notified();
			debug!(entry = state.fallback_position.entry_index, "fallback advanced to next entry");
		}

		let part = self.resolve_position(&state.fallback_position);
		self.notify_if_changed(state, part)
	}

	/// Hand control to fallback. Adopts `resume_from` verbatim when given
	/// (the snapshot taken at live entry); otherwise keeps the current
	/// position. Always re-notifies, even when the resolved unit is the one
	/// viewers last saw.
	pub fn start(&self, state: &mut ChannelState, resume_from: Option<FallbackPosition>) -> Snapshot {
		if let Some(position) = resume_from {
			state.fallback_position = position;
		}

		state.clear_last_notified();
		let part = self.resolve_position(&state.fallback_position);
		self.record_notified(state, &part);
		Snapshot::fallback(&part)
	}

	/// Resolve an absolute fallback position into the part playing there
	pub fn resolve_position(&self, position: &FallbackPosition) -> ResolvedPart {
		self.playlist.entry(position.entry_index).resolve(position.offset_secs)
	}

	fn notify_if_changed(&self, state: &mut ChannelState, part: ResolvedPart) -> Option<Snapshot> {
		let unchanged = state.last_notified_reference_id.as_deref() == Some(part.reference_id.as_str()) && state.last_notified_part_index == Some(part.part_index);
		if unchanged {
			return None;
		}

		self.record_notified(state, &part);
		Some(Snapshot::fallback(&part))
	}

	fn record_notified(&self, state: &mut ChannelState, part: &ResolvedPart) {
		state.active_reference_id = Some(part.reference_id.clone());
		state.last_notified_reference_id = Some(part.reference_id.clone());
		state.last_notified_part_index = Some(part.part_index);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::playlist::{FillerClip, PlaylistEntry};

	fn scheduler(entries: Vec<PlaylistEntry>) -> FallbackScheduler {
		FallbackScheduler::new(Playlist::new(entries).unwrap())
	}

	fn state_at(entry_index: usize, offset_secs: u64) -> ChannelState {
		ChannelState::with_position(FallbackPosition::new(entry_index, offset_secs))
	}

	#[test]
	fn start_always_notifies() {
		let scheduler = scheduler(vec![PlaylistEntry::simple("a", 10)]);
		let mut state = state_at(0, 0);

		let first = scheduler.start(&mut state, None);
		assert_eq!(first.reference_id(), "a");
		assert_eq!(first.offset_sec(), 0);

		// Same position, same unit, still a fresh notification
		let second = scheduler.start(&mut state, None);
		assert_eq!(second, first);
	}

	#[test]
	fn start_adopts_resume_position_verbatim() {
		let scheduler = scheduler(vec![
			PlaylistEntry::simple("a", 200),
			PlaylistEntry::simple("b", 200),
			PlaylistEntry::simple("c", 200),
			PlaylistEntry::simple("d", 200),
		]);
		let mut state = state_at(0, 0);

		let snapshot = scheduler.start(&mut state, Some(FallbackPosition::new(3, 120)));
		assert_eq!(state.fallback_position, FallbackPosition::new(3, 120));
		assert_eq!(snapshot.reference_id(), "d");
		assert_eq!(snapshot.offset_sec(), 120);
	}

	#[test]
	fn ticks_within_a_part_are_silent() {
		let scheduler = scheduler(vec![PlaylistEntry::simple("a", 10), PlaylistEntry::simple("b", 10)]);
		let mut state = state_at(0, 0);
		scheduler.start(&mut state, None);

		for _ in 0..9 {
			assert_eq!(scheduler.tick(&mut state), None);
		}
	}

	#[test]
	fn entry_boundary_emits_one_notification() {
		let scheduler = scheduler(vec![PlaylistEntry::simple("a", 10), PlaylistEntry::simple("b", 10)]);
		let mut state = state_at(0, 0);
		scheduler.start(&mut state, None);

		let mut notifications = Vec::new();
		for _ in 0..10 {
			if let Some(snapshot) = scheduler.tick(&mut state) {
				notifications.push(snapshot);
			}
		}

		assert_eq!(notifications.len(), 1);
		assert_eq!(notifications[0].reference_id(), "b");
		assert_eq!(notifications[0].offset_sec(), 0);
		assert_eq!(state.fallback_position, FallbackPosition::new(1, 0));
	}

	#[test]
	fn single_entry_playlist_wraps_onto_itself() {
		// One 10s entry cyclic on itself: tick 10 times, exactly one
		// notification on the wrap, then an 11th tick is silent at offset 1.
		let scheduler = scheduler(vec![PlaylistEntry::simple("A", 10)]);
		let mut state = state_at(0, 0);
		scheduler.start(&mut state, None);

		let mut notifications = 0;
		for _ in 0..10 {
			if scheduler.tick(&mut state).is_some() {
				notifications += 1;
			}
		}

		assert_eq!(notifications, 1);
		assert_eq!(state.fallback_position, FallbackPosition::new(0, 0));

		assert_eq!(scheduler.tick(&mut state), None);
		assert_eq!(state.fallback_position.offset_secs, 1);
	}

	#[test]
	fn last_entry_wraps_to_first() {
		let scheduler = scheduler(vec![PlaylistEntry::simple("a", 5), PlaylistEntry::simple("b", 5)]);
		let mut state = state_at(1, 0);
		scheduler.start(&mut state, None);

		for _ in 0..5 {
			scheduler.tick(&mut state);
		}
		assert_eq!(state.fallback_position, FallbackPosition::new(0, 0));
	}

	#[test]
	fn composite_part_crossings_notify_with_part_reference() {
		let scheduler = scheduler(vec![PlaylistEntry::composite(vec![FillerClip::new("p1", 3), FillerClip::new("p2", 4)])]);
		let mut state = state_at(0, 0);

		let start = scheduler.start(&mut state, None);
		assert_eq!(start.reference_id(), "p1");

		// Offsets 1,2 stay inside p1
		assert_eq!(scheduler.tick(&mut state), None);
		assert_eq!(scheduler.tick(&mut state), None);

		// Offset 3 crosses into p2
		let crossing = scheduler.tick(&mut state).expect("part boundary should notify");
		assert_eq!(crossing.reference_id(), "p2");
		assert_eq!(crossing.offset_sec(), 0);

		// Offsets 4..6 stay inside p2
		assert_eq!(scheduler.tick(&mut state), None);
		assert_eq!(scheduler.tick(&mut state), None);

		// Offset 7 wraps the entry back onto p1
		let wrap = scheduler.tick(&mut state).expect("entry wrap should notify");
		assert_eq!(wrap.reference_id(), "p1");
		assert_eq!(state.fallback_position, FallbackPosition::new(0, 0));
	}

	#[test]
	fn adjacent_same_reference_parts_still_notify_on_crossing() {
		// Two parts sharing one reference id differ by part index, so the
		// crossing is still a boundary event.
		let scheduler = scheduler(vec![PlaylistEntry::composite(vec![FillerClip::new("same", 2), FillerClip::new("same", 2)])]);
		let mut state = state_at(0, 0);
		scheduler.start(&mut state, None);

		assert_eq!(scheduler.tick(&mut state), None);
		let crossing = scheduler.tick(&mut state).expect("part index change should notify");
		assert_eq!(crossing.reference_id(), "same");
		assert_eq!(crossing.offset_sec(), 0);
	}

	#[test]
	fn active_reference_tracks_notifications() {
		let scheduler = scheduler(vec![PlaylistEntry::simple("a", 2), PlaylistEntry::simple("b", 2)]);
		let mut state = state_at(0, 0);
		scheduler.start(&mut state, None);
		assert_eq!(state.active_reference_id.as_deref(), Some("a"));

		scheduler.tick(&mut state);
		scheduler.tick(&mut state);
		assert_eq!(state.active_reference_id.as_deref(), Some("b"));
	}
}
