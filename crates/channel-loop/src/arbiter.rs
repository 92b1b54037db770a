use crate::error::{ChannelError, ProbeError, Result};
use crate::state::ChannelState;
use crate::types::{LiveSource, ReferenceId};
use async_trait::async_trait;
use tracing::warn;

/// External capability that answers whether a named source is currently
/// broadcasting. Implementations bound each call with their own timeout; a
/// failure is equivalent to "not live" for that call.
#[async_trait]
pub trait LiveSourceProbe {
	async fn probe(&self, source_name: &str) -> std::result::Result<Option<ReferenceId>, ProbeError>;
}

/// What one poll cycle decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// A candidate is broadcasting and the channel is not already on that
	/// exact reference
	EnterOrSwitchLive { source_index: usize, reference_id: ReferenceId },
	/// No candidate is broadcasting while the channel is live
	ExitLive,
	/// Repeated identical polls are idempotent: no state write, no
	/// notification
	NoChange,
}

/// Priority-ordered live source arbitration. Holds only the static
/// candidate list; the channel state it reads belongs to the orchestrator.
#[derive(Debug, Clone)]
pub struct LiveArbiter {
	candidates: Vec<LiveSource>,
}

impl LiveArbiter {
	pub fn new(candidates: Vec<LiveSource>) -> Result<Self> {
		if candidates.is_empty() {
			return Err(ChannelError::NoCandidates);
		}
		Ok(Self { candidates })
	}

	pub fn candidates(&self) -> &[LiveSource] {
		&self.candidates
	}

	/// Scan candidates in priority order, stopping at the first hit; a probe
	/// for candidate `i` only fires when `0..i` all came back "not live".
	/// Probe failures count as "not live" for that candidate and never abort
	/// the scan.
	pub async fn poll_once<P: LiveSourceProbe + ?Sized>(&self, probe: &P, state: &ChannelState) -> PollOutcome {
		for (source_index, candidate) in self.candidates.iter().enumerate() {
			let reference_id = match probe.probe(&candidate.name).await {
				Ok(Some(reference_id)) => reference_id,
				Ok(None) => continue,
				Err(error) => {
					warn!(source = %candidate.name, %error, "probe failed, treating as not live");
					continue;
				}
			};

			if state.is_live && state.active_reference_id.as_deref() == Some(reference_id.as_str()) {
				return PollOutcome::NoChange;
			}

			return PollOutcome::EnterOrSwitchLive { source_index, reference_id };
		}

		if state.is_live {
			PollOutcome::ExitLive
		} else {
			PollOutcome::NoChange
		}
	}
}
