use crate::error::{Result, ServerError};
use crate::viewers::{ViewerId, ViewerRegistry};
use channel_loop::{ChannelState, FallbackScheduler, LiveArbiter, LiveSourceProbe, PollOutcome, Snapshot};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Events delivered to the actor from the transport layer
#[derive(Debug, Clone)]
pub enum ChannelCommand {
	ViewerJoin { viewer_id: ViewerId },
}

/// Timer cadence, read once from configuration
#[derive(Debug, Clone, Copy)]
pub struct ChannelTiming {
	pub tick_interval: Duration,
	pub poll_interval: Duration,
}

/// Handle to the channel actor. All methods are immutable; every mutation
/// of `ChannelState` happens inside the actor loop, one event processed to
/// completion before the next.
#[derive(Clone)]
pub struct Channel {
	command_tx: mpsc::UnboundedSender<ChannelCommand>,
	state_rx: watch::Receiver<ChannelState>,
}

impl Channel {
	/// Spawn the actor. It boots in fallback, pushing one initial snapshot,
	/// and runs until the token is cancelled.
	pub fn spawn(
		scheduler: FallbackScheduler,
		arbiter: LiveArbiter,
		probe: Arc<dyn LiveSourceProbe + Send + Sync>,
		viewers: Arc<ViewerRegistry>,
		timing: ChannelTiming,
		cancel_token: CancellationToken,
	) -> (Self, JoinHandle<()>) {
		let (command_tx, command_rx) = mpsc::unbounded_channel();

		let state = ChannelState::cold_start(scheduler.playlist());
		let (state_tx, state_rx) = watch::channel(state.clone());

		let engine = ChannelEngine {
			state,
			scheduler,
			arbiter,
			probe,
			viewers,
			state_tx,
		};

		let task = tokio::spawn(run(engine, timing, command_rx, cancel_token));

		(Self { command_tx, state_rx }, task)
	}

	/// Raise a viewer-join event; the actor answers with a personalized
	/// snapshot to that viewer only
	pub fn viewer_join(&self, viewer_id: ViewerId) -> Result<()> {
		self
			.command_tx
			.send(ChannelCommand::ViewerJoin { viewer_id })
			.map_err(|_| ServerError::ChannelClosed)
	}

	pub fn current_state(&self) -> ChannelState {
		self.state_rx.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<ChannelState> {
		self.state_rx.clone()
	}
}

/// What the actor loop must do with the fallback ticker after a poll
enum TimerAction {
	StopFallback,
	StartFallback,
	None,
}

/// Internal state owned by the actor task. The sole mutator of
/// `ChannelState`.
struct ChannelEngine {
	state: ChannelState,
	scheduler: FallbackScheduler,
	arbiter: LiveArbiter,
	probe: Arc<dyn LiveSourceProbe + Send + Sync>,
	viewers: Arc<ViewerRegistry>,
	state_tx: watch::Sender<ChannelState>,
}

async fn run(mut engine: ChannelEngine, timing: ChannelTiming, mut command_rx: mpsc::UnboundedReceiver<ChannelCommand>, cancel_token: CancellationToken) {
	engine.start_fallback(None);

	// The fallback ticker exists only while in fallback. On live entry the
	// handle is dropped; on live exit a fresh one is created, so no stray
	// tick from a stale timer can move the timeline during a live period.
	let mut fallback_ticker = Some(ticker(timing.tick_interval));

	// The poll ticker runs in every mode: a higher-priority source must be
	// able to pre-empt a lower-priority one that is already live.
	let mut poll_ticker = ticker(timing.poll_interval);

	info!(tick = ?timing.tick_interval, poll = ?timing.poll_interval, "channel actor started");

	loop {
		tokio::select! {
			_ = cancel_token.cancelled() => {
				info!("channel actor cancelled");
				break;
			}
			_ = tick_when_present(&mut fallback_ticker), if fallback_ticker.is_some() => {
				engine.handle_tick();
			}
			_ = poll_ticker.tick() => {
				match engine.handle_poll().await {
					TimerAction::StopFallback => fallback_ticker = None,
					TimerAction::StartFallback => fallback_ticker = Some(ticker(timing.tick_interval)),
					TimerAction::None => {}
				}
			}
			Some(command) = command_rx.recv() => {
				engine.handle_command(command);
			}
		}
	}

	info!("channel actor stopped");
}

/// First tick fires one full period after creation, not immediately
fn ticker(period: Duration) -> Interval {
	interval_at(Instant::now() + period, period)
}

async fn tick_when_present(ticker: &mut Option<Interval>) {
	if let Some(ticker) = ticker.as_mut() {
		ticker.tick().await;
	}
}

impl ChannelEngine {
	/// One second of fallback timeline. Boundary crossings broadcast; other
	/// ticks are silent.
	fn handle_tick(&mut self) {
		// The ticker is gone while live; nothing may move the timeline then
		if self.state.is_live {
			return;
		}

		if let Some(snapshot) = self.scheduler.tick(&mut self.state) {
			info!(reference = snapshot.reference_id(), "fallback boundary");
			self.viewers.send_to_all(&snapshot);
		}

		self.publish_state();
	}

	/// One poll cycle: scan candidates and apply the outcome
	async fn handle_poll(&mut self) -> TimerAction {
		let outcome = self.arbiter.poll_once(self.probe.as_ref(), &self.state).await;

		let action = match outcome {
			PollOutcome::EnterOrSwitchLive { source_index, reference_id } => self.enter_live(source_index, reference_id),
			PollOutcome::ExitLive => {
				self.exit_live();
				TimerAction::StartFallback
			}
			PollOutcome::NoChange => TimerAction::None,
		};

		self.publish_state();
		action
	}

	fn enter_live(&mut self, source_index: usize, reference_id: String) -> TimerAction {
		let from_fallback = !self.state.is_live;

		// Snapshot the timeline before live takes over, so a later return
		// resumes exactly here. A live-to-live switch keeps the snapshot
		// already taken.
		if from_fallback {
			self.state.saved_fallback_position = Some(self.state.fallback_position);
		}

		self.state.is_live = true;
		self.state.live_source_index = Some(source_index);
		self.state.active_reference_id = Some(reference_id.clone());
		self.state.live_started_at = Some(Utc::now());
		self.state.last_notified_part_index = None;

		info!(source = source_index, reference = %reference_id, "live source took the channel");
		self.viewers.send_to_all(&Snapshot::live(reference_id, 0));

		if from_fallback {
			TimerAction::StopFallback
		} else {
			TimerAction::None
		}
	}

	fn exit_live(&mut self) {
		self.state.is_live = false;
		self.state.live_source_index = None;
		self.state.live_started_at = None;

		// One-shot resume credential, consumed here
		let resume_from = self.state.saved_fallback_position.take();
		info!(resumed = resume_from.is_some(), "live ended, fallback resumes");
		self.start_fallback(resume_from);
	}

	fn handle_command(&mut self, command: ChannelCommand) {
		match command {
			ChannelCommand::ViewerJoin { viewer_id } => {
				// Joins never mutate state and never broadcast
				let snapshot = self.join_snapshot();
				self.viewers.send_to_one(viewer_id, &snapshot);
			}
		}
	}

	fn start_fallback(&mut self, resume_from: Option<channel_loop::FallbackPosition>) {
		let snapshot = self.scheduler.start(&mut self.state, resume_from);
		self.viewers.send_to_all(&snapshot);
		self.publish_state();
	}

	/// Personalized snapshot for a joining viewer: wall-clock elapsed while
	/// live, exact resolved position in fallback
	fn join_snapshot(&self) -> Snapshot {
		if self.state.is_live {
			if let (Some(reference_id), Some(started_at)) = (self.state.active_reference_id.clone(), self.state.live_started_at) {
				let elapsed = (Utc::now() - started_at).num_seconds().max(0) as u64;
				return Snapshot::live(reference_id, elapsed);
			}
			warn!("live state missing reference or start time, answering with fallback position");
		}

		Snapshot::fallback(&self.scheduler.resolve_position(&self.state.fallback_position))
	}

	fn publish_state(&self) {
		self.state_tx.send_replace(self.state.clone());
	}
}
