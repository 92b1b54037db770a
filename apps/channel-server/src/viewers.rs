use channel_loop::Snapshot;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Handle identifying one connected viewer
pub type ViewerId = u64;

/// Registry of connected viewers, owned by the transport layer and
/// decoupled from channel-state logic. Each viewer gets an unbounded queue
/// so broadcasts are fire-and-forget: a slow socket backs up its own queue,
/// never the orchestrator.
#[derive(Debug, Default)]
pub struct ViewerRegistry {
	viewers: DashMap<ViewerId, mpsc::UnboundedSender<Snapshot>>,
	next_id: AtomicU64,
}

impl ViewerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new viewer; the receiver half feeds that viewer's socket
	pub fn register(&self) -> (ViewerId, mpsc::UnboundedReceiver<Snapshot>) {
		let viewer_id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = mpsc::unbounded_channel();
		self.viewers.insert(viewer_id, tx);
		(viewer_id, rx)
	}

	pub fn deregister(&self, viewer_id: ViewerId) {
		self.viewers.remove(&viewer_id);
	}

	pub fn len(&self) -> usize {
		self.viewers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.viewers.is_empty()
	}

	/// Broadcast to every connected viewer. A viewer whose receiver is gone
	/// is pruned and skipped, never an error.
	pub fn send_to_all(&self, snapshot: &Snapshot) {
		let mut closed = Vec::new();

		for entry in self.viewers.iter() {
			if entry.value().send(snapshot.clone()).is_err() {
				closed.push(*entry.key());
			}
		}

		for viewer_id in closed {
			debug!(viewer = viewer_id, "pruning closed viewer during broadcast");
			self.viewers.remove(&viewer_id);
		}
	}

	/// Deliver to a single viewer, silently skipping one that is gone
	pub fn send_to_one(&self, viewer_id: ViewerId, snapshot: &Snapshot) {
		let closed = match self.viewers.get(&viewer_id) {
			Some(sender) => sender.send(snapshot.clone()).is_err(),
			None => false,
		};

		if closed {
			debug!(viewer = viewer_id, "pruning closed viewer on targeted send");
			self.viewers.remove(&viewer_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn snapshot() -> Snapshot {
		Snapshot::live("feed", 0)
	}

	#[test]
	fn broadcast_reaches_all_registered_viewers() {
		let registry = ViewerRegistry::new();
		let (_id_a, mut rx_a) = registry.register();
		let (_id_b, mut rx_b) = registry.register();

		registry.send_to_all(&snapshot());
		assert_eq!(rx_a.try_recv().unwrap(), snapshot());
		assert_eq!(rx_b.try_recv().unwrap(), snapshot());
	}

	#[test]
	fn targeted_send_reaches_only_that_viewer() {
		let registry = ViewerRegistry::new();
		let (id_a, mut rx_a) = registry.register();
		let (_id_b, mut rx_b) = registry.register();

		registry.send_to_one(id_a, &snapshot());
		assert_eq!(rx_a.try_recv().unwrap(), snapshot());
		assert!(rx_b.try_recv().is_err());
	}

	#[test]
	fn closed_viewers_are_pruned_not_errors() {
		let registry = ViewerRegistry::new();
		let (_id_a, rx_a) = registry.register();
		let (_id_b, mut rx_b) = registry.register();
		drop(rx_a);

		registry.send_to_all(&snapshot());
		assert_eq!(registry.len(), 1);
		assert_eq!(rx_b.try_recv().unwrap(), snapshot());
	}

	#[test]
	fn send_to_unknown_viewer_is_a_noop() {
		let registry = ViewerRegistry::new();
		registry.send_to_one(42, &snapshot());
		assert!(registry.is_empty());
	}
}
