pub mod arbiter;
pub mod error;
pub mod playlist;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod types;

pub use arbiter::{LiveArbiter, LiveSourceProbe, PollOutcome};
pub use error::{ChannelError, ProbeError, Result};
pub use playlist::{FillerClip, Playlist, PlaylistEntry};
pub use scheduler::FallbackScheduler;
pub use snapshot::Snapshot;
pub use state::{ChannelState, FallbackPosition};
pub use types::*;
