use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChannelError>;

#[derive(Debug, Error)]
pub enum ChannelError {
	#[error("playlist is empty")]
	EmptyPlaylist,

	#[error("playlist entry {0} has zero duration")]
	ZeroDuration(usize),

	#[error("composite entry {0} has no parts")]
	EmptyComposite(usize),

	#[error("no live source candidates configured")]
	NoCandidates,

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// A single probe call failing. Treated as "not live" for that candidate
/// only; the scan of the remaining candidates continues.
#[derive(Debug)]
pub struct ProbeError {
	pub source: String,
	pub reason: String,
}

impl std::fmt::Display for ProbeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "probe for source '{}' failed: {}", self.source, self.reason)
	}
}

impl std::error::Error for ProbeError {}

impl ProbeError {
	pub fn new(source: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			reason: reason.into(),
		}
	}
}
