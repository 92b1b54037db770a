use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
	#[error("channel actor is not running")]
	ChannelClosed,

	#[error("invalid lineup: {0}")]
	Lineup(#[from] channel_loop::ChannelError),

	#[error("could not read lineup file: {0}")]
	Io(#[from] std::io::Error),

	#[error("could not parse lineup file: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("probe client setup failed: {0}")]
	ProbeClient(#[from] reqwest::Error),
}
