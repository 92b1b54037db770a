use channel_loop::{LiveSource, PlaylistEntry};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8080")]
	pub port: u16,

	/// Path to the station lineup JSON file (playlist + live candidates)
	#[arg(long, env = "LINEUP_FILE", default_value = "lineup.json")]
	pub lineup_file: PathBuf,

	/// Seconds between fallback timeline ticks
	#[arg(long, env = "TICK_INTERVAL_SECS", default_value = "1")]
	pub tick_interval_secs: u64,

	/// Seconds between live source poll cycles
	#[arg(long, env = "POLL_INTERVAL_SECS", default_value = "60")]
	pub poll_interval_secs: u64,

	/// Per-request timeout for live source probes, in seconds
	#[arg(long, env = "PROBE_TIMEOUT_SECS", default_value = "5")]
	pub probe_timeout_secs: u64,

	/// Base URL the HTTP probe queries, as {base}/live/{source}
	#[arg(long, env = "PROBE_BASE_URL", default_value = "http://127.0.0.1:9090")]
	pub probe_base_url: String,

	/// Log level filter used when RUST_LOG is unset
	#[arg(long, env = "LOG_LEVEL", default_value = "info")]
	pub log_level: String,
}

/// Static station lineup, read once at startup and never re-read.
///
/// ```json
/// {
///   "playlist": [
///     {"referenceId": "ident", "durationSecs": 30},
///     {"parts": [{"referenceId": "ep1-a", "durationSecs": 600},
///                {"referenceId": "ep1-b", "durationSecs": 540}]}
///   ],
///   "candidates": [{"name": "studio"}, {"name": "remote"}]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
	pub playlist: Vec<PlaylistEntry>,
	pub candidates: Vec<LiveSource>,
}

impl Lineup {
	pub fn load(path: &Path) -> crate::error::Result<Self> {
		let raw = std::fs::read_to_string(path)?;
		Ok(serde_json::from_str(&raw)?)
	}
}
