use anyhow::Result;
use channel_server::config::{Config, Lineup};
use channel_server::orchestrator::{Channel, ChannelTiming};
use channel_server::probe::HttpProbe;
use channel_server::routes::{self, AppState};
use channel_server::viewers::ViewerRegistry;
use channel_loop::{FallbackScheduler, LiveArbiter, Playlist};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
		.init();

	// Lineup problems refuse startup; an empty playlist or candidate list
	// has no defined timeline behavior
	let lineup = Lineup::load(&config.lineup_file)?;
	let playlist = Playlist::new(lineup.playlist)?;
	let arbiter = LiveArbiter::new(lineup.candidates)?;

	info!(
		entries = playlist.len(),
		candidates = arbiter.candidates().len(),
		lineup = %config.lineup_file.display(),
		"lineup loaded"
	);

	let probe = Arc::new(HttpProbe::new(config.probe_base_url.clone(), Duration::from_secs(config.probe_timeout_secs))?);
	let viewers = Arc::new(ViewerRegistry::new());
	let cancel_token = CancellationToken::new();

	let timing = ChannelTiming {
		tick_interval: Duration::from_secs(config.tick_interval_secs),
		poll_interval: Duration::from_secs(config.poll_interval_secs),
	};

	let (channel, actor_task) = Channel::spawn(FallbackScheduler::new(playlist), arbiter, probe, Arc::clone(&viewers), timing, cancel_token.clone());

	// Ctrl-C cancels the actor and drains the server
	let shutdown_token = cancel_token.clone();
	tokio::spawn(async move {
		match tokio::signal::ctrl_c().await {
			Ok(()) => {
				info!("shutdown signal received");
				shutdown_token.cancel();
			}
			Err(error) => error!(%error, "failed to listen for shutdown signal"),
		}
	});

	let app = routes::router(AppState {
		channel,
		viewers: Arc::clone(&viewers),
	})
	.layer(TraceLayer::new_for_http());

	let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
	info!(addr = %listener.local_addr()?, "channel server listening");

	axum::serve(listener, app).with_graceful_shutdown(cancel_token.cancelled_owned()).await?;

	actor_task.await?;
	info!("channel server stopped");
	Ok(())
}
