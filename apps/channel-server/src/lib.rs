pub mod config;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod routes;
pub mod viewers;

pub use config::{Config, Lineup};
pub use error::{Result, ServerError};
pub use orchestrator::{Channel, ChannelCommand, ChannelTiming};
pub use viewers::{ViewerId, ViewerRegistry};
