//! Bounty scout application: configuration, wiring and triggers.
mod config;
mod server;
mod wiring;

pub use config::{AppConfig, ConfigError, ConfigOverrides, DEFAULT_SEEN_STORE};
pub use server::{handle_request, respond_to_cycle, route, serve, Route, TriggerResponse};
pub use wiring::{build_orchestrator, build_runtime};
