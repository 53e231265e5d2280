//! HTTP transport for the Mafia match engine
//!
//! This crate is the collaborator the engine knows nothing about: URL
//! routing, query decoding, JSON encoding, error-to-status mapping, and
//! process startup. Game semantics live entirely in `mafia-core`.

pub mod config;
pub mod handlers;
pub mod response;
pub mod routes;

pub use config::{Config, ConfigError};
pub use handlers::ServerState;
pub use response::{PhaseExecutionResponse, PlayerResponse};
pub use routes::Route;
