//! Mafia Core - In-memory match engine for concurrent Mafia games
//!
//! This crate hosts any number of independent matches, each owned by a host
//! address, and coordinates player membership, role assignment, day/night
//! phases, voting, tallying, and victory detection.
//!
//! ## Architecture
//!
//! ```text
//! GameEngine (registry: host address -> match)
//!  │
//!  └── GameState (one match)
//!       ├── world: roster, phase, vote maps      (RwLock)
//!       ├── start signal: one-shot broadcast     (Mutex)
//!       └── phase signal: one-shot broadcast     (Mutex)
//! ```
//!
//! ## Key Components
//!
//! - [`GameEngine`]: process-wide registry plus the operation surface
//! - [`GameState`]: a single match's lifecycle and state machine
//! - [`Broadcast`]: one-shot fan-out channel behind the two wait operations
//! - [`PhaseExecution`]: the event payload delivered when a phase completes
//!
//! ## Design Principles
//!
//! 1. **The registry lock is never held during match work** - lookups hand
//!    out an `Arc` to the match, whose own locks then apply
//! 2. **Phase execution is atomic with respect to vote recording** - a vote
//!    is either tallied in the completing phase or validated against the
//!    next one, never astride the boundary
//! 3. **Subscription and broadcast share one mutual-exclusion region** - a
//!    subscriber registered before a broadcast receives it exactly once

mod broadcast;
mod engine;
mod error;
mod game;
mod phase;
mod player;
mod rng;

pub use broadcast::{Broadcast, Closed};
pub use engine::GameEngine;
pub use error::{Error, Result};
pub use game::GameState;
pub use phase::{PhaseExecution, PhaseOutcome, TimeOfDay};
pub use player::{Player, PlayerRole};
pub use rng::EngineRng;
