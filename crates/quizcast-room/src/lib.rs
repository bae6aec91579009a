//! Room lifecycle management for Quizcast.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! phase state machine, the question flow, and the player roster. All
//! mutations of one room go through its command channel, so two mutations
//! of the same room can never interleave — that single property is what
//! makes submission idempotence and the eviction/rebind race safe.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, generates join codes,
//!   routes cross-room operations (identity migration, disconnects)
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Phase`] — lobby → question → reveal → question | ended
//! - [`RoomConfig`] — capacity, grace window, time limit, host-exit policy

mod config;
mod error;
mod registry;
mod roster;
mod session;

pub use config::{HostExitPolicy, Phase, RoomConfig};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use session::{
    DisconnectOutcome, EventSender, PlayerPresence, RoomHandle, RoomInfo,
};
