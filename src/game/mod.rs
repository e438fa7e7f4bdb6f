//! Game simulation modules

pub mod combat;
pub mod input;
pub mod physics;
pub mod server;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use server::{GameServer, WorldHandle};
pub use world::{Player, Viewport, WorldState};

use crate::ws::protocol::ClientMsg;
use uuid::Uuid;

/// Distance a player moves per accepted move intent
pub const PLAYER_SPEED: f64 = 5.0;
/// Player collision/render radius
pub const PLAYER_RADIUS: f64 = 10.0;
/// Distance a projectile travels per tick
pub const PROJECTILE_SPEED: f64 = 5.0;
/// Projectile collision radius
pub const PROJECTILE_RADIUS: f64 = 5.0;

/// Event forwarded from a session to the game server
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub session_id: Uuid,
    pub event: SessionEvent,
    pub received_at: u64,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Socket upgraded; no player exists yet
    Connected,
    Message(ClientMsg),
    /// Socket closed or failed
    Disconnected,
}
