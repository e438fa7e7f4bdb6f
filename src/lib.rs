//! Shooter Server - authoritative server core for a real-time top-down shooter
//!
//! One task owns the world (players and projectiles), applies session
//! intents as they arrive and advances projectiles on a fixed tick. Every
//! change is fanned out to all WebSocket sessions as full-state updates.
//! Scores are written to Supabase when a player disconnects.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod store;
pub mod util;
pub mod ws;
