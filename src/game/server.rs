//! The authoritative world task: applies session events and runs the tick loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::store::ScoreRecord;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::input::{handle_move, handle_shoot};
use super::snapshot::SnapshotBuilder;
use super::tick::{run_tick, TickReport};
use super::world::{Player, Viewport, WorldState};
use super::{PlayerInput, SessionEvent};

/// Counters readable outside the world task
#[derive(Debug, Default)]
pub struct WorldStats {
    pub connected_sessions: AtomicUsize,
    pub active_players: AtomicUsize,
    pub active_projectiles: AtomicUsize,
}

/// Handle to the running world task
#[derive(Clone)]
pub struct WorldHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub updates_tx: broadcast::Sender<ServerMsg>,
    pub stats: Arc<WorldStats>,
}

impl WorldHandle {
    /// Receive every broadcast sent after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.updates_tx.subscribe()
    }

    pub fn connected_sessions(&self) -> usize {
        self.stats.connected_sessions.load(Ordering::Relaxed)
    }

    pub fn active_players(&self) -> usize {
        self.stats.active_players.load(Ordering::Relaxed)
    }

    pub fn active_projectiles(&self) -> usize {
        self.stats.active_projectiles.load(Ordering::Relaxed)
    }
}

/// The single mutator of the world state
pub struct GameServer {
    world: WorldState,
    tick_count: u64,
    tick_interval: Duration,
    input_rx: mpsc::Receiver<PlayerInput>,
    updates_tx: broadcast::Sender<ServerMsg>,
    score_tx: mpsc::UnboundedSender<ScoreRecord>,
    stats: Arc<WorldStats>,
}

impl GameServer {
    /// Create the world task and its handle. Nothing runs until `run` is awaited.
    pub fn new(
        world: WorldState,
        tick_interval: Duration,
        score_tx: mpsc::UnboundedSender<ScoreRecord>,
    ) -> (Self, WorldHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (updates_tx, _) = broadcast::channel(64);
        let stats = Arc::new(WorldStats::default());

        let handle = WorldHandle {
            input_tx,
            updates_tx: updates_tx.clone(),
            stats: stats.clone(),
        };

        let server = Self {
            world,
            tick_count: 0,
            tick_interval,
            input_rx,
            updates_tx,
            score_tx,
            stats,
        };

        (server, handle)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// Run the tick loop and apply session events between ticks.
    /// Returns once every input sender is gone or `shutdown` fires. Players
    /// still in the world at that point get their scores queued for saving.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(tick_ms = self.tick_interval.as_millis() as u64, "World loop started");

        let mut tick_interval = interval(self.tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.tick();
                }
                input = self.input_rx.recv() => {
                    match input {
                        Some(input) => self.handle_input(input),
                        None => break,
                    }
                }
                // A dropped sender counts as shutdown too
                _ = shutdown.changed() => {
                    info!("World loop received shutdown");
                    break;
                }
            }
        }

        let saved = self.save_live_players();
        info!(ticks = self.tick_count, saved, "World loop stopped");
    }

    /// Queue a score save for every player still in the world, leaving them in place
    pub fn save_live_players(&self) -> usize {
        let saves: Vec<ScoreRecord> = self
            .world
            .players()
            .map(|player| ScoreRecord {
                username: player.username.clone(),
                score: player.score,
            })
            .collect();

        let count = saves.len();
        for save in saves {
            self.queue_save(save);
        }
        count
    }

    /// Apply one session event
    pub fn handle_input(&mut self, input: PlayerInput) {
        let session_id = input.session_id;
        trace!(
            session_id = %session_id,
            queued_ms = unix_millis().saturating_sub(input.received_at),
            "Session event"
        );

        match input.event {
            SessionEvent::Connected => self.handle_connect(session_id),
            SessionEvent::Disconnected => self.handle_disconnect(session_id),
            SessionEvent::Message(ClientMsg::Join {
                username,
                width,
                height,
                screen_width,
                screen_height,
            }) => {
                let viewport = Viewport {
                    canvas_width: width,
                    canvas_height: height,
                    screen_width,
                    screen_height,
                };
                self.handle_join(session_id, username, viewport);
            }
            SessionEvent::Message(ClientMsg::Move {
                keycode,
                sequence_number,
            }) => {
                handle_move(&mut self.world, session_id, keycode, sequence_number);
            }
            SessionEvent::Message(ClientMsg::Shoot { x, y, angle }) => {
                handle_shoot(&mut self.world, session_id, x, y, angle);
                self.refresh_stats();
            }
        }
    }

    /// Run one simulation tick and broadcast the result
    pub fn tick(&mut self) -> TickReport {
        self.tick_count += 1;
        let report = run_tick(&mut self.world);

        for hit in &report.hits {
            info!(
                tick = self.tick_count,
                projectile_id = hit.projectile_id,
                shooter_id = %hit.shooter_id,
                target_id = %hit.target_id,
                "Player eliminated"
            );
        }
        if !report.expired.is_empty() {
            debug!(tick = self.tick_count, expired = report.expired.len(), "Projectiles expired");
        }

        self.refresh_stats();
        self.broadcast(SnapshotBuilder::projectiles(&self.world));
        self.broadcast(SnapshotBuilder::players(&self.world));

        report
    }

    fn handle_connect(&mut self, session_id: Uuid) {
        self.stats.connected_sessions.fetch_add(1, Ordering::Relaxed);
        info!(session_id = %session_id, "Session connected");

        self.broadcast(SnapshotBuilder::players(&self.world));
    }

    fn handle_join(&mut self, session_id: Uuid, username: String, viewport: Viewport) {
        let (x, y) = self.world.generate_spawn_position();
        let color = self.world.generate_color();

        info!(
            session_id = %session_id,
            username = %username,
            x,
            y,
            "Player joined"
        );

        self.world
            .insert_player(Player::new(session_id, username, color, x, y, viewport));
        self.refresh_stats();

        self.broadcast(SnapshotBuilder::players(&self.world));
    }

    fn handle_disconnect(&mut self, session_id: Uuid) {
        // Never below zero
        let _ = self
            .stats
            .connected_sessions
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        match self.world.remove_player(&session_id) {
            Some(player) => {
                info!(session_id = %session_id, score = player.score, "Player left");
                self.queue_save(ScoreRecord {
                    username: player.username,
                    score: player.score,
                });
            }
            None => {
                info!(session_id = %session_id, "Session closed without a live player");
            }
        }

        self.refresh_stats();
        self.broadcast(SnapshotBuilder::players(&self.world));
    }

    fn queue_save(&self, save: ScoreRecord) {
        if let Err(e) = self.score_tx.send(save) {
            error!(username = %e.0.username, "Score writer unavailable");
        }
    }

    fn refresh_stats(&self) {
        self.stats
            .active_players
            .store(self.world.player_count(), Ordering::Relaxed);
        self.stats
            .active_projectiles
            .store(self.world.projectile_count(), Ordering::Relaxed);
    }

    fn broadcast(&self, msg: ServerMsg) {
        // No receivers is fine: nobody is connected
        let _ = self.updates_tx.send(msg);
    }
}
