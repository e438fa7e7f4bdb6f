//! Authoritative world state: connected players and in-flight projectiles

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use super::combat::Projectile;
use super::PLAYER_RADIUS;

/// Player state (authoritative)
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub color: String,

    // Position
    pub x: f64,
    pub y: f64,
    pub radius: f64,

    pub score: u64,
    /// Last applied client sequence number
    pub sequence_number: u64,

    /// Canvas size reported at join, bounds this player's projectiles
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Screen size reported at join, bounds this player's movement
    pub screen_width: f64,
    pub screen_height: f64,
}

/// Client-reported dimensions supplied with a join intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl Player {
    pub fn new(id: Uuid, username: String, color: String, x: f64, y: f64, viewport: Viewport) -> Self {
        Self {
            id,
            username,
            color,
            x,
            y,
            radius: PLAYER_RADIUS,
            score: 0,
            sequence_number: 0,
            canvas_width: viewport.canvas_width,
            canvas_height: viewport.canvas_height,
            screen_width: viewport.screen_width,
            screen_height: viewport.screen_height,
        }
    }
}

/// World state (owned by the game server task)
pub struct WorldState {
    players: HashMap<Uuid, Player>,
    /// Roster order; collision checks walk players in join order
    player_order: Vec<Uuid>,
    projectiles: BTreeMap<u64, Projectile>,
    last_projectile_id: u64,
    spawn_width: f64,
    spawn_height: f64,
    rng: ChaCha8Rng,
}

impl WorldState {
    pub fn new(seed: u64, spawn_width: f64, spawn_height: f64) -> Self {
        Self {
            players: HashMap::new(),
            player_order: Vec::new(),
            projectiles: BTreeMap::new(),
            last_projectile_id: 0,
            spawn_width,
            spawn_height,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a spawn position for a new player
    pub fn generate_spawn_position(&mut self) -> (f64, f64) {
        let x = self.rng.gen_range(0.0..self.spawn_width);
        let y = self.rng.gen_range(0.0..self.spawn_height);
        (x, y)
    }

    /// Pick a cosmetic color
    pub fn generate_color(&mut self) -> String {
        let hue: f64 = self.rng.gen_range(0.0..360.0);
        format!("hsl({}, 100%, 50%)", hue)
    }

    /// Insert a player, replacing any existing one with the same id in place
    pub fn insert_player(&mut self, player: Player) {
        let id = player.id;
        if self.players.insert(id, player).is_none() {
            self.player_order.push(id);
        }
    }

    pub fn remove_player(&mut self, id: &Uuid) -> Option<Player> {
        let player = self.players.remove(id)?;
        self.player_order.retain(|pid| pid != id);
        Some(player)
    }

    pub fn player(&self, id: &Uuid) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &Uuid) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Players in join order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.player_order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Store a projectile under the next unused id
    pub fn spawn_projectile(&mut self, owner: Uuid, x: f64, y: f64, angle: f64) -> u64 {
        self.last_projectile_id += 1;
        let id = self.last_projectile_id;
        self.projectiles.insert(id, Projectile::new(id, owner, x, y, angle));
        id
    }

    pub fn projectile(&self, id: u64) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectile_mut(&mut self, id: u64) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    pub fn remove_projectile(&mut self, id: u64) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    /// Projectiles in ascending id order
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn projectile_ids(&self) -> Vec<u64> {
        self.projectiles.keys().copied().collect()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }
}
