//! Builds the full-state messages broadcast to every session

use std::collections::{BTreeMap, HashMap};

use crate::ws::protocol::{Extent, PlayerSnapshot, ProjectileSnapshot, ServerMsg, Vec2};

use super::combat::Projectile;
use super::world::{Player, WorldState};

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            x: p.x,
            y: p.y,
            color: p.color.clone(),
            sequence_number: p.sequence_number,
            score: p.score,
            username: p.username.clone(),
            sc_width: p.screen_width,
            sc_height: p.screen_height,
            canvas: Extent {
                width: p.canvas_width,
                height: p.canvas_height,
            },
            radius: p.radius,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            x: p.x,
            y: p.y,
            velocity: Vec2 {
                x: p.vel_x,
                y: p.vel_y,
            },
            player_id: p.owner_id,
        }
    }
}

/// Builds broadcast messages from the world state
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Full roster message
    pub fn players(world: &WorldState) -> ServerMsg {
        let players: HashMap<_, _> = world
            .players()
            .map(|p| (p.id, PlayerSnapshot::from(p)))
            .collect();

        ServerMsg::PlayersUpdate { players }
    }

    /// Every in-flight projectile, frozen ones included
    pub fn projectiles(world: &WorldState) -> ServerMsg {
        let projectiles: BTreeMap<_, _> = world
            .projectiles()
            .map(|p| (p.id, ProjectileSnapshot::from(p)))
            .collect();

        ServerMsg::ProjectilesUpdate { projectiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::Viewport;
    use uuid::Uuid;

    #[test]
    fn test_players_message_contains_whole_roster() {
        let mut world = WorldState::new(5, 1024.0, 768.0);
        let viewport = Viewport {
            canvas_width: 1024.0,
            canvas_height: 768.0,
            screen_width: 800.0,
            screen_height: 600.0,
        };
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        world.insert_player(Player::new(a, "a".into(), "hsl(1, 100%, 50%)".into(), 10.0, 20.0, viewport));
        world.insert_player(Player::new(b, "b".into(), "hsl(2, 100%, 50%)".into(), 30.0, 40.0, viewport));

        let ServerMsg::PlayersUpdate { players } = SnapshotBuilder::players(&world) else {
            panic!("expected players-update");
        };

        assert_eq!(players.len(), 2);
        let snap = &players[&a];
        assert_eq!((snap.x, snap.y), (10.0, 20.0));
        assert_eq!(snap.sc_width, 800.0);
        assert_eq!(snap.canvas, Extent { width: 1024.0, height: 768.0 });
        assert_eq!(snap.radius, 10.0);
    }

    #[test]
    fn test_players_wire_field_names() {
        let mut world = WorldState::new(5, 1024.0, 768.0);
        let id = Uuid::new_v4();
        let viewport = Viewport {
            canvas_width: 1024.0,
            canvas_height: 768.0,
            screen_width: 1024.0,
            screen_height: 768.0,
        };
        let mut player = Player::new(id, "zed".into(), "hsl(3, 100%, 50%)".into(), 1.0, 2.0, viewport);
        player.sequence_number = 12;
        world.insert_player(player);

        let value = serde_json::to_value(SnapshotBuilder::players(&world)).unwrap();
        let entry = &value["players"][id.to_string()];

        assert_eq!(value["type"], "players-update");
        assert_eq!(entry["sequenceNumber"], 12);
        assert_eq!(entry["username"], "zed");
        assert_eq!(entry["canvas"]["height"], 768.0);
    }

    #[test]
    fn test_projectiles_message_includes_ownerless() {
        let mut world = WorldState::new(5, 1024.0, 768.0);
        let ghost = Uuid::new_v4();
        let id = world.spawn_projectile(ghost, 3.0, 4.0, 0.0);

        let ServerMsg::ProjectilesUpdate { projectiles } = SnapshotBuilder::projectiles(&world) else {
            panic!("expected projectiles-update");
        };

        assert_eq!(projectiles[&id].player_id, ghost);
        assert_eq!(projectiles[&id].velocity, Vec2 { x: 5.0, y: 0.0 });
    }
}
