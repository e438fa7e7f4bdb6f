//! Input handling - applies move and shoot intents to the world

use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::MoveKey;

use super::physics::PhysicsSystem;
use super::world::WorldState;

/// Apply a movement intent. Returns false when the session has no player.
pub fn handle_move(world: &mut WorldState, session_id: Uuid, key: MoveKey, sequence_number: u64) -> bool {
    let Some(player) = world.player_mut(&session_id) else {
        return false;
    };

    player.sequence_number = sequence_number;
    PhysicsSystem::step_player(player, key);
    true
}

/// Apply a shoot intent. Accepted whether or not the session has a player.
pub fn handle_shoot(world: &mut WorldState, session_id: Uuid, x: f64, y: f64, angle: f64) -> u64 {
    let projectile_id = world.spawn_projectile(session_id, x, y, angle);

    if world.player(&session_id).is_none() {
        debug!(
            session_id = %session_id,
            projectile_id,
            "Shot from session without a player"
        );
    }

    projectile_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::{Player, Viewport};
    use crate::game::PROJECTILE_SPEED;

    fn world_with_player() -> (WorldState, Uuid) {
        let mut world = WorldState::new(3, 1024.0, 768.0);
        let id = Uuid::new_v4();
        world.insert_player(Player::new(
            id,
            "ada".to_string(),
            "hsl(10, 100%, 50%)".to_string(),
            200.0,
            200.0,
            Viewport {
                canvas_width: 1024.0,
                canvas_height: 768.0,
                screen_width: 1024.0,
                screen_height: 768.0,
            },
        ));
        (world, id)
    }

    #[test]
    fn test_move_without_player_is_ignored() {
        let (mut world, _) = world_with_player();
        let before: Vec<Player> = world.players().cloned().collect();

        assert!(!handle_move(&mut world, Uuid::new_v4(), MoveKey::Up, 5));

        let after: Vec<Player> = world.players().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_records_sequence_number() {
        let (mut world, id) = world_with_player();

        assert!(handle_move(&mut world, id, MoveKey::Up, 17));

        let player = world.player(&id).unwrap();
        assert_eq!(player.sequence_number, 17);
        assert_eq!(player.y, 195.0);
    }

    #[test]
    fn test_unrecognized_key_updates_sequence_only() {
        let (mut world, id) = world_with_player();

        handle_move(&mut world, id, MoveKey::Unrecognized, 4);

        let player = world.player(&id).unwrap();
        assert_eq!(player.sequence_number, 4);
        assert_eq!((player.x, player.y), (200.0, 200.0));
    }

    #[test]
    fn test_sequence_number_is_taken_verbatim() {
        let (mut world, id) = world_with_player();

        handle_move(&mut world, id, MoveKey::Left, 10);
        handle_move(&mut world, id, MoveKey::Left, 3);

        assert_eq!(world.player(&id).unwrap().sequence_number, 3);
    }

    #[test]
    fn test_shoot_uses_reported_origin() {
        let (mut world, id) = world_with_player();

        let projectile_id = handle_shoot(&mut world, id, 640.0, 10.0, 0.0);

        let projectile = world.projectile(projectile_id).unwrap();
        assert_eq!(projectile.owner_id, id);
        assert_eq!((projectile.x, projectile.y), (640.0, 10.0));
        assert_eq!((projectile.vel_x, projectile.vel_y), (PROJECTILE_SPEED, 0.0));
    }

    #[test]
    fn test_shoot_without_player_is_recorded() {
        let (mut world, _) = world_with_player();
        let stranger = Uuid::new_v4();

        let first = handle_shoot(&mut world, stranger, 1.0, 1.0, 1.0);
        let second = handle_shoot(&mut world, stranger, 1.0, 1.0, 1.0);

        assert!(second > first);
        assert_eq!(world.projectile_count(), 2);
        assert_eq!(world.projectile(first).unwrap().owner_id, stranger);
    }
}
