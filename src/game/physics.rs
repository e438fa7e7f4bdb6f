//! Player movement and circle collision

use crate::ws::protocol::MoveKey;

use super::world::Player;
use super::PLAYER_SPEED;

/// Physics system for player steps and overlap tests
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Apply one movement step to a player.
    ///
    /// The step itself is clamped against the radius on the way down and
    /// against the player's canvas on the way up. Afterwards all four edges
    /// are re-checked against the player's own screen size, whatever the key.
    pub fn step_player(player: &mut Player, key: MoveKey) {
        let r = player.radius;

        match key {
            MoveKey::Up => player.y = (player.y - PLAYER_SPEED).max(r),
            MoveKey::Left => player.x = (player.x - PLAYER_SPEED).max(r),
            MoveKey::Down => player.y = (player.y + PLAYER_SPEED).min(player.canvas_height - r),
            MoveKey::Right => player.x = (player.x + PLAYER_SPEED).min(player.canvas_width - r),
            MoveKey::Unrecognized => {}
        }

        Self::clamp_to_screen(player);
    }

    /// Pull a player back inside its screen, one edge at a time
    pub fn clamp_to_screen(player: &mut Player) {
        let r = player.radius;

        if player.x - r < 0.0 {
            player.x = r;
        }
        if player.x + r > player.screen_width {
            player.x = player.screen_width - r;
        }
        if player.y - r < 0.0 {
            player.y = r;
        }
        if player.y + r > player.screen_height {
            player.y = player.screen_height - r;
        }
    }

    /// Strict circle overlap: touching circles do not collide
    pub fn circles_overlap(x1: f64, y1: f64, radius1: f64, x2: f64, y2: f64, radius2: f64) -> bool {
        let distance = (x1 - x2).hypot(y1 - y2);
        distance < radius1 + radius2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::Viewport;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn player_at(x: f64, y: f64, canvas: (f64, f64), screen: (f64, f64)) -> Player {
        Player::new(
            Uuid::new_v4(),
            "mover".to_string(),
            "hsl(120, 100%, 50%)".to_string(),
            x,
            y,
            Viewport {
                canvas_width: canvas.0,
                canvas_height: canvas.1,
                screen_width: screen.0,
                screen_height: screen.1,
            },
        )
    }

    #[test]
    fn test_each_key_moves_one_step() {
        let mut p = player_at(100.0, 100.0, (1024.0, 768.0), (1024.0, 768.0));

        PhysicsSystem::step_player(&mut p, MoveKey::Up);
        assert_eq!((p.x, p.y), (100.0, 95.0));
        PhysicsSystem::step_player(&mut p, MoveKey::Left);
        assert_eq!((p.x, p.y), (95.0, 95.0));
        PhysicsSystem::step_player(&mut p, MoveKey::Down);
        assert_eq!((p.x, p.y), (95.0, 100.0));
        PhysicsSystem::step_player(&mut p, MoveKey::Right);
        assert_eq!((p.x, p.y), (100.0, 100.0));
    }

    #[test]
    fn test_lower_bound_is_radius() {
        let mut p = player_at(12.0, 11.0, (1024.0, 768.0), (1024.0, 768.0));

        PhysicsSystem::step_player(&mut p, MoveKey::Left);
        PhysicsSystem::step_player(&mut p, MoveKey::Up);

        assert_eq!(p.x, 10.0);
        assert_eq!(p.y, 10.0);
    }

    #[test]
    fn test_screen_is_the_upper_bound_even_when_canvas_is_larger() {
        let mut p = player_at(785.0, 585.0, (1024.0, 768.0), (800.0, 600.0));

        PhysicsSystem::step_player(&mut p, MoveKey::Right);
        PhysicsSystem::step_player(&mut p, MoveKey::Down);

        assert_eq!(p.x, 790.0);
        assert_eq!(p.y, 590.0);
    }

    #[test]
    fn test_canvas_caps_the_step_when_smaller_than_screen() {
        let mut p = player_at(585.0, 100.0, (600.0, 400.0), (1024.0, 768.0));

        PhysicsSystem::step_player(&mut p, MoveKey::Right);

        assert_eq!(p.x, 590.0);
    }

    #[test]
    fn test_unrecognized_key_still_clamps_to_screen() {
        // Spawned outside a small screen
        let mut p = player_at(900.0, 700.0, (1024.0, 768.0), (640.0, 480.0));

        PhysicsSystem::step_player(&mut p, MoveKey::Unrecognized);

        assert_eq!(p.x, 630.0);
        assert_eq!(p.y, 470.0);
    }

    #[test]
    fn test_random_walk_stays_on_screen() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let keys = [MoveKey::Up, MoveKey::Left, MoveKey::Down, MoveKey::Right, MoveKey::Unrecognized];

        for _ in 0..20 {
            let screen = (rng.gen_range(100.0..1500.0), rng.gen_range(100.0..1000.0));
            let canvas = (rng.gen_range(100.0..1500.0), rng.gen_range(100.0..1000.0));
            let mut p = player_at(rng.gen_range(0.0..1024.0), rng.gen_range(0.0..768.0), canvas, screen);

            for _ in 0..500 {
                let key = keys[rng.gen_range(0..keys.len())];
                PhysicsSystem::step_player(&mut p, key);

                assert!(p.x >= p.radius && p.x <= screen.0 - p.radius, "x = {}", p.x);
                assert!(p.y >= p.radius && p.y <= screen.1 - p.radius, "y = {}", p.y);
            }
        }
    }

    #[test]
    fn test_circles_touching_do_not_overlap() {
        assert!(!PhysicsSystem::circles_overlap(0.0, 0.0, 5.0, 15.0, 0.0, 10.0));
        assert!(PhysicsSystem::circles_overlap(0.0, 0.0, 5.0, 14.5, 0.0, 10.0));
        assert!(PhysicsSystem::circles_overlap(3.0, 4.0, 5.0, 3.0, 4.0, 10.0));
    }
}
