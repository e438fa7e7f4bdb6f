//! Combat system - projectiles and hit detection

use uuid::Uuid;

use super::physics::PhysicsSystem;
use super::{PROJECTILE_RADIUS, PROJECTILE_SPEED};

/// Active projectile in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u64,
    /// Player credited with the shot. May no longer exist.
    pub owner_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub radius: f64,
}

impl Projectile {
    /// Create a new projectile travelling along `angle` (radians)
    pub fn new(id: u64, owner_id: Uuid, x: f64, y: f64, angle: f64) -> Self {
        Self {
            id,
            owner_id,
            x,
            y,
            vel_x: angle.cos() * PROJECTILE_SPEED,
            vel_y: angle.sin() * PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
        }
    }

    /// Advance by one tick of velocity
    pub fn advance(&mut self) {
        self.x += self.vel_x;
        self.y += self.vel_y;
    }

    /// True once the projectile has fully left a `width x height` area.
    /// Touching an edge does not count.
    pub fn is_outside(&self, width: f64, height: f64) -> bool {
        self.x - self.radius >= width
            || self.x + self.radius <= 0.0
            || self.y - self.radius >= height
            || self.y + self.radius <= 0.0
    }

    /// Check collision with a target circle
    pub fn check_hit(&self, target_x: f64, target_y: f64, target_radius: f64) -> bool {
        PhysicsSystem::circles_overlap(self.x, self.y, self.radius, target_x, target_y, target_radius)
    }
}

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub projectile_id: u64,
    pub shooter_id: Uuid,
    pub target_id: Uuid,
    /// Whether the shooter still existed and received the point
    pub shooter_credited: bool,
}
