//! Projectile simulation for one tick

use uuid::Uuid;

use super::combat::HitResult;
use super::world::WorldState;

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Projectiles moved this tick
    pub advanced: usize,
    /// Projectiles skipped because their owner is gone
    pub frozen: usize,
    /// Projectiles removed for leaving their owner's canvas
    pub expired: Vec<u64>,
    pub hits: Vec<HitResult>,
}

/// Advance every projectile, expire the ones that left their owner's canvas,
/// and resolve hits against players.
///
/// Projectiles whose owner has no player are skipped entirely: they neither
/// move nor expire while the owner is absent.
pub fn run_tick(world: &mut WorldState) -> TickReport {
    let mut report = TickReport::default();

    for projectile_id in world.projectile_ids() {
        let Some(owner_id) = world.projectile(projectile_id).map(|p| p.owner_id) else {
            continue;
        };

        let Some((width, height)) = world
            .player(&owner_id)
            .map(|owner| (owner.canvas_width, owner.canvas_height))
        else {
            report.frozen += 1;
            continue;
        };

        let Some(projectile) = world.projectile_mut(projectile_id) else {
            continue;
        };
        projectile.advance();
        report.advanced += 1;

        if projectile.is_outside(width, height) {
            world.remove_projectile(projectile_id);
            report.expired.push(projectile_id);
            continue;
        }

        if let Some(hit) = resolve_hit(world, projectile_id, owner_id) {
            report.hits.push(hit);
        }
    }

    report
}

/// Find the first player (in join order) the projectile overlaps and apply
/// the kill: credit the owner, drop the projectile and the target.
fn resolve_hit(world: &mut WorldState, projectile_id: u64, owner_id: Uuid) -> Option<HitResult> {
    let projectile = world.projectile(projectile_id)?;

    let target_id = world
        .players()
        .find(|player| {
            projectile.check_hit(player.x, player.y, player.radius) && player.id != owner_id
        })
        .map(|player| player.id)?;

    let shooter_credited = match world.player_mut(&owner_id) {
        Some(owner) => {
            owner.score += 1;
            true
        }
        None => false,
    };

    world.remove_projectile(projectile_id);
    world.remove_player(&target_id);

    Some(HitResult {
        projectile_id,
        shooter_id: owner_id,
        target_id,
        shooter_credited,
    })
}
