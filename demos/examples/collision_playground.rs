// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A miniature frame loop driving the collision manager.
//!
//! Builds a walled room, then simulates a player walking into the east wall
//! while a projectile crosses the room and destroys a pickup on impact.
//!
//! Run:
//! - `cargo run -p quadrille_demos --example collision_playground`
//! - `RUST_LOG=debug cargo run -p quadrille_demos --example collision_playground`

use kurbo::{Rect, Vec2};
use quadrille_collision::{CategoryFilter, CollisionManager};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Entity {
    Wall(u16),
    Player,
    Projectile,
    Pickup(u16),
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    Solid,
    Hero,
    Shot,
    Loot,
}

const TILE: f64 = 32.0;
const ROOM: u16 = 12; // tiles per side

fn main() {
    env_logger::init();

    // Cell size ~2-4x the typical object dimension.
    let mut world: CollisionManager<Entity, Kind> = CollisionManager::new(64.0);

    // Border walls of a ROOM x ROOM tile room.
    let mut walls = Vec::new();
    let mut next = 0;
    for i in 0..ROOM {
        for j in 0..ROOM {
            if i != 0 && i != ROOM - 1 && j != 0 && j != ROOM - 1 {
                continue;
            }
            let x = f64::from(i) * TILE;
            let y = f64::from(j) * TILE;
            walls.push((
                Entity::Wall(next),
                Rect::new(x, y, x + TILE, y + TILE),
                Some(Kind::Solid),
            ));
            next += 1;
        }
    }
    world.add_static_objects(walls).expect("room layout is valid");

    world
        .add_dynamic_object(
            Entity::Player,
            Rect::new(64.0, 160.0, 88.0, 184.0),
            Some(Kind::Hero),
        )
        .expect("player spawn is valid");
    world
        .add_dynamic_object(
            Entity::Projectile,
            Rect::new(96.0, 100.0, 104.0, 108.0),
            Some(Kind::Shot),
        )
        .expect("projectile spawn is valid");
    world
        .add_dynamic_object(
            Entity::Pickup(0),
            Rect::new(240.0, 96.0, 256.0, 112.0),
            Some(Kind::Loot),
        )
        .expect("pickup spawn is valid");

    let player_step = Vec2::new(8.0, 0.0);
    let shot_step = Vec2::new(12.0, 0.0);

    for frame in 0..40_u32 {
        // Player walks east until the wall blocks the next step.
        let blocked = world
            .probe_move(Entity::Player, player_step, CategoryFilter::STATIC)
            .expect("player is registered");
        if blocked.is_empty() {
            let bounds = world.bounds_of(Entity::Player).expect("player is registered");
            world
                .update_dynamic_object(Entity::Player, bounds + player_step)
                .expect("player move is valid");
        } else {
            log::info!("frame {frame}: player blocked by {:?}", blocked[0].0);
        }

        // The projectile flies regardless and explodes on anything it hits.
        if world.contains(Entity::Projectile) {
            let bounds = world
                .bounds_of(Entity::Projectile)
                .expect("projectile is registered");
            world
                .update_dynamic_object(Entity::Projectile, bounds + shot_step)
                .expect("projectile move is valid");
            let hits = world
                .collisions(Entity::Projectile, bounds + shot_step)
                .expect("projectile bounds are valid");
            if let Some(&(target, kind)) = hits.first() {
                log::info!("frame {frame}: projectile hit {target:?} ({kind:?})");
                if matches!(kind, Some(Kind::Loot)) {
                    world.remove_object(target);
                }
                world.remove_object(Entity::Projectile);
            }
        }
    }

    let stats = world.stats();
    println!("objects:        {} ({} static, {} dynamic)", stats.object_count, stats.static_count, stats.dynamic_count);
    println!("cells:          {}", stats.cell_count);
    println!("avg per cell:   {:.2}", stats.avg_objects_per_cell);
    println!("memory (est.):  {} bytes", stats.memory_estimate);
    println!(
        "queries:        {} ({} with hits)",
        world.collision_checks(),
        world.collision_hits()
    );
}
