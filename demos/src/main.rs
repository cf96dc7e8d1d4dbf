// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad + narrow phase: `SpatialWorld` culling + `kurbo` exact tests.
//!
//! A small world of resource nodes is generated, a camera view pulls draw
//! candidates, and a player gathers everything within reach. The world is
//! then regenerated from scratch.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p proximity_grid_demos`

use kurbo::{Circle, Point, Rect};
use proximity_grid::geom::circle_overlaps_aabb;
use proximity_grid::{Aabb2D, GridConfig, GridError, Key, SpatialWorld};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resource {
    Tree,
    Rock,
    Bush,
}

impl Resource {
    fn extent(self) -> f64 {
        match self {
            Self::Tree => 24.0,
            Self::Rock => 16.0,
            Self::Bush => 10.0,
        }
    }
}

/// Place resources on a jittered lattice so runs are reproducible.
fn generate(world: &mut SpatialWorld<f64, Resource>, seed: u64, columns: u32) {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    for row in 0..columns {
        for col in 0..columns {
            let kind = match next() % 3 {
                0 => Resource::Tree,
                1 => Resource::Rock,
                _ => Resource::Bush,
            };
            let jitter_x = (next() % 40) as f64;
            let jitter_y = (next() % 40) as f64;
            let origin = Point::new(f64::from(col) * 60.0 + jitter_x, f64::from(row) * 60.0 + jitter_y);
            let size = kind.extent();
            world.insert(Aabb2D::from_xywh(origin.x, origin.y, size, size), kind);
        }
    }
}

fn gather(world: &mut SpatialWorld<f64, Resource>, reach: Circle) -> Vec<Resource> {
    let in_reach: Vec<Key> = world
        .query_circle(reach.center.x, reach.center.y, reach.radius)
        .into_iter()
        .filter(|(key, _)| {
            world
                .bounds(*key)
                .is_some_and(|b| circle_overlaps_aabb(&reach, &b))
        })
        .map(|(key, _)| key)
        .collect();
    in_reach
        .into_iter()
        .filter_map(|key| world.remove(key))
        .collect()
}

fn main() -> Result<(), GridError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = GridConfig::for_object_extent(Resource::Tree.extent());
    let mut world = SpatialWorld::new(config)?;
    generate(&mut world, 42, 80);

    let stats = world.grid().stats();
    info!(
        objects = stats.tracked_objects,
        active_cells = stats.active_cells,
        mean_occupancy = stats.mean_occupancy(),
        max_occupancy = stats.max_cell_occupancy,
        "world generated"
    );

    let view = Rect::from_origin_size((1200.0, 900.0), (640.0, 360.0));
    let draw_list = world.grid().query_rect_shape(view);
    let view_box = Aabb2D::from(view);
    let visible = draw_list
        .iter()
        .filter(|&&key| world.bounds(key).is_some_and(|b| b.overlaps(&view_box)))
        .count();
    info!(candidates = draw_list.len(), visible, "camera view culled");

    let player = Point::new(1500.0, 1100.0);
    let gathered = gather(&mut world, Circle::new(player, 90.0));
    info!(count = gathered.len(), ?gathered, "gathered resources");
    world.grid().check_invariants()?;

    world.clear();
    generate(&mut world, 7, 40);
    info!(objects = world.len(), "world regenerated");
    Ok(())
}
