// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the `proximity_grid` benchmarks.

use proximity_grid::Aabb2D;

/// Deterministic scatter of `count` square objects of side `extent` over a
/// `world` × `world` area.
pub fn scatter(count: usize, world: f32, extent: f32) -> Vec<Aabb2D<f32>> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 40) as f32 / (1_u32 << 24) as f32
    };
    (0..count)
        .map(|_| {
            let x = next() * (world - extent);
            let y = next() * (world - extent);
            Aabb2D::from_xywh(x, y, extent, extent)
        })
        .collect()
}
