//! Square falloff mask for island-shaped terrain.

use glam::Vec2;

use crate::heightfield::{HeightGrid, GRID_SIZE};

/// Build the falloff mask for a full-size tile. See [`falloff_sized`].
pub fn falloff(shape: Vec2) -> HeightGrid {
    falloff_sized(GRID_SIZE, shape)
}

/// Attenuation grid that is 0 at the center and rises to 1 at the border.
///
/// Each cell maps to `[-1, 1]` on both axes, `v = max(|x|, |y|)` (square distance from
/// the center), and the value is `v^a / (v^a + (b - b*v)^a)` for `shape = (a, b)`.
/// `a` controls the steepness, `b` shifts the transition outward. A zero shape means
/// no falloff and yields an all-zero grid.
pub fn falloff_sized(size: usize, shape: Vec2) -> HeightGrid {
    if shape == Vec2::ZERO || size == 0 {
        return HeightGrid::zeros(size);
    }

    let (a, b) = (shape.x, shape.y);
    let last = (size.max(2) - 1) as f32;
    let mut grid = HeightGrid::zeros(size);

    for y in 0..size {
        for x in 0..size {
            let nx = x as f32 / last * 2.0 - 1.0;
            let ny = y as f32 / last * 2.0 - 1.0;
            let v = nx.abs().max(ny.abs());

            let near = v.powf(a);
            let far = (b - b * v).powf(a);
            let value = if near + far > 0.0 { near / (near + far) } else { 0.0 };
            grid.set(x, y, value);
        }
    }

    grid
}
