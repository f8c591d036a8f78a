use crate::{camera::Camera, error::EngineError, world::World};

// Stand-in for 1/0 on an axis the ray never crosses. Finite so that
// `0 * DELTA_INF` stays 0 instead of NaN.
const DELTA_INF: f64 = 1e30;

/// Which family of grid lines the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Vertical grid line (x changed). Shaded darker.
    X,
    /// Horizontal grid line (y changed).
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub map: [i32; 2],
    pub code: u8,
    pub side: Side,
    /// Distance along the camera's forward axis, not the Euclidean ray length.
    pub perp_dist: f64,
}

/// Cell where a ray walked off the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Escape {
    pub map: [i32; 2],
}

#[inline]
fn delta_dist(component: f64) -> f64 {
    if component == 0.0 {
        DELTA_INF
    } else {
        (1.0 / component).abs()
    }
}

/// Walk the grid from `pos` along `ray_dir` until a wall cell is entered (DDA).
///
/// The starting cell itself is never tested. Ties between the two axes advance
/// Y. A map with a closed border always stops the walk; otherwise the ray
/// escapes and the cell it tried to enter is returned.
pub fn cast(world: &World, pos: [f64; 2], ray_dir: [f64; 2]) -> Result<Hit, Escape> {
    let mut map_x = pos[0].floor() as i32;
    let mut map_y = pos[1].floor() as i32;

    let delta_x = delta_dist(ray_dir[0]);
    let delta_y = delta_dist(ray_dir[1]);

    let (step_x, mut side_x) = if ray_dir[0] < 0.0 {
        (-1, (pos[0] - map_x as f64) * delta_x)
    } else {
        (1, (map_x as f64 + 1.0 - pos[0]) * delta_x)
    };
    let (step_y, mut side_y) = if ray_dir[1] < 0.0 {
        (-1, (pos[1] - map_y as f64) * delta_y)
    } else {
        (1, (map_y as f64 + 1.0 - pos[1]) * delta_y)
    };

    loop {
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_y += delta_y;
            map_y += step_y;
            Side::Y
        };

        let code = match world.cell(map_x, map_y) {
            Some(code) => code,
            None => return Err(Escape { map: [map_x, map_y] }),
        };
        if code > 0 {
            // side distances were already advanced past the wall
            let perp_dist = match side {
                Side::X => side_x - delta_x,
                Side::Y => side_y - delta_y,
            };
            return Ok(Hit {
                map: [map_x, map_y],
                code,
                side,
                perp_dist,
            });
        }
    }
}

/// Cast the ray for screen column `x` of a `width`-wide viewport.
pub fn cast_column(
    world: &World,
    camera: &Camera,
    x: usize,
    width: usize,
) -> Result<Hit, EngineError> {
    let ray_dir = camera.ray_dir(x, width);
    cast(world, camera.pos, ray_dir).map_err(|escape| {
        debug_assert!(false, "ray for column {x} escaped at {:?}", escape.map);
        EngineError::RayEscaped {
            column: x,
            x: escape.map[0],
            y: escape.map[1],
        }
    })
}
