use crate::raycaster::{Hit, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel, truncating toward zero.
    #[inline]
    pub fn scaled(self, k: f64) -> Self {
        let ch = |c: u8| (c as f64 * k) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }

    /// `0x00RRGGBB`, the pixel layout softbuffer expects.
    #[inline]
    pub fn pack(self) -> u32 {
        (self.b as u32) | ((self.g as u32) << 8) | ((self.r as u32) << 16)
    }
}

/// Brightness kept on faces crossed through a vertical grid line.
pub const X_SIDE_SHADE: f64 = 0.6;

/// Base color for a wall code. Codes past the palette fall back to white.
pub fn wall_color(code: u8) -> Rgb {
    match code {
        1 => Rgb::RED,
        2 => Rgb::BLUE,
        3 => Rgb::GREEN,
        4 => Rgb::YELLOW,
        0 => Rgb::BLACK,
        _ => Rgb::WHITE,
    }
}

#[inline]
pub fn shade(color: Rgb, side: Side) -> Rgb {
    match side {
        Side::X => color.scaled(X_SIDE_SHADE),
        Side::Y => color,
    }
}

/// One vertical wall slice, rows inclusive and inside `[0, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub x: usize,
    pub start: i32,
    pub end: i32,
    pub color: Rgb,
}

/// Turn a hit into the slice drawn at screen column `x`.
///
/// The slice height is `height / perp_dist` truncated toward zero. A zero
/// distance (camera on the wall face) saturates to a full-height slice.
pub fn project(hit: &Hit, x: usize, height: usize) -> Column {
    let h = height as i32;
    // `as` saturates on overflow and maps +inf to i32::MAX
    let line_height = (height as f64 / hit.perp_dist) as i32;

    let start = (h / 2 - line_height / 2).max(0);
    let end = (line_height / 2).saturating_add(h / 2).min(h - 1);

    Column {
        x,
        start,
        end,
        color: shade(wall_color(hit.code), hit.side),
    }
}
