use crate::{
    camera::Camera,
    error::EngineError,
    projector::{self, Rgb},
    raycaster,
    world::World,
};

pub const BACKGROUND: Rgb = Rgb::BLACK;

/// Anything that can take a background clear and vertical line spans.
pub trait DrawSurface {
    fn size(&self) -> (usize, usize);
    fn clear(&mut self, color: Rgb);
    /// Fill rows `start..=end` of column `x`.
    fn vline(&mut self, x: usize, start: usize, end: usize, color: Rgb);
}

/// Internal render target, one packed `0x00RRGGBB` pixel per cell, row-major.
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidViewport { width, height });
        }
        Ok(Self {
            pixels: vec![0; width * height],
            width,
            height,
        })
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

impl DrawSurface for Framebuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color.pack());
    }

    fn vline(&mut self, x: usize, start: usize, end: usize, color: Rgb) {
        let packed = color.pack();
        let end = end.min(self.height - 1);
        let mut idx = start * self.width + x;
        for _y in start..=end {
            self.pixels[idx] = packed;
            idx += self.width;
        }
    }
}

/// Raycast one full frame onto `surface`, left to right.
pub fn render_frame<S: DrawSurface>(
    surface: &mut S,
    world: &World,
    camera: &Camera,
) -> Result<(), EngineError> {
    let (width, height) = surface.size();
    surface.clear(BACKGROUND);

    for x in 0..width {
        let hit = raycaster::cast_column(world, camera, x, width)?;
        let col = projector::project(&hit, x, height);
        // projector clamps both ends into [0, height)
        surface.vline(col.x, col.start as usize, col.end as usize, col.color);
    }
    Ok(())
}
