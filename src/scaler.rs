use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::config::Filter;

/// Precomputed mapping from window pixels to framebuffer neighbors + weights
pub struct ScaleLut {
    x0: Vec<usize>,
    x1: Vec<usize>,
    wx: Vec<u16>,
    y0: Vec<usize>,
    y1: Vec<usize>,
    wy: Vec<u16>,
    filter: Filter,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            x0: Vec::new(),
            x1: Vec::new(),
            wx: Vec::new(),
            y0: Vec::new(),
            y1: Vec::new(),
            wy: Vec::new(),
            filter: Filter::Nearest,
        }
    }

    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize, filter: Filter) -> Self {
        let (x0, x1, wx) = axis(dst_w, src_w, filter);
        let (y0, y1, wy) = axis(dst_h, src_h, filter);
        Self {
            x0,
            x1,
            wx,
            y0,
            y1,
            wy,
            filter,
        }
    }

    /// Window size this table was built for.
    pub fn dst_size(&self) -> (usize, usize) {
        (self.x0.len(), self.y0.len())
    }
}

// One axis of the table: left/right source index and the 8.8 weight of the right one.
fn axis(dst: usize, src: usize, filter: Filter) -> (Vec<usize>, Vec<usize>, Vec<u16>) {
    let mut i0 = vec![0; dst];
    let mut i1 = vec![0; dst];
    let mut w = vec![0; dst];
    let scale = src as f32 / dst as f32;
    let last = src.saturating_sub(1);

    for d in 0..dst {
        match filter {
            Filter::Nearest => {
                // sample at pixel centers so edge columns are not duplicated
                let s = (((d as f32 + 0.5) * scale) as usize).min(last);
                i0[d] = s;
                i1[d] = s;
            }
            Filter::Bilinear => {
                let f = d as f32 * scale;
                let s0 = (f.floor() as usize).min(last);
                i0[d] = s0;
                i1[d] = (s0 + 1).min(last);
                w[d] = ((f - s0 as f32) * 256.0).round().min(256.0) as u16;
            }
        }
    }
    (i0, i1, w)
}

#[inline]
fn lerp_color_u32(a: u32, b: u32, w256: u32) -> u32 {
    // w256 in [0, 256]; inv = 256 - w256
    let inv = 256 - w256;
    // R and B together (00RR00BB), G separately (0000GG00)
    let rb = ((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8 & 0x00FF00FF;
    let g = ((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8 & 0x0000FF00;
    rb | g
}

/// Stretch `src` (width `sw`) over `dst` (width `dw`), rows in parallel.
///
/// `lut` must have been built for these sizes.
pub fn blit_stretch(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    match lut.filter {
        Filter::Nearest => dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
            let row = lut.y0[y] * sw;
            for (x, px) in dst_row.iter_mut().enumerate() {
                *px = src[row + lut.x0[x]];
            }
        }),
        Filter::Bilinear => dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
            let row0 = lut.y0[y] * sw;
            let row1 = lut.y1[y] * sw;
            let wy = lut.wy[y] as u32;

            for (x, px) in dst_row.iter_mut().enumerate() {
                let (x0, x1) = (lut.x0[x], lut.x1[x]);
                let wx = lut.wx[x] as u32;

                let top = lerp_color_u32(src[row0 + x0], src[row0 + x1], wx);
                let bot = lerp_color_u32(src[row1 + x0], src[row1 + x1], wx);
                *px = lerp_color_u32(top, bot, wy);
            }
        }),
    }
}
