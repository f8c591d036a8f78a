use crate::error::EngineError;

/// Player eye on the grid: position plus the forward vector and the camera plane.
///
/// `plane` spans half the horizontal field of view and stays perpendicular to
/// `dir` because both are always rotated together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: [f64; 2],   // (x, y) in cell units
    pub dir: [f64; 2],   // facing direction
    pub plane: [f64; 2], // half-FOV span, perpendicular to dir
}

// Largest |cos| allowed between dir and plane at startup.
const PERPENDICULAR_TOLERANCE: f64 = 1e-6;

impl Camera {
    pub fn new(pos: [f64; 2], dir: [f64; 2], plane: [f64; 2]) -> Result<Self, EngineError> {
        let camera = Self { pos, dir, plane };
        camera.validate()?;
        Ok(camera)
    }

    /// Finite components, non-zero `dir` and `plane`, and a perpendicular basis.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (field, v) in [
            ("position", self.pos),
            ("direction", self.dir),
            ("plane", self.plane),
        ] {
            if !v[0].is_finite() || !v[1].is_finite() {
                return Err(EngineError::NonFiniteCamera { field });
            }
        }
        if self.dir == [0.0, 0.0] {
            return Err(EngineError::DegenerateDirection);
        }
        if self.plane == [0.0, 0.0] {
            return Err(EngineError::DegeneratePlane);
        }
        let dot = self.dir[0] * self.plane[0] + self.dir[1] * self.plane[1];
        if dot.abs() > PERPENDICULAR_TOLERANCE * length(self.dir) * length(self.plane) {
            return Err(EngineError::NonPerpendicularPlane { dot });
        }
        Ok(())
    }

    /// Rotate `dir` and `plane` by the same signed angle (radians, CCW positive).
    #[inline]
    pub fn rotate(&mut self, angle: f64) {
        let (s, c) = angle.sin_cos();
        self.dir = rotate2(self.dir, c, s);
        self.plane = rotate2(self.plane, c, s);
    }

    /// Direction of the ray through screen column `x` of `width`.
    #[inline]
    pub fn ray_dir(&self, x: usize, width: usize) -> [f64; 2] {
        // -1 at the left edge, 0 at the center
        let camera_x = 2.0 * x as f64 / width as f64 - 1.0;
        [
            self.dir[0] + self.plane[0] * camera_x,
            self.dir[1] + self.plane[1] * camera_x,
        ]
    }

    /// Rebuild the plane for a horizontal field of view, keeping its handedness.
    pub fn set_fov_from_horizontal(&mut self, fov_x_deg: f64) {
        let half = 0.5 * fov_x_deg.to_radians();
        let len = length(self.dir) * half.tan();
        self.plane = scale(self.plane_axis(), len);
    }

    /// Undo rotation drift: unit `dir`, `plane` exactly perpendicular with its old length.
    ///
    /// Rendering never calls this on its own; the default frame loop lets the
    /// basis drift.
    pub fn renormalize(&mut self) {
        let dir_len = length(self.dir);
        let plane_len = length(self.plane);
        self.dir = scale(self.dir, 1.0 / dir_len);
        self.plane = scale(self.plane_axis(), plane_len);
    }

    #[cfg(test)]
    pub fn dir_dot_plane(&self) -> f64 {
        self.dir[0] * self.plane[0] + self.dir[1] * self.plane[1]
    }

    // Unit vector perpendicular to dir, on the same side as the current plane.
    fn plane_axis(&self) -> [f64; 2] {
        let len = length(self.dir);
        let [dx, dy] = [self.dir[0] / len, self.dir[1] / len];
        let cross = self.dir[0] * self.plane[1] - self.dir[1] * self.plane[0];
        if cross < 0.0 { [dy, -dx] } else { [-dy, dx] }
    }
}

#[inline]
fn rotate2(v: [f64; 2], c: f64, s: f64) -> [f64; 2] {
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

#[inline]
fn length(v: [f64; 2]) -> f64 {
    v[0].hypot(v[1])
}

#[inline]
fn scale(v: [f64; 2], k: f64) -> [f64; 2] {
    [v[0] * k, v[1] * k]
}
