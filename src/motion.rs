use std::time::{Duration, Instant};

use crate::{camera::Camera, world::World};

/// Movement wishes sampled once per frame. Any combination may be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    pub move_rate: f64, // cells per second
    pub rot_rate: f64,  // radians per second
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_rate: 5.0,
            rot_rate: 3.0,
        }
    }
}

/// Advance the camera by one frame of `dt` seconds.
///
/// Translation is checked one axis at a time so the camera slides along a
/// wall instead of sticking to it. The y test uses the x that was just
/// accepted.
pub fn integrate(camera: &mut Camera, world: &World, intents: Intents, cfg: &MotionConfig, dt: f64) {
    let move_speed = dt * cfg.move_rate;
    let rot_speed = dt * cfg.rot_rate;

    if intents.forward {
        slide(camera, world, move_speed);
    }
    if intents.backward {
        slide(camera, world, -move_speed);
    }

    if intents.rotate_right {
        camera.rotate(-rot_speed);
    }
    if intents.rotate_left {
        camera.rotate(rot_speed);
    }
}

fn slide(camera: &mut Camera, world: &World, amount: f64) {
    let [dx, dy] = [camera.dir[0] * amount, camera.dir[1] * amount];

    let next_x = camera.pos[0] + dx;
    if world.is_passable(next_x as i32, camera.pos[1] as i32) {
        camera.pos[0] = next_x;
    }
    let next_y = camera.pos[1] + dy;
    if world.is_passable(camera.pos[0] as i32, next_y as i32) {
        camera.pos[1] = next_y;
    }
}

/// Monotonic frame timer handing out clamped deltas in seconds.
pub struct FrameClock {
    last_tick: Instant,
    max_dt: Duration,
}

impl FrameClock {
    pub fn new(max_dt: Duration) -> Self {
        Self {
            last_tick: Instant::now(),
            max_dt,
        }
    }

    /// Restart timing, e.g. once the window becomes visible.
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Seconds since the previous tick, capped at `max_dt`. A `now` earlier than
    /// the previous tick yields 0.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = self.last_tick.max(now);
        dt.min(self.max_dt).as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::walled;

    const EPS: f64 = 1e-9;

    fn open_room() -> World {
        World::from_columns(walled(10, 10)).unwrap()
    }

    fn cfg() -> MotionConfig {
        MotionConfig::default()
    }

    #[test]
    fn forward_moves_along_direction() {
        let world = open_room();
        let mut cam = Camera::new([5.5, 5.5], [-1.0, 0.0], [0.0, 0.66]).unwrap();
        let intents = Intents {
            forward: true,
            ..Intents::default()
        };
        integrate(&mut cam, &world, intents, &cfg(), 0.1);
        assert!((cam.pos[0] - 5.0).abs() < EPS);
        assert!((cam.pos[1] - 5.5).abs() < EPS);
    }

    #[test]
    fn forward_and_backward_cancel() {
        let world = open_room();
        let mut cam = Camera::new([5.5, 5.5], [0.6, 0.8], [-0.528, 0.396]).unwrap();
        let intents = Intents {
            forward: true,
            backward: true,
            ..Intents::default()
        };
        integrate(&mut cam, &world, intents, &cfg(), 0.05);
        assert!((cam.pos[0] - 5.5).abs() < EPS);
        assert!((cam.pos[1] - 5.5).abs() < EPS);
    }

    #[test]
    fn blocked_x_still_slides_along_y() {
        let mut columns = walled(10, 10);
        columns[4][5] = 2;
        let world = World::from_columns(columns).unwrap();

        // heading into the wall at (4, 5) diagonally
        let mut cam = Camera::new([5.1, 5.5], [-0.6, 0.8], [0.528, 0.396]).unwrap();
        let intents = Intents {
            forward: true,
            ..Intents::default()
        };
        integrate(&mut cam, &world, intents, &cfg(), 0.1);

        assert!((cam.pos[0] - 5.1).abs() < EPS, "x must not enter the wall");
        assert!((cam.pos[1] - 5.9).abs() < EPS, "y component still applies");
    }

    #[test]
    fn never_steps_into_a_wall_cell() {
        let world = open_room();
        let mut cam = Camera::new([1.5, 1.5], [-0.7, -0.7], [0.462, -0.462]).unwrap();
        let intents = Intents {
            forward: true,
            ..Intents::default()
        };
        for _ in 0..100 {
            integrate(&mut cam, &world, intents, &cfg(), 0.016);
            assert!(world.is_passable(cam.pos[0] as i32, cam.pos[1] as i32));
        }
    }

    #[test]
    fn left_and_right_in_one_frame_cancel() {
        let world = open_room();
        let mut cam = Camera::new([5.5, 5.5], [-1.0, 0.0], [0.0, 0.66]).unwrap();
        let intents = Intents {
            rotate_left: true,
            rotate_right: true,
            ..Intents::default()
        };
        integrate(&mut cam, &world, intents, &cfg(), 0.02);
        assert!((cam.dir[0] + 1.0).abs() < EPS && cam.dir[1].abs() < EPS);
        assert!(cam.plane[0].abs() < EPS && (cam.plane[1] - 0.66).abs() < EPS);
    }

    #[test]
    fn left_then_right_across_frames_restores_basis() {
        let world = open_room();
        let mut cam = Camera::new([5.5, 5.5], [-1.0, 0.0], [0.0, 0.66]).unwrap();
        let left = Intents {
            rotate_left: true,
            ..Intents::default()
        };
        let right = Intents {
            rotate_right: true,
            ..Intents::default()
        };
        integrate(&mut cam, &world, left, &cfg(), 0.016);
        assert!(cam.dir[1] < 0.0, "left turns counter-clockwise");
        integrate(&mut cam, &world, right, &cfg(), 0.016);
        assert!((cam.dir[0] + 1.0).abs() < EPS && cam.dir[1].abs() < EPS);
        assert!(cam.dir_dot_plane().abs() < EPS);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let world = open_room();
        let mut cam = Camera::new([5.5, 5.5], [-1.0, 0.0], [0.0, 0.66]).unwrap();
        let before = cam;
        let all = Intents {
            forward: true,
            backward: true,
            rotate_left: true,
            rotate_right: true,
        };
        integrate(&mut cam, &world, all, &cfg(), 0.0);
        assert_eq!(cam, before);
    }

    #[test]
    fn clock_caps_long_stalls() {
        let mut clock = FrameClock::new(Duration::from_millis(100));
        let start = clock.last_tick;
        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert!((dt - 0.1).abs() < EPS);
    }

    #[test]
    fn clock_reports_elapsed_seconds() {
        let mut clock = FrameClock::new(Duration::from_millis(100));
        let start = clock.last_tick;
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < EPS);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = FrameClock::new(Duration::from_millis(100));
        let start = clock.last_tick;
        clock.tick_at(start + Duration::from_millis(50));
        let dt = clock.tick_at(start + Duration::from_millis(20));
        assert_eq!(dt, 0.0);
    }
}
