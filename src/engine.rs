use crate::{
    camera::Camera,
    config::Settings,
    error::EngineError,
    motion::{self, Intents, MotionConfig},
    renderer::{self, Framebuffer},
    world::{Spawn, World},
};

/// Per-session render context: the grid, the camera and the frame it draws into.
pub struct Engine {
    world: World,
    camera: Camera,
    motion: MotionConfig,
    framebuffer: Framebuffer,
    renormalize: bool,
}

impl Engine {
    /// Load the map and check every startup precondition once.
    pub fn new(settings: &Settings) -> Result<Self, EngineError> {
        let (world, spawn) = match &settings.map {
            Some(path) => World::load(path)?,
            None => (World::demo(), Spawn::default()),
        };
        Self::with_world(world, spawn, settings)
    }

    pub fn with_world(world: World, spawn: Spawn, settings: &Settings) -> Result<Self, EngineError> {
        let framebuffer = Framebuffer::new(settings.width, settings.height)?;
        world.check_closed_border()?;

        check_motion(&settings.motion)?;

        let mut camera = Camera::new(spawn.pos, spawn.dir, spawn.plane)?;
        if let Some(fov) = settings.fov_deg {
            if !(fov.is_finite() && fov > 0.0 && fov < 180.0) {
                return Err(EngineError::InvalidFov { fov });
            }
            camera.set_fov_from_horizontal(fov);
            camera.validate()?;
        }
        if !world.is_passable(camera.pos[0].floor() as i32, camera.pos[1].floor() as i32) {
            return Err(EngineError::SpawnBlocked {
                x: camera.pos[0],
                y: camera.pos[1],
            });
        }

        Ok(Self {
            world,
            camera,
            motion: settings.motion,
            framebuffer,
            renormalize: settings.renormalize,
        })
    }

    /// Move the camera for `dt` seconds, then raycast the whole frame.
    pub fn frame(&mut self, intents: Intents, dt: f64) -> Result<(), EngineError> {
        motion::integrate(&mut self.camera, &self.world, intents, &self.motion, dt);
        if self.renormalize {
            self.camera.renormalize();
        }
        renderer::render_frame(&mut self.framebuffer, &self.world, &self.camera)
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }
}

fn check_motion(motion: &MotionConfig) -> Result<(), EngineError> {
    for (name, value) in [("move rate", motion.move_rate), ("rotation rate", motion.rot_rate)] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidRate { name, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::Rgb;
    use crate::world::tests::walled;

    fn small() -> Settings {
        Settings {
            width: 32,
            height: 24,
            ..Settings::default()
        }
    }

    #[test]
    fn demo_engine_renders_a_frame() {
        let mut engine = Engine::new(&small()).unwrap();
        engine.frame(Intents::default(), 0.016).unwrap();

        let fb = engine.framebuffer();
        // the horizon row is always covered by a wall slice
        let mid = fb.height() / 2;
        assert!((0..fb.width()).all(|x| fb.pixel(x, mid) != Rgb::BLACK.pack()));
    }

    #[test]
    fn open_border_fails_at_startup() {
        let mut columns = walled(6, 6);
        columns[0][3] = 0;
        let world = World::from_columns(columns).unwrap();
        let spawn = Spawn {
            pos: [2.5, 2.5],
            ..Spawn::default()
        };
        assert!(matches!(
            Engine::with_world(world, spawn, &small()),
            Err(EngineError::OpenBorder { x: 0, y: 3 })
        ));
    }

    #[test]
    fn spawn_inside_wall_fails_at_startup() {
        let world = World::from_columns(walled(6, 6)).unwrap();
        let spawn = Spawn {
            pos: [0.5, 2.5],
            ..Spawn::default()
        };
        assert!(matches!(
            Engine::with_world(world, spawn, &small()),
            Err(EngineError::SpawnBlocked { .. })
        ));
    }

    #[test]
    fn degenerate_direction_fails_at_startup() {
        let world = World::from_columns(walled(6, 6)).unwrap();
        let spawn = Spawn {
            pos: [2.5, 2.5],
            dir: [0.0, 0.0],
            plane: [0.0, 0.66],
        };
        assert!(matches!(
            Engine::with_world(world, spawn, &small()),
            Err(EngineError::DegenerateDirection)
        ));
    }

    #[test]
    fn parallel_spawn_plane_fails_at_startup() {
        let world = World::from_columns(walled(8, 8)).unwrap();
        let spawn = Spawn {
            pos: [4.5, 4.5],
            dir: [-1.0, 0.0],
            plane: [0.66, 0.0],
        };
        assert!(matches!(
            Engine::with_world(world, spawn, &small()),
            Err(EngineError::NonPerpendicularPlane { .. })
        ));
    }

    #[test]
    fn bad_fov_fails_at_startup() {
        for fov in [f64::NAN, f64::INFINITY, 0.0, -30.0, 180.0, 270.0] {
            let settings = Settings {
                fov_deg: Some(fov),
                ..small()
            };
            assert!(
                matches!(Engine::new(&settings), Err(EngineError::InvalidFov { .. })),
                "fov {fov} accepted"
            );
        }
    }

    #[test]
    fn bad_rates_fail_at_startup() {
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let moving = Settings {
                motion: MotionConfig {
                    move_rate: bad,
                    ..MotionConfig::default()
                },
                ..small()
            };
            assert!(matches!(
                Engine::new(&moving),
                Err(EngineError::InvalidRate { name: "move rate", .. })
            ));

            let turning = Settings {
                motion: MotionConfig {
                    rot_rate: bad,
                    ..MotionConfig::default()
                },
                ..small()
            };
            assert!(matches!(
                Engine::new(&turning),
                Err(EngineError::InvalidRate { name: "rotation rate", .. })
            ));
        }
    }

    #[test]
    fn frame_moves_camera_before_drawing() {
        let mut engine = Engine::new(&small()).unwrap();
        let forward = Intents {
            forward: true,
            ..Intents::default()
        };
        engine.frame(forward, 0.1).unwrap();
        assert!((engine.camera().pos[0] - 21.5).abs() < 1e-9);
    }

    #[test]
    fn fov_setting_rebuilds_plane() {
        let settings = Settings {
            fov_deg: Some(90.0),
            ..small()
        };
        let engine = Engine::new(&settings).unwrap();
        assert!((engine.camera().plane[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn renormalize_keeps_unit_direction() {
        let settings = Settings {
            renormalize: true,
            ..small()
        };
        let mut engine = Engine::new(&settings).unwrap();
        let turn = Intents {
            rotate_left: true,
            ..Intents::default()
        };
        for _ in 0..500 {
            engine.frame(turn, 0.016).unwrap();
        }
        let d = engine.camera().dir;
        assert!((d[0].hypot(d[1]) - 1.0).abs() < 1e-12);
    }
}
