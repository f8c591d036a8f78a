use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{Args, Settings};
use crate::engine::Engine;
use crate::motion::{FrameClock, Intents};
use crate::scaler::{ScaleLut, blit_stretch};

mod camera;
mod config;
mod engine;
mod error;
mod motion;
mod projector;
mod raycaster;
mod renderer;
mod scaler;
mod world;

/// Physical keys feeding each movement intent.
struct KeyBindings {
    forward: [KeyCode; 2],
    backward: [KeyCode; 2],
    rotate_left: [KeyCode; 2],
    rotate_right: [KeyCode; 2],
    quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: [KeyCode::KeyW, KeyCode::ArrowUp],
            backward: [KeyCode::KeyS, KeyCode::ArrowDown],
            rotate_left: [KeyCode::KeyA, KeyCode::ArrowLeft],
            rotate_right: [KeyCode::KeyD, KeyCode::ArrowRight],
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    fn intents(&self, keys_down: &HashSet<KeyCode>) -> Intents {
        let any = |keys: &[KeyCode; 2]| keys.iter().any(|k| keys_down.contains(k));
        Intents {
            forward: any(&self.forward),
            backward: any(&self.backward),
            rotate_left: any(&self.rotate_left),
            rotate_right: any(&self.rotate_right),
        }
    }
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    engine: Engine,
    settings: Settings,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    scale_lut: ScaleLut,

    // Input and timing
    keys_down: HashSet<KeyCode>,
    bindings: KeyBindings,
    clock: FrameClock,

    // First fatal error; ends the event loop
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(engine: Engine, settings: Settings) -> Self {
        Self {
            window: None,
            surface: None,
            engine,
            frame_counter: 0,
            last_fps_print: Instant::now(),
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            bindings: KeyBindings::default(),
            clock: FrameClock::new(settings.max_dt),
            settings,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        eprintln!("fatal: {err:#}");
        self.fatal.get_or_insert(err);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (w, h) = self.settings.window_size;
        let attributes = Window::default_attributes()
            .with_title("gridcaster")
            .with_inner_size(LogicalSize::new(w, h));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        let context =
            softbuffer::Context::new(window.clone()).map_err(|e| anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("softbuffer surface: {e}"))?;

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.clock.reset();
        Ok(())
    }

    /// One full frame: input, motion + raycast, stretch, present.
    fn redraw(&mut self, id: WindowId) -> Result<()> {
        let dt = self.clock.tick();
        let intents = self.bindings.intents(&self.keys_down);
        self.engine.frame(intents, dt).context("frame failed")?;

        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        let (dw_us, dh_us) = (dw.get() as usize, dh.get() as usize);

        surface
            .resize(dw, dh)
            .map_err(|e| anyhow!("surface resize: {e}"))?;

        let fb = self.engine.framebuffer();
        if self.scale_lut.dst_size() != (dw_us, dh_us) {
            self.scale_lut = ScaleLut::new(dw_us, dh_us, fb.width(), fb.height(), self.settings.filter);
        }

        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow!("surface buffer: {e}"))?;
        blit_stretch(&mut buf, dw_us, fb.pixels(), fb.width(), &self.scale_lut);
        buf.present().map_err(|e| anyhow!("present: {e}"))?;

        if self.settings.show_fps {
            self.frame_counter += 1;
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
            if elapsed >= 1.0 {
                println!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
                self.frame_counter = 0;
                self.last_fps_print = now;
            }
        }

        window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                println!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == self.bindings.quit => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::Focused(false) => self.keys_down.clear(),

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(id) {
                    self.fail(event_loop, err);
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let settings = Settings::from(Args::parse());
    let engine = Engine::new(&settings).context("failed to start the raycaster")?;
    let cam = engine.camera();
    println!(
        "Map {}x{}, camera at ({:.2}, {:.2}) facing ({:.2}, {:.2})",
        engine.world().width(),
        engine.world().height(),
        cam.pos[0],
        cam.pos[1],
        cam.dir[0],
        cam.dir[1],
    );

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    // Frames are driven continuously; motion depends on wall-clock time.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(engine, settings);
    event_loop.run_app(&mut app).context("event loop failed")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
