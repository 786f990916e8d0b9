//! Spinning cube demo application
//!
//! Drives the full render surface lifecycle end to end: configuration,
//! window and program construction, the per-frame protocol and a drawable
//! with a material. The demo runs on the headless backend, so it works
//! anywhere and reports the recorded context traffic when it finishes.

use std::time::Instant;

use surface_engine::config::Config;
use surface_engine::foundation::math::{Mat4, Mat4Ext, Vec3};
use surface_engine::render::{
    Camera, Drawable, HeadlessSystem, ProgramHandle, RenderContext, RenderSurface, SurfaceConfig,
    SurfaceError, SurfaceMaterial,
};

/// Uniform the cube uploads for its own placement each draw
const MODEL_UNIFORM: &str = "model";

/// Optional configuration file next to the demo's shaders
const CONFIG_PATH: &str = "cube_app/config.toml";

/// Frames to render before the demo closes itself; the headless backend
/// never delivers a real close event
const FRAME_BUDGET: u32 = 120;

/// One revolution every eight seconds
const ANGULAR_VELOCITY: f32 = std::f32::consts::PI / 4.0;

/// The cube and its surface properties
struct CubeDrawable {
    material: SurfaceMaterial,
    rotation: f32,
}

impl CubeDrawable {
    fn new() -> Self {
        Self {
            // Untextured: both maps disabled, lit by the scalar terms only.
            material: SurfaceMaterial::new(None, None, 32.0).with_ambient_coefficient(0.1),
            rotation: 0.0,
        }
    }

    fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }
}

impl Drawable for CubeDrawable {
    fn draw(&mut self, context: &mut dyn RenderContext, program: ProgramHandle) {
        // Spin around Y with a fixed tilt so three faces stay visible.
        let model = Mat4::rotation_y(self.rotation) * Mat4::rotation_x(0.4);
        context.set_uniform_mat4(program, MODEL_UNIFORM, &model);
        self.material.bind(context, program);
    }
}

struct CubeApp {
    system: HeadlessSystem,
    surface: RenderSurface,
    camera: Camera,
    cube: CubeDrawable,
    start_time: Instant,
}

impl CubeApp {
    fn new(config: &SurfaceConfig) -> Result<Self, SurfaceError> {
        let mut system = HeadlessSystem::new();
        let surface = RenderSurface::new(&mut system, config)?;

        let camera = Camera::new(
            Vec3::new(2.0, 2.0, 5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );

        Ok(Self {
            system,
            surface,
            camera,
            cube: CubeDrawable::new(),
            start_time: Instant::now(),
        })
    }

    fn run(&mut self) {
        log::info!("Rendering {FRAME_BUDGET} frames...");
        let mut frames_rendered = 0;

        while self.surface.is_running() {
            self.surface.poll_events();

            let elapsed = self.start_time.elapsed().as_secs_f32();
            self.cube.set_rotation(elapsed * ANGULAR_VELOCITY);

            self.surface.begin_frame(&self.camera);
            self.surface.draw(&mut self.cube);
            self.surface.end_frame();

            frames_rendered += 1;
            if frames_rendered >= FRAME_BUDGET {
                self.system.request_close();
            }
        }

        log::info!(
            "Demo finished: {} frames, {} context operations recorded",
            frames_rendered,
            self.system.ops().len()
        );
    }
}

/// Load the demo configuration, falling back to built-in defaults
fn load_config() -> SurfaceConfig {
    match SurfaceConfig::load_from_file(CONFIG_PATH) {
        Ok(config) => {
            log::info!("Loaded configuration from {CONFIG_PATH}");
            config
        }
        Err(err) => {
            log::debug!("No configuration at {CONFIG_PATH} ({err}), using defaults");
            SurfaceConfig::new("cube_app/shaders/cube.vert", "cube_app/shaders/cube.frag")
                .with_title("Spinning Cube")
                .with_clear_color([0.1, 0.1, 0.15, 1.0])
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting spinning cube demo");

    let config = load_config();
    if let Err(message) = config.validate() {
        log::error!("Invalid configuration: {message}");
        return Err(message.into());
    }

    let mut app = CubeApp::new(&config)?;
    app.run();

    log::info!("Spinning cube demo finished");
    Ok(())
}
