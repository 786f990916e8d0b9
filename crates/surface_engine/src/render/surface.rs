//! Render surface
//!
//! The window component of the scaffold. A [`RenderSurface`] owns the
//! window, the rendering context attached to it and the single shader
//! program everything draws with, tracks the field of view and the
//! projection matrix derived from real framebuffer dimensions, and drives
//! the begin / draw / end frame protocol.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::render::backend::{
    ProgramHandle, RenderContext, WindowBackend, WindowDesc, WindowError, WindowSystem,
    CONTEXT_PROFILE,
};
use crate::render::camera::Camera;
use crate::render::shader::{self, uniforms, ShaderError};

/// Near clipping plane distance for every projection the surface computes
pub const NEAR_PLANE: f32 = 0.1;

/// Far clipping plane distance
pub const FAR_PLANE: f32 = 100.0;

/// Result type for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors that abort surface construction
///
/// Construction either returns a fully usable surface or one of these.
/// Nothing partially initialized escapes, so there is no cleanup for the
/// caller and no retry path.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The windowing backend, window or context could not be brought up
    #[error("Window creation failed: {0}")]
    Window(#[from] WindowError),

    /// The shader program could not be built
    #[error("Shader program creation failed: {0}")]
    Program(#[from] ShaderError),
}

/// Configuration for constructing a [`RenderSurface`]
///
/// One struct replaces a family of constructor overloads; anything not set
/// explicitly keeps the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Window title bar text
    pub title: String,
    /// Requested window width in screen coordinates
    pub width: u32,
    /// Requested window height in screen coordinates
    pub height: u32,
    /// Path to the vertex shader source file
    pub vertex_shader_path: String,
    /// Path to the fragment shader source file
    pub fragment_shader_path: String,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Background clear color [R, G, B, A] (0.0-1.0 range)
    pub clear_color: [f32; 4],
}

impl SurfaceConfig {
    /// Create a configuration with the given shader paths
    pub fn new(
        vertex_shader_path: impl Into<String>,
        fragment_shader_path: impl Into<String>,
    ) -> Self {
        Self {
            title: "OpenGL".to_string(),
            width: 1280,
            height: 720,
            vertex_shader_path: vertex_shader_path.into(),
            fragment_shader_path: fragment_shader_path.into(),
            field_of_view: 45.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the requested window dimensions in screen coordinates
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the vertical field of view in degrees
    pub fn with_field_of_view(mut self, degrees: f32) -> Self {
        self.field_of_view = degrees;
        self
    }

    /// Set the background clear color [R, G, B, A] (0.0-1.0 range)
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Validate the configuration
    ///
    /// Checks that the dimensions and field of view are usable and that
    /// both shader source files exist. Emptiness of the sources is not
    /// checked here; construction reads them and fails properly.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Window dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.field_of_view <= 0.0 || self.field_of_view >= 180.0 {
            return Err(format!(
                "Field of view must lie strictly between 0 and 180 degrees, got {}",
                self.field_of_view
            ));
        }
        if !Path::new(&self.vertex_shader_path).exists() {
            return Err(format!(
                "Vertex shader not found: {}",
                self.vertex_shader_path
            ));
        }
        if !Path::new(&self.fragment_shader_path).exists() {
            return Err(format!(
                "Fragment shader not found: {}",
                self.fragment_shader_path
            ));
        }
        Ok(())
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new("shaders/shader.vert", "shaders/shader.frag")
    }
}

impl Config for SurfaceConfig {}

/// Anything the surface can draw in the middle of a frame
///
/// The surface hands the drawable the live context together with the
/// program activated at frame start; the drawable issues its own uniform
/// uploads, texture binds and draw calls against them.
pub trait Drawable {
    /// Record this object's draws into the open frame
    fn draw(&mut self, context: &mut dyn RenderContext, program: ProgramHandle);
}

/// Window, context and shader program of the scaffold
///
/// The surface owns its window and context exclusively; both are destroyed
/// with it. The camera is not owned: [`RenderSurface::begin_frame`] borrows
/// one per frame to source the `view` matrix.
///
/// # Frame protocol
/// Per frame, in order: [`RenderSurface::begin_frame`] exactly once, then
/// any number of [`RenderSurface::draw`] calls, then
/// [`RenderSurface::end_frame`] exactly once. Ordering violations are
/// caught by debug assertions and undefined rendering in release builds.
pub struct RenderSurface {
    window: Box<dyn WindowBackend>,
    context: Box<dyn RenderContext>,
    program: ProgramHandle,
    field_of_view: f32,
    projection: Mat4,
    frame_open: bool,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("program", &self.program)
            .field("field_of_view", &self.field_of_view)
            .field("projection", &self.projection)
            .field("frame_open", &self.frame_open)
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    /// Open the window, prime the context state and build the shader program
    ///
    /// Steps run in a fixed order: the window system opens the window and
    /// makes its context current; depth testing and the clear color are
    /// enabled; viewport and initial projection come from the framebuffer
    /// size the backend actually allocated; finally both shader stages are
    /// compiled and linked.
    ///
    /// # Errors
    /// Any step failing aborts the whole construction with a
    /// [`SurfaceError`]; a surface with a window but no program cannot be
    /// observed.
    pub fn new(system: &mut dyn WindowSystem, config: &SurfaceConfig) -> SurfaceResult<Self> {
        log::info!(
            "Creating render surface '{}' ({}x{} requested)",
            config.title,
            config.width,
            config.height
        );

        let desc = WindowDesc {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            profile: CONTEXT_PROFILE,
        };
        let (window, mut context) = system.open_window(&desc)?;

        context.enable_depth_test();
        context.set_clear_color(config.clear_color);

        // The framebuffer can be larger than the requested window size
        // under DPI scaling; everything downstream uses the real size.
        let (fb_width, fb_height) = window.framebuffer_size();
        context.set_viewport(fb_width, fb_height);
        let projection = perspective_for(config.field_of_view, fb_width, fb_height);

        let program = shader::build_program(
            context.as_mut(),
            &config.vertex_shader_path,
            &config.fragment_shader_path,
        )?;

        log::info!(
            "Render surface ready: program {:?}, framebuffer {}x{}",
            program,
            fb_width,
            fb_height
        );

        Ok(Self {
            window,
            context,
            program,
            field_of_view: config.field_of_view,
            projection,
            frame_open: false,
        })
    }

    /// Whether the window has not been flagged for closure
    ///
    /// Pure query; the main loop condition.
    pub fn is_running(&self) -> bool {
        !self.window.should_close()
    }

    /// Process pending window system events
    pub fn poll_events(&mut self) {
        self.window.poll_events();
    }

    /// Resize the window and rebuild the dependent context state
    ///
    /// The viewport and projection are recomputed from the framebuffer size
    /// the backend reports after the resize, not from the arguments.
    pub fn update_dimensions(&mut self, width: u32, height: u32) {
        self.window.set_size(width, height);
        let (fb_width, fb_height) = self.window.framebuffer_size();
        self.context.set_viewport(fb_width, fb_height);
        self.projection = perspective_for(self.field_of_view, fb_width, fb_height);
        log::debug!(
            "Surface resized to {}x{} ({}x{} framebuffer)",
            width,
            height,
            fb_width,
            fb_height
        );
    }

    /// Change the vertical field of view, in degrees
    ///
    /// Recomputes the projection against the current framebuffer size. The
    /// viewport is left untouched; only a resize moves it.
    pub fn update_field_of_view(&mut self, degrees: f32) {
        self.field_of_view = degrees;
        let (fb_width, fb_height) = self.window.framebuffer_size();
        self.projection = perspective_for(self.field_of_view, fb_width, fb_height);
        log::debug!("Field of view set to {} degrees", degrees);
    }

    /// Start a frame: activate the program, clear the buffers and upload
    /// the per-frame matrices
    ///
    /// The `view` uniform comes from the borrowed camera, `projection` from
    /// the surface. After this call the caller should only draw until the
    /// frame is finished with [`RenderSurface::end_frame`].
    pub fn begin_frame(&mut self, camera: &Camera) {
        debug_assert!(!self.frame_open, "begin_frame called inside an open frame");
        self.frame_open = true;
        log::trace!("Begin frame: program {:?}", self.program);

        self.context.use_program(self.program);
        self.context.clear_frame();
        self.context
            .set_uniform_mat4(self.program, uniforms::VIEW, &camera.view_matrix());
        self.context
            .set_uniform_mat4(self.program, uniforms::PROJECTION, &self.projection);
    }

    /// Draw one object into the open frame
    ///
    /// Delegates to the drawable with the live context and the program
    /// [`RenderSurface::begin_frame`] activated.
    pub fn draw(&mut self, drawable: &mut dyn Drawable) {
        debug_assert!(self.frame_open, "draw called outside an open frame");
        drawable.draw(self.context.as_mut(), self.program);
    }

    /// Finish the frame and present it
    pub fn end_frame(&mut self) {
        debug_assert!(self.frame_open, "end_frame called without begin_frame");
        self.frame_open = false;
        self.window.swap_buffers();
        log::trace!("End frame");
    }

    /// Handle of the program every frame draws with
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Current projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Current vertical field of view in degrees
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }
}

/// Projection for a field of view in degrees at a framebuffer size in pixels
fn perspective_for(fov_degrees: f32, fb_width: u32, fb_height: u32) -> Mat4 {
    let aspect = fb_width as f32 / fb_height as f32;
    Mat4::perspective(
        utils::deg_to_rad(fov_degrees),
        aspect,
        NEAR_PLANE,
        FAR_PLANE,
    )
}
