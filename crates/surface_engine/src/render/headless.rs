//! Headless window and context backend
//!
//! An in-memory implementation of the backend traits that records every
//! window and context operation into a shared trace. Tests drive the full
//! surface lifecycle against it and assert on the trace; scripted failures
//! cover the paths a real backend only hits on broken drivers or missing
//! displays. The demo binary runs on it too, so the scaffold works without
//! a display server.
//!
//! Everything is single-threaded by design, matching the one-thread
//! ownership model of the backend traits, so the shared state is plain
//! `Rc` + `RefCell`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::foundation::math::Mat4;
use crate::render::backend::{
    ProgramHandle, RenderContext, ShaderHandle, ShaderStage, TextureHandle, TextureUnit,
    WindowBackend, WindowDesc, WindowError, WindowResult, WindowSystem,
};

/// One recorded window or context operation
#[derive(Debug, Clone, PartialEq)]
pub enum ContextOp {
    /// Depth testing enabled
    DepthTestEnabled,
    /// Clear color set
    ClearColorSet([f32; 4]),
    /// Viewport reset to the given pixel size
    ViewportSet(u32, u32),
    /// Color and depth buffers cleared
    FrameCleared,
    /// A stage compiled successfully
    ShaderCompiled(ShaderStage, ShaderHandle),
    /// A stage object deleted
    ShaderDeleted(ShaderHandle),
    /// Both stages linked into a program
    ProgramLinked(ProgramHandle),
    /// A program made active
    ProgramActivated(ProgramHandle),
    /// Matrix uniform uploaded
    UniformMat4 {
        /// Program the upload targeted
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Uploaded matrix
        value: Mat4,
    },
    /// Scalar uniform uploaded
    UniformF32 {
        /// Program the upload targeted
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Uploaded value
        value: f32,
    },
    /// Boolean uniform uploaded
    UniformBool {
        /// Program the upload targeted
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Uploaded value
        value: bool,
    },
    /// Sampler uniform pointed at a texture unit
    UniformTextureUnit {
        /// Program the upload targeted
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Target unit
        unit: TextureUnit,
    },
    /// Texture bound to a unit
    TextureBound {
        /// Unit the texture was bound to
        unit: TextureUnit,
        /// Bound texture
        texture: TextureHandle,
    },
    /// Back buffer presented
    BuffersSwapped,
    /// Pending window events processed
    EventsPolled,
    /// Window resized, in screen coordinates
    WindowResized(u32, u32),
}

/// State shared between the system, its windows and its contexts
#[derive(Debug)]
struct SharedState {
    ops: RefCell<Vec<ContextOp>>,
    close_requested: Cell<bool>,
    window_size: Cell<(u32, u32)>,
    opened_desc: RefCell<Option<WindowDesc>>,
    framebuffer_scale: Cell<f32>,
    next_shader: Cell<u32>,
    next_program: Cell<u32>,
    live_shaders: RefCell<Vec<ShaderHandle>>,
    fail_window: Cell<bool>,
    fail_vertex_compile: RefCell<Option<String>>,
    fail_fragment_compile: RefCell<Option<String>>,
    fail_link: RefCell<Option<String>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            ops: RefCell::new(Vec::new()),
            close_requested: Cell::new(false),
            window_size: Cell::new((0, 0)),
            opened_desc: RefCell::new(None),
            framebuffer_scale: Cell::new(1.0),
            // Handle 0 stays reserved for "no object", as real backends do.
            next_shader: Cell::new(1),
            next_program: Cell::new(1),
            live_shaders: RefCell::new(Vec::new()),
            fail_window: Cell::new(false),
            fail_vertex_compile: RefCell::new(None),
            fail_fragment_compile: RefCell::new(None),
            fail_link: RefCell::new(None),
        }
    }
}

impl SharedState {
    fn push(&self, op: ContextOp) {
        self.ops.borrow_mut().push(op);
    }

    fn compile_failure_for(&self, stage: ShaderStage) -> Option<String> {
        let slot = match stage {
            ShaderStage::Vertex => &self.fail_vertex_compile,
            ShaderStage::Fragment => &self.fail_fragment_compile,
        };
        slot.borrow().clone()
    }
}

/// Headless [`WindowSystem`] with a scriptable failure surface
///
/// The system stays alive in the test after `open_window` hands out the
/// window and context, and keeps access to the shared trace through
/// [`HeadlessSystem::ops`].
#[derive(Debug, Default)]
pub struct HeadlessSystem {
    state: Rc<SharedState>,
}

impl HeadlessSystem {
    /// Create a headless system with no scripted failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Report framebuffer sizes scaled by `scale`, simulating DPI scaling
    pub fn with_framebuffer_scale(self, scale: f32) -> Self {
        self.state.framebuffer_scale.set(scale);
        self
    }

    /// Make `open_window` fail
    pub fn with_window_failure(self) -> Self {
        self.state.fail_window.set(true);
        self
    }

    /// Make every compile of `stage` fail with `log` as the diagnostic
    pub fn with_compile_failure(self, stage: ShaderStage, log: impl Into<String>) -> Self {
        let slot = match stage {
            ShaderStage::Vertex => &self.state.fail_vertex_compile,
            ShaderStage::Fragment => &self.state.fail_fragment_compile,
        };
        *slot.borrow_mut() = Some(log.into());
        self
    }

    /// Make every link fail with `log` as the diagnostic
    pub fn with_link_failure(self, log: impl Into<String>) -> Self {
        *self.state.fail_link.borrow_mut() = Some(log.into());
        self
    }

    /// Snapshot of the recorded operation trace
    pub fn ops(&self) -> Vec<ContextOp> {
        self.state.ops.borrow().clone()
    }

    /// Drop all recorded operations, usually between test phases
    pub fn clear_ops(&self) {
        self.state.ops.borrow_mut().clear();
    }

    /// Flag the window for closure, as the user hitting the close button
    pub fn request_close(&self) {
        self.state.close_requested.set(true);
    }

    /// Shader stage objects compiled but not yet deleted
    pub fn live_shaders(&self) -> Vec<ShaderHandle> {
        self.state.live_shaders.borrow().clone()
    }

    /// The descriptor the last `open_window` call received
    pub fn opened_desc(&self) -> Option<WindowDesc> {
        self.state.opened_desc.borrow().clone()
    }

    /// Current window size in screen coordinates
    pub fn window_size(&self) -> (u32, u32) {
        self.state.window_size.get()
    }
}

impl WindowSystem for HeadlessSystem {
    fn open_window(
        &mut self,
        desc: &WindowDesc,
    ) -> WindowResult<(Box<dyn WindowBackend>, Box<dyn RenderContext>)> {
        if self.state.fail_window.get() {
            return Err(WindowError::CreationFailed(
                "headless window creation scripted to fail".to_string(),
            ));
        }

        self.state.window_size.set((desc.width, desc.height));
        *self.state.opened_desc.borrow_mut() = Some(desc.clone());

        let window = HeadlessWindow {
            state: Rc::clone(&self.state),
        };
        let context = HeadlessContext {
            state: Rc::clone(&self.state),
        };
        Ok((Box::new(window), Box::new(context)))
    }
}

/// Window half of the headless backend
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Rc<SharedState>,
}

impl WindowBackend for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.state.close_requested.get()
    }

    fn poll_events(&mut self) {
        self.state.push(ContextOp::EventsPolled);
    }

    fn swap_buffers(&mut self) {
        self.state.push(ContextOp::BuffersSwapped);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.state.window_size.set((width, height));
        self.state.push(ContextOp::WindowResized(width, height));
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.state.window_size.get();
        let scale = self.state.framebuffer_scale.get();
        (
            (width as f32 * scale).round() as u32,
            (height as f32 * scale).round() as u32,
        )
    }
}

/// Context half of the headless backend
#[derive(Debug)]
pub struct HeadlessContext {
    state: Rc<SharedState>,
}

impl RenderContext for HeadlessContext {
    fn enable_depth_test(&mut self) {
        self.state.push(ContextOp::DepthTestEnabled);
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.state.push(ContextOp::ClearColorSet(color));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.push(ContextOp::ViewportSet(width, height));
    }

    fn clear_frame(&mut self) {
        self.state.push(ContextOp::FrameCleared);
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderHandle, String> {
        if let Some(log) = self.state.compile_failure_for(stage) {
            return Err(log);
        }

        let handle = ShaderHandle(self.state.next_shader.get());
        self.state.next_shader.set(handle.0 + 1);
        self.state.live_shaders.borrow_mut().push(handle);
        self.state.push(ContextOp::ShaderCompiled(stage, handle));
        Ok(handle)
    }

    fn link_program(
        &mut self,
        _vertex: ShaderHandle,
        _fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String> {
        if let Some(log) = self.state.fail_link.borrow().clone() {
            return Err(log);
        }

        let handle = ProgramHandle(self.state.next_program.get());
        self.state.next_program.set(handle.0 + 1);
        self.state.push(ContextOp::ProgramLinked(handle));
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.state.live_shaders.borrow_mut().retain(|s| *s != shader);
        self.state.push(ContextOp::ShaderDeleted(shader));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.state.push(ContextOp::ProgramActivated(program));
    }

    fn set_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &Mat4) {
        self.state.push(ContextOp::UniformMat4 {
            program,
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_f32(&mut self, program: ProgramHandle, name: &str, value: f32) {
        self.state.push(ContextOp::UniformF32 {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_bool(&mut self, program: ProgramHandle, name: &str, value: bool) {
        self.state.push(ContextOp::UniformBool {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_texture_unit(&mut self, program: ProgramHandle, name: &str, unit: TextureUnit) {
        self.state.push(ContextOp::UniformTextureUnit {
            program,
            name: name.to_string(),
            unit,
        });
    }

    fn bind_texture(&mut self, unit: TextureUnit, texture: TextureHandle) {
        self.state.push(ContextOp::TextureBound { unit, texture });
    }
}
