//! Backend abstraction traits for windowing and the rendering context
//!
//! This module defines the seam between the scaffold and its external
//! collaborators. The windowing backend's implicit "current context" is an
//! explicit capability here: [`WindowSystem::open_window`] performs the
//! one-time backend setup and hands back a [`WindowBackend`] (the OS window)
//! paired with a live [`RenderContext`] (the graphics API state attached to
//! it). Every operation that touches context state takes the capability
//! object, so nothing in the scaffold can issue a context call before the
//! context exists.

use thiserror::Error;

use crate::foundation::math::Mat4;

/// Result type for window backend operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Errors raised while bringing up a window and its context
#[derive(Debug, Error)]
pub enum WindowError {
    /// The windowing backend itself could not be initialized
    #[error("Failed to initialize windowing backend: {0}")]
    InitializationFailed(String),

    /// The backend is up but the window or its context could not be created
    #[error("Failed to create window: {0}")]
    CreationFailed(String),
}

/// Handle to a compiled shader stage owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Handle to a linked shader program owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Handle to a texture resource owned by an external texture manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A texture unit index on the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUnit(pub u32);

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

/// OpenGL context profile requested when opening a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextProfile {
    /// Major context version
    pub major: u32,
    /// Minor context version
    pub minor: u32,
    /// Request the core profile (no compatibility features)
    pub core: bool,
    /// Request a forward-compatible context (required on macOS)
    pub forward_compatible: bool,
    /// Whether the user may resize the window
    pub resizable: bool,
}

/// The fixed profile the scaffold requests: OpenGL 3.3 core,
/// forward-compatible, with user resizing disabled. Resizes happen
/// programmatically through the surface, never by the window manager.
pub const CONTEXT_PROFILE: ContextProfile = ContextProfile {
    major: 3,
    minor: 3,
    core: true,
    forward_compatible: true,
    resizable: false,
};

/// Parameters for opening a window
#[derive(Debug, Clone)]
pub struct WindowDesc {
    /// Title bar text
    pub title: String,
    /// Requested client-area width in screen coordinates
    pub width: u32,
    /// Requested client-area height in screen coordinates
    pub height: u32,
    /// Context profile to request
    pub profile: ContextProfile,
}

/// Capability to open windows with live rendering contexts
pub trait WindowSystem {
    /// Open a window and make its rendering context current
    ///
    /// Initializes the windowing backend if it is not already up, applies
    /// the requested context profile, creates the window, makes its context
    /// current and loads the graphics function pointers. The returned
    /// [`RenderContext`] is live; no context operation exists before it.
    ///
    /// # Errors
    /// [`WindowError::InitializationFailed`] if the backend cannot start,
    /// [`WindowError::CreationFailed`] if the window or context cannot be
    /// created. Both are fatal to surface construction; there is no retry.
    fn open_window(
        &mut self,
        desc: &WindowDesc,
    ) -> WindowResult<(Box<dyn WindowBackend>, Box<dyn RenderContext>)>;
}

/// An open OS window with an attached rendering context
///
/// Implementations are deliberately not `Send`: window and context
/// operations stay on the thread that created them.
pub trait WindowBackend {
    /// Check if the window has been flagged for closure
    fn should_close(&self) -> bool;

    /// Process pending window system events
    fn poll_events(&mut self);

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Resize the client area, in screen coordinates
    fn set_size(&mut self, width: u32, height: u32);

    /// Current framebuffer size in pixels
    ///
    /// Under DPI scaling this differs from the requested window size, so
    /// viewport and projection math must use this value, never the size the
    /// window was asked for.
    fn framebuffer_size(&self) -> (u32, u32);
}

/// The live rendering context attached to a window
///
/// Mirrors the small slice of the graphics API the scaffold drives: global
/// state, shader program construction, uniform upload and texture binding.
/// State setters are infallible; compile and link report failure through the
/// backend's diagnostic log.
pub trait RenderContext {
    /// Enable depth testing for subsequent draws
    fn enable_depth_test(&mut self);

    /// Set the color used when clearing the color buffer, as [R, G, B, A]
    /// components in the 0.0-1.0 range
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Set the viewport to cover `width` x `height` pixels from the origin
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the color and depth buffers
    fn clear_frame(&mut self);

    /// Compile one shader stage from source
    ///
    /// `Err` carries the backend's raw info log for the failed compile.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    /// Link a vertex and fragment stage into a program
    ///
    /// On failure no program object survives; `Err` carries the backend's
    /// raw link log. The stage shaders are untouched either way and remain
    /// the caller's to delete.
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String>;

    /// Delete a shader stage object
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Make a program the active one for subsequent draws and uniform uploads
    fn use_program(&mut self, program: ProgramHandle);

    /// Upload a 4x4 matrix uniform
    fn set_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &Mat4);

    /// Upload a scalar float uniform
    fn set_uniform_f32(&mut self, program: ProgramHandle, name: &str, value: f32);

    /// Upload a boolean uniform
    fn set_uniform_bool(&mut self, program: ProgramHandle, name: &str, value: bool);

    /// Point a sampler uniform at a texture unit
    fn set_uniform_texture_unit(&mut self, program: ProgramHandle, name: &str, unit: TextureUnit);

    /// Bind a texture to a unit (activates the unit, then binds)
    fn bind_texture(&mut self, unit: TextureUnit, texture: TextureHandle);
}
