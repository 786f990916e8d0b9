//! # Rendering scaffold
//!
//! High-level rendering layer built around two components:
//! - **[`RenderSurface`]**: owns the window, the rendering context and the
//!   single shader program, and drives the per-frame protocol
//! - **[`SurfaceMaterial`]**: binds per-drawable texture and lighting
//!   uniforms through the fixed name contract in [`shader::uniforms`]
//!
//! The windowing system and graphics API sit behind the capability traits
//! in [`backend`]; [`headless`] ships an in-memory implementation used by
//! the tests and the demo binary.

// Backend seam and its headless implementation
pub mod backend;
pub mod headless;

// Core surface components
pub mod camera;
pub mod material;
pub mod shader;
pub mod surface;

#[cfg(test)]
mod surface_tests;

// High-level types applications use directly
pub use backend::{
    ContextProfile, ProgramHandle, RenderContext, ShaderHandle, ShaderStage, TextureHandle,
    TextureUnit, WindowBackend, WindowDesc, WindowError, WindowResult, WindowSystem,
    CONTEXT_PROFILE,
};
pub use camera::Camera;
pub use headless::{ContextOp, HeadlessSystem};
pub use material::{
    SurfaceMaterial, DEFAULT_AMBIENT_COEFFICIENT, DIFFUSE_TEXTURE_UNIT, SPECULAR_TEXTURE_UNIT,
};
pub use shader::{uniforms, ShaderError, MAX_INFO_LOG_BYTES};
pub use surface::{
    Drawable, RenderSurface, SurfaceConfig, SurfaceError, SurfaceResult, FAR_PLANE, NEAR_PLANE,
};
