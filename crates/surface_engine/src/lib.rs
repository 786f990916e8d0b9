//! # Surface Engine
//!
//! A minimal 3D rendering scaffold: window and context lifecycle, a single
//! shader program, a strict per-frame protocol and a material helper for
//! uniform binding. The windowing system and graphics API live behind
//! capability traits, so the scaffold runs against a real backend or the
//! bundled headless one without changing application code.
//!
//! ## Features
//!
//! - **Render surface**: window + context + one linked shader program with
//!   projection tracking off real framebuffer dimensions
//! - **Frame protocol**: begin / draw / end, with the `view` and
//!   `projection` uniforms uploaded at frame start
//! - **Surface materials**: optional diffuse and specular maps on fixed
//!   texture units plus scalar lighting terms
//! - **Headless backend**: records every context operation, for tests and
//!   display-less environments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use surface_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     surface_engine::foundation::logging::init();
//!
//!     let config = SurfaceConfig::new("shaders/cube.vert", "shaders/cube.frag")
//!         .with_title("Spinning Cube")
//!         .with_field_of_view(60.0);
//!
//!     let mut system = HeadlessSystem::new();
//!     let mut surface = RenderSurface::new(&mut system, &config)?;
//!     let camera = Camera::default();
//!
//!     while surface.is_running() {
//!         surface.poll_events();
//!         surface.begin_frame(&camera);
//!         // surface.draw(&mut drawable) for each drawable
//!         surface.end_frame();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

pub use config::{Config, ConfigError};
pub use render::{Camera, Drawable, RenderSurface, SurfaceConfig, SurfaceError, SurfaceMaterial};

/// Common imports for scaffold users
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
    pub use crate::render::{
        Camera, ContextOp, Drawable, HeadlessSystem, ProgramHandle, RenderContext, RenderSurface,
        ShaderStage, SurfaceConfig, SurfaceError, SurfaceMaterial, SurfaceResult, TextureHandle,
        TextureUnit, WindowSystem,
    };
}
