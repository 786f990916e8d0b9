//! Surface material
//!
//! A thin uniform-binding helper: optional diffuse and specular maps plus
//! scalar lighting terms, uploaded through the fixed uniform-name contract
//! in [`crate::render::shader::uniforms`]. The material never owns texture
//! storage; handles come from an external texture manager and absence is
//! `None`, never a sentinel id.

use crate::render::backend::{ProgramHandle, RenderContext, TextureHandle, TextureUnit};
use crate::render::shader::uniforms;

/// Texture unit the diffuse map always binds to
pub const DIFFUSE_TEXTURE_UNIT: TextureUnit = TextureUnit(0);

/// Texture unit the specular map always binds to
///
/// Distinct from the diffuse unit because both maps can be active in the
/// same draw.
pub const SPECULAR_TEXTURE_UNIT: TextureUnit = TextureUnit(1);

/// Ambient coefficient applied when the caller does not pick one
pub const DEFAULT_AMBIENT_COEFFICIENT: f32 = 0.03;

/// Material state for a drawable
///
/// Holds at most one diffuse and one specular map plus the shininess and
/// ambient terms. [`SurfaceMaterial::bind`] pushes the full set to the
/// program; slots left `None` still upload their disabled flag so shaders
/// never read stale state from a previous draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    diffuse: Option<TextureHandle>,
    specular: Option<TextureHandle>,
    shininess: f32,
    ambient_coefficient: f32,
}

impl SurfaceMaterial {
    /// Create a material with the default ambient coefficient
    pub fn new(
        diffuse: Option<TextureHandle>,
        specular: Option<TextureHandle>,
        shininess: f32,
    ) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
            ambient_coefficient: DEFAULT_AMBIENT_COEFFICIENT,
        }
    }

    /// Set a custom ambient coefficient
    pub fn with_ambient_coefficient(mut self, ambient_coefficient: f32) -> Self {
        self.ambient_coefficient = ambient_coefficient;
        self
    }

    /// Currently attached diffuse map, if any
    pub fn diffuse(&self) -> Option<TextureHandle> {
        self.diffuse
    }

    /// Currently attached specular map, if any
    pub fn specular(&self) -> Option<TextureHandle> {
        self.specular
    }

    /// Specular exponent
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Ambient lighting coefficient
    pub fn ambient_coefficient(&self) -> f32 {
        self.ambient_coefficient
    }

    /// Upload this material's uniforms and bind its textures
    ///
    /// Scalars go first, then per slot the enabled flag; present maps are
    /// bound to their fixed unit and the sampler uniform is pointed at it.
    /// Called between frame start and frame end with the surface's program.
    pub fn bind(&self, context: &mut dyn RenderContext, program: ProgramHandle) {
        log::trace!(
            "Binding material: diffuse_enabled {}, specular_enabled {}",
            self.diffuse.is_some(),
            self.specular.is_some()
        );

        context.set_uniform_f32(
            program,
            uniforms::AMBIENT_COEFFICIENT,
            self.ambient_coefficient,
        );
        context.set_uniform_f32(program, uniforms::SHININESS, self.shininess);

        context.set_uniform_bool(program, uniforms::DIFFUSE_ENABLED, self.diffuse.is_some());
        if let Some(texture) = self.diffuse {
            context.bind_texture(DIFFUSE_TEXTURE_UNIT, texture);
            context.set_uniform_texture_unit(
                program,
                uniforms::DIFFUSE_TEXTURE,
                DIFFUSE_TEXTURE_UNIT,
            );
        }

        context.set_uniform_bool(program, uniforms::SPECULAR_ENABLED, self.specular.is_some());
        if let Some(texture) = self.specular {
            context.bind_texture(SPECULAR_TEXTURE_UNIT, texture);
            context.set_uniform_texture_unit(
                program,
                uniforms::SPECULAR_TEXTURE,
                SPECULAR_TEXTURE_UNIT,
            );
        }
    }

    /// Detach `texture` from whichever slots hold it
    ///
    /// Each slot is compared independently, so a handle attached as both
    /// maps clears both. Handles this material never held are a no-op, and
    /// repeating the call changes nothing further.
    pub fn remove_texture(&mut self, texture: TextureHandle) {
        if self.diffuse == Some(texture) {
            self.diffuse = None;
        }
        if self.specular == Some(texture) {
            self.specular = None;
        }
    }
}
