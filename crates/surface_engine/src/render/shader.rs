//! Shader program construction
//!
//! GLSL source loading and program linkage for the single program a render
//! surface owns. Backend diagnostics are clipped to a fixed length before
//! they reach the log or an error value.

use thiserror::Error;

use crate::render::backend::{ProgramHandle, RenderContext, ShaderHandle, ShaderStage};

/// Uniform names forming the contract between the scaffold and shader authors
///
/// Every upload in this crate goes through these constants; shaders that
/// want the scaffold's data declare uniforms with exactly these names.
pub mod uniforms {
    /// World-to-camera matrix, uploaded at frame start
    pub const VIEW: &str = "view";

    /// Camera-to-clip matrix, uploaded at frame start
    pub const PROJECTION: &str = "projection";

    /// Ambient lighting coefficient
    pub const AMBIENT_COEFFICIENT: &str = "ambient_coefficient";

    /// Specular exponent
    pub const SHININESS: &str = "shininess";

    /// Whether a diffuse map is bound
    pub const DIFFUSE_ENABLED: &str = "diffuse_enabled";

    /// Diffuse map sampler
    pub const DIFFUSE_TEXTURE: &str = "diffuse_texture";

    /// Whether a specular map is bound
    pub const SPECULAR_ENABLED: &str = "specular_enabled";

    /// Specular map sampler
    pub const SPECULAR_TEXTURE: &str = "specular_texture";
}

/// Upper bound, in bytes, on compile and link diagnostics kept from the
/// backend's info log
pub const MAX_INFO_LOG_BYTES: usize = 512;

/// Errors raised while building the shader program
#[derive(Debug, Error)]
pub enum ShaderError {
    /// Shader source could not be read
    #[error("Failed to read shader source '{path}': {source}")]
    Io {
        /// Path of the unreadable file
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Shader source file exists but holds zero bytes
    #[error("Shader source '{path}' is empty")]
    EmptySource {
        /// Path of the empty file
        path: String,
    },

    /// A stage failed to compile
    #[error("Shader compilation of '{path}' failed:\n{log}")]
    Compile {
        /// Path of the failing stage's source
        path: String,
        /// Clipped backend info log
        log: String,
    },

    /// The program failed to link
    #[error("Failed to link shader program:\n{log}")]
    Link {
        /// Clipped backend info log
        log: String,
    },
}

/// Compile both stages and link them into a program
///
/// Both stages are compiled before the first failure is reported, so a
/// broken vertex shader does not hide fragment diagnostics. The stage
/// shaders are deleted whether or not the link succeeds; only the linked
/// program survives this function.
pub(crate) fn build_program(
    context: &mut dyn RenderContext,
    vertex_path: &str,
    fragment_path: &str,
) -> Result<ProgramHandle, ShaderError> {
    let vertex = compile_stage(context, ShaderStage::Vertex, vertex_path);
    let fragment = compile_stage(context, ShaderStage::Fragment, fragment_path);

    let (vertex, fragment) = match (vertex, fragment) {
        (Ok(vertex), Ok(fragment)) => (vertex, fragment),
        (Ok(survivor), Err(err)) | (Err(err), Ok(survivor)) => {
            context.delete_shader(survivor);
            return Err(err);
        }
        (Err(err), Err(_)) => return Err(err),
    };

    let linked = context.link_program(vertex, fragment);
    context.delete_shader(vertex);
    context.delete_shader(fragment);

    linked.map_err(|raw_log| {
        let log = clip_info_log(raw_log);
        log::error!("Failed to link shader program:\n{log}");
        ShaderError::Link { log }
    })
}

/// Compile one stage from the source file at `path`
fn compile_stage(
    context: &mut dyn RenderContext,
    stage: ShaderStage,
    path: &str,
) -> Result<ShaderHandle, ShaderError> {
    let source = load_source(path)?;
    context.compile_shader(stage, &source).map_err(|raw_log| {
        let log = clip_info_log(raw_log);
        log::error!("Shader compilation of '{path}' failed:\n{log}");
        ShaderError::Compile {
            path: path.to_string(),
            log,
        }
    })
}

/// Read one stage's source from disk
///
/// Empty files fail here, before the compiler is ever invoked.
fn load_source(path: &str) -> Result<String, ShaderError> {
    let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_string(),
        source,
    })?;

    if source.is_empty() {
        return Err(ShaderError::EmptySource {
            path: path.to_string(),
        });
    }
    Ok(source)
}

/// Clip a backend info log to [`MAX_INFO_LOG_BYTES`], on a char boundary
fn clip_info_log(mut log: String) -> String {
    if log.len() > MAX_INFO_LOG_BYTES {
        let mut end = MAX_INFO_LOG_BYTES;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}
