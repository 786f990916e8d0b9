//! Scenario tests for the surface lifecycle over the headless backend
//!
//! Each test drives the public API the way an application would and
//! asserts on the recorded context trace: construction choreography,
//! dimension and field-of-view updates, the frame protocol, material
//! binding and every scripted failure path.

use approx::assert_relative_eq;
use tempfile::TempDir;

use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::render::backend::{
    ProgramHandle, RenderContext, ShaderHandle, ShaderStage, TextureHandle, TextureUnit,
    CONTEXT_PROFILE,
};
use crate::render::camera::Camera;
use crate::render::headless::{ContextOp, HeadlessSystem};
use crate::render::material::{SurfaceMaterial, DIFFUSE_TEXTURE_UNIT, SPECULAR_TEXTURE_UNIT};
use crate::render::shader::{uniforms, ShaderError, MAX_INFO_LOG_BYTES};
use crate::render::surface::{
    Drawable, RenderSurface, SurfaceConfig, SurfaceError, FAR_PLANE, NEAR_PLANE,
};

const VERTEX_SOURCE: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
const FRAGMENT_SOURCE: &str =
    "#version 330 core\nout vec4 frag_color;\nvoid main() { frag_color = vec4(1.0); }\n";

/// Write shader fixtures into `dir` and return a config pointing at them
fn config_with_sources(dir: &TempDir, vertex: &str, fragment: &str) -> SurfaceConfig {
    let vert = dir.path().join("test.vert");
    let frag = dir.path().join("test.frag");
    std::fs::write(&vert, vertex).unwrap();
    std::fs::write(&frag, fragment).unwrap();
    SurfaceConfig::new(vert.to_str().unwrap(), frag.to_str().unwrap())
}

fn valid_config(dir: &TempDir) -> SurfaceConfig {
    config_with_sources(dir, VERTEX_SOURCE, FRAGMENT_SOURCE)
}

/// Drawable that records the program handle it was given and binds a material
struct RecordingDrawable {
    material: SurfaceMaterial,
    programs_seen: Vec<ProgramHandle>,
}

impl RecordingDrawable {
    fn with_material(material: SurfaceMaterial) -> Self {
        Self {
            material,
            programs_seen: Vec::new(),
        }
    }
}

impl Drawable for RecordingDrawable {
    fn draw(&mut self, context: &mut dyn RenderContext, program: ProgramHandle) {
        self.programs_seen.push(program);
        self.material.bind(context, program);
    }
}

#[test]
fn test_construction_succeeds_with_valid_shaders() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();

    let surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    // Handles are issued from 1, so the program is observably real.
    assert_eq!(surface.program(), ProgramHandle(1));
    assert!(system
        .ops()
        .contains(&ContextOp::ProgramLinked(ProgramHandle(1))));
    assert!(surface.is_running());
}

#[test]
fn test_construction_requests_fixed_context_profile() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let config = valid_config(&dir).with_title("Profile check");

    let _surface = RenderSurface::new(&mut system, &config).unwrap();

    let desc = system.opened_desc().unwrap();
    assert_eq!(desc.title, "Profile check");
    assert_eq!((desc.width, desc.height), (1280, 720));
    assert_eq!(desc.profile, CONTEXT_PROFILE);
    assert_eq!(desc.profile.major, 3);
    assert_eq!(desc.profile.minor, 3);
    assert!(desc.profile.core);
    assert!(desc.profile.forward_compatible);
    assert!(!desc.profile.resizable);
}

#[test]
fn test_construction_choreography() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();

    let _surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    // Fixed order: context state, viewport from the framebuffer, then the
    // program build; stage shaders are released right after the link and
    // nothing is activated until the first frame begins.
    assert_eq!(
        system.ops(),
        vec![
            ContextOp::DepthTestEnabled,
            ContextOp::ClearColorSet([0.0, 0.0, 0.0, 1.0]),
            ContextOp::ViewportSet(1280, 720),
            ContextOp::ShaderCompiled(ShaderStage::Vertex, ShaderHandle(1)),
            ContextOp::ShaderCompiled(ShaderStage::Fragment, ShaderHandle(2)),
            ContextOp::ProgramLinked(ProgramHandle(1)),
            ContextOp::ShaderDeleted(ShaderHandle(1)),
            ContextOp::ShaderDeleted(ShaderHandle(2)),
        ]
    );
    assert!(system.live_shaders().is_empty());
}

#[test]
fn test_initial_projection_uses_real_framebuffer_size() {
    let dir = TempDir::new().unwrap();
    // Simulated HiDPI: framebuffer twice the requested size.
    let mut system = HeadlessSystem::new().with_framebuffer_scale(2.0);

    let surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    assert!(system.ops().contains(&ContextOp::ViewportSet(2560, 1440)));
    let expected = Mat4::perspective(
        utils::deg_to_rad(45.0),
        2560.0 / 1440.0,
        NEAR_PLANE,
        FAR_PLANE,
    );
    assert_relative_eq!(surface.projection(), expected, epsilon = 1e-6);
}

#[test]
fn test_empty_vertex_source_fails_construction() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let config = config_with_sources(&dir, "", FRAGMENT_SOURCE);

    let err = RenderSurface::new(&mut system, &config).unwrap_err();
    assert!(matches!(
        err,
        SurfaceError::Program(ShaderError::EmptySource { .. })
    ));

    // The fragment stage still compiled; it must not leak.
    assert!(system.live_shaders().is_empty());
    assert!(!system
        .ops()
        .iter()
        .any(|op| matches!(op, ContextOp::ProgramLinked(_))));
}

#[test]
fn test_empty_fragment_source_fails_construction() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let config = config_with_sources(&dir, VERTEX_SOURCE, "");

    let err = RenderSurface::new(&mut system, &config).unwrap_err();
    match err {
        SurfaceError::Program(ShaderError::EmptySource { path }) => {
            assert!(path.ends_with("test.frag"));
        }
        other => panic!("expected empty-source failure, got {other:?}"),
    }
    assert!(system.live_shaders().is_empty());
}

#[test]
fn test_unreadable_source_fails_construction() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut config = valid_config(&dir);
    config.vertex_shader_path = dir.path().join("missing.vert").display().to_string();

    let err = RenderSurface::new(&mut system, &config).unwrap_err();
    assert!(matches!(err, SurfaceError::Program(ShaderError::Io { .. })));
}

#[test]
fn test_compile_failure_deletes_surviving_stage() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new()
        .with_compile_failure(ShaderStage::Fragment, "ERROR: 0:3: 'oops' undeclared");

    let err = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap_err();
    match err {
        SurfaceError::Program(ShaderError::Compile { path, log }) => {
            assert!(path.ends_with("test.frag"));
            assert_eq!(log, "ERROR: 0:3: 'oops' undeclared");
        }
        other => panic!("expected compile failure, got {other:?}"),
    }

    // The vertex stage compiled fine and must be released; no link happens.
    assert!(system.live_shaders().is_empty());
    assert!(system
        .ops()
        .contains(&ContextOp::ShaderDeleted(ShaderHandle(1))));
    assert!(!system
        .ops()
        .iter()
        .any(|op| matches!(op, ContextOp::ProgramLinked(_))));
}

#[test]
fn test_link_failure_still_releases_both_stages() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new().with_link_failure("link exploded");

    let err = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap_err();
    assert!(matches!(
        err,
        SurfaceError::Program(ShaderError::Link { .. })
    ));

    let ops = system.ops();
    assert!(ops.contains(&ContextOp::ShaderDeleted(ShaderHandle(1))));
    assert!(ops.contains(&ContextOp::ShaderDeleted(ShaderHandle(2))));
    assert!(system.live_shaders().is_empty());
    assert!(!ops
        .iter()
        .any(|op| matches!(op, ContextOp::ProgramActivated(_))));
}

#[test]
fn test_window_failure_aborts_before_any_context_call() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new().with_window_failure();

    let err = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap_err();
    assert!(matches!(err, SurfaceError::Window(_)));
    assert!(system.ops().is_empty());
}

#[test]
fn test_compile_diagnostics_are_clipped() {
    let dir = TempDir::new().unwrap();
    let mut system =
        HeadlessSystem::new().with_compile_failure(ShaderStage::Vertex, "e".repeat(4096));

    let err = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap_err();
    match err {
        SurfaceError::Program(ShaderError::Compile { log, .. }) => {
            assert_eq!(log.len(), MAX_INFO_LOG_BYTES);
        }
        other => panic!("expected compile failure, got {other:?}"),
    }
}

#[test]
fn test_link_diagnostics_are_clipped() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new().with_link_failure("x".repeat(4096));

    let err = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap_err();
    match err {
        SurfaceError::Program(ShaderError::Link { log }) => {
            assert_eq!(log.len(), MAX_INFO_LOG_BYTES);
        }
        other => panic!("expected link failure, got {other:?}"),
    }
}

#[test]
fn test_update_dimensions_resets_viewport_from_framebuffer() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new().with_framebuffer_scale(2.0);
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    system.clear_ops();

    surface.update_dimensions(400, 300);

    // Resize in screen coordinates, viewport in pixels.
    assert_eq!(
        system.ops(),
        vec![
            ContextOp::WindowResized(400, 300),
            ContextOp::ViewportSet(800, 600),
        ]
    );
    let expected = Mat4::perspective(
        utils::deg_to_rad(45.0),
        800.0 / 600.0,
        NEAR_PLANE,
        FAR_PLANE,
    );
    assert_relative_eq!(surface.projection(), expected, epsilon = 1e-6);
}

#[test]
fn test_update_field_of_view_recomputes_projection_only() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    surface.update_dimensions(400, 300);
    system.clear_ops();

    surface.update_field_of_view(90.0);

    // No viewport reset and no resize; the projection moves, nothing else.
    assert!(system.ops().is_empty());
    assert_relative_eq!(surface.field_of_view(), 90.0);
    let expected = Mat4::perspective(
        utils::deg_to_rad(90.0),
        400.0 / 300.0,
        NEAR_PLANE,
        FAR_PLANE,
    );
    assert_relative_eq!(surface.projection(), expected, epsilon = 1e-6);
}

#[test]
fn test_begin_frame_activates_program_and_uploads_matrices() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();
    system.clear_ops();

    surface.begin_frame(&camera);

    let program = surface.program();
    assert_eq!(
        system.ops(),
        vec![
            ContextOp::ProgramActivated(program),
            ContextOp::FrameCleared,
            ContextOp::UniformMat4 {
                program,
                name: uniforms::VIEW.to_string(),
                value: camera.view_matrix(),
            },
            ContextOp::UniformMat4 {
                program,
                name: uniforms::PROJECTION.to_string(),
                value: surface.projection(),
            },
        ]
    );
    surface.end_frame();
}

#[test]
fn test_end_frame_swaps_buffers_once() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();
    system.clear_ops();

    surface.begin_frame(&camera);
    surface.end_frame();

    let swaps = system
        .ops()
        .iter()
        .filter(|op| **op == ContextOp::BuffersSwapped)
        .count();
    assert_eq!(swaps, 1);
    assert_eq!(system.ops().last(), Some(&ContextOp::BuffersSwapped));
}

#[test]
fn test_poll_events_forwards_to_backend() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    system.clear_ops();

    surface.poll_events();
    assert_eq!(system.ops(), vec![ContextOp::EventsPolled]);
}

#[test]
fn test_close_request_stops_the_run_loop() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    assert!(surface.is_running());
    system.request_close();
    assert!(!surface.is_running());
}

#[test]
fn test_drawables_receive_the_frame_program() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();

    let mut drawable =
        RecordingDrawable::with_material(SurfaceMaterial::new(None, None, 32.0));

    surface.begin_frame(&camera);
    surface.draw(&mut drawable);
    surface.draw(&mut drawable);
    surface.end_frame();

    // Same program across the whole frame, and it is the surface's own.
    assert_eq!(
        drawable.programs_seen,
        vec![surface.program(), surface.program()]
    );
}

#[test]
fn test_material_bind_skips_missing_diffuse_but_binds_specular() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();
    let program = surface.program();

    let material = SurfaceMaterial::new(None, Some(TextureHandle(7)), 64.0);
    let mut drawable = RecordingDrawable::with_material(material);

    system.clear_ops();
    surface.begin_frame(&camera);
    surface.draw(&mut drawable);
    surface.end_frame();

    let ops = system.ops();
    assert!(ops.contains(&ContextOp::UniformBool {
        program,
        name: uniforms::DIFFUSE_ENABLED.to_string(),
        value: false,
    }));
    assert!(ops.contains(&ContextOp::UniformBool {
        program,
        name: uniforms::SPECULAR_ENABLED.to_string(),
        value: true,
    }));

    // Nothing touches the diffuse unit; the specular map lands on unit 1.
    assert!(!ops
        .iter()
        .any(|op| matches!(op, ContextOp::TextureBound { unit, .. } if *unit == DIFFUSE_TEXTURE_UNIT)));
    assert!(ops.contains(&ContextOp::TextureBound {
        unit: SPECULAR_TEXTURE_UNIT,
        texture: TextureHandle(7),
    }));
    assert!(ops.contains(&ContextOp::UniformTextureUnit {
        program,
        name: uniforms::SPECULAR_TEXTURE.to_string(),
        unit: SPECULAR_TEXTURE_UNIT,
    }));
}

#[test]
fn test_material_bind_uses_distinct_fixed_units() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();

    let material =
        SurfaceMaterial::new(Some(TextureHandle(3)), Some(TextureHandle(4)), 16.0)
            .with_ambient_coefficient(0.25);
    let mut drawable = RecordingDrawable::with_material(material);

    system.clear_ops();
    surface.begin_frame(&camera);
    surface.draw(&mut drawable);
    surface.end_frame();

    let ops = system.ops();
    assert!(ops.contains(&ContextOp::TextureBound {
        unit: TextureUnit(0),
        texture: TextureHandle(3),
    }));
    assert!(ops.contains(&ContextOp::TextureBound {
        unit: TextureUnit(1),
        texture: TextureHandle(4),
    }));

    // Scalars go up front, before any texture work.
    let program = surface.program();
    let ambient_pos = ops
        .iter()
        .position(|op| {
            *op == ContextOp::UniformF32 {
                program,
                name: uniforms::AMBIENT_COEFFICIENT.to_string(),
                value: 0.25,
            }
        })
        .unwrap();
    let shininess_pos = ops
        .iter()
        .position(|op| {
            *op == ContextOp::UniformF32 {
                program,
                name: uniforms::SHININESS.to_string(),
                value: 16.0,
            }
        })
        .unwrap();
    let first_bind_pos = ops
        .iter()
        .position(|op| matches!(op, ContextOp::TextureBound { .. }))
        .unwrap();
    assert!(ambient_pos < shininess_pos);
    assert!(shininess_pos < first_bind_pos);
}

#[test]
#[should_panic(expected = "draw called outside an open frame")]
fn test_draw_outside_frame_panics_in_debug() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    let mut drawable = RecordingDrawable::with_material(SurfaceMaterial::new(None, None, 1.0));
    surface.draw(&mut drawable);
}

#[test]
#[should_panic(expected = "begin_frame called inside an open frame")]
fn test_nested_begin_frame_panics_in_debug() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();
    let camera = Camera::default();

    surface.begin_frame(&camera);
    surface.begin_frame(&camera);
}

#[test]
#[should_panic(expected = "end_frame called without begin_frame")]
fn test_end_frame_without_begin_panics_in_debug() {
    let dir = TempDir::new().unwrap();
    let mut system = HeadlessSystem::new();
    let mut surface = RenderSurface::new(&mut system, &valid_config(&dir)).unwrap();

    surface.end_frame();
}
