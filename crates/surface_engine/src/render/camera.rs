//! 3D camera
//!
//! A view-side camera: position, look-at target and up vector, producing the
//! world-to-camera transformation on demand. Projection is not the camera's
//! job here; the render surface owns it because it depends on framebuffer
//! dimensions the camera never sees.
//!
//! # Coordinate System
//! Standard right-handed Y-up world space. The generated view matrix looks
//! down negative Z, matching the projection conventions in
//! [`crate::foundation::math`].

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Camera in 3D space
///
/// The camera is owned by the application, not the render surface; it is
/// borrowed for the duration of each frame start to produce the `view`
/// uniform.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,
}

impl Camera {
    /// Create a camera at `position` looking at `target`
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
        }
    }

    /// Update camera position in world space, preserving target and up
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Point the camera at `target` with a custom up vector
    ///
    /// The up vector does not need to be perpendicular to the view
    /// direction; the view matrix calculation orthonormalizes it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Generate the view matrix for world-to-camera space transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }
}

impl Default for Camera {
    /// Camera at (0, 3, 3) looking at the origin with Y-up orientation
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}
