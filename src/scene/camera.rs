use std::rc::Rc;

use glam::{Mat4, Vec3};

use super::context::RenderingContext;
use super::node::Node;
use crate::error::{Error, Result};
use crate::program::Program;

/// The box (parallel) or frustum (perspective) the camera can see.
///
/// Values follow the fixed-function GL convention: `near`/`far` are given
/// as signed distances along the viewing axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClippingVolume {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl ClippingVolume {
    /// Rejects volumes that collapse along any axis.
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Result<Self> {
        for (axis, a, b) in [('x', left, right), ('y', bottom, top), ('z', near, far)] {
            if a == b {
                return Err(Error::DegenerateClippingVolume { axis });
            }
        }
        Ok(Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    /// Symmetric flat volume whose half-extents are the viewport size divided
    /// by `pixels_per_unit`, with the `near = 1, far = -1` slab used by the
    /// top-down view. A world unit covers `pixels_per_unit / 2` pixels.
    pub fn from_viewport(width_px: u32, height_px: u32, pixels_per_unit: f32) -> Result<Self> {
        let half_w = width_px as f32 / pixels_per_unit;
        let half_h = height_px as f32 / pixels_per_unit;
        Self::new(-half_w, half_w, -half_h, half_h, 1.0, -1.0)
    }

    /// Frustum from a vertical field of view in degrees.
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Result<Self> {
        let top = near * (fov_y_degrees.to_radians() * 0.5).tan();
        let right = top * aspect;
        Self::new(-right, right, -top, top, near, far)
    }

    /// Orthographic projection, column-major.
    pub fn ortho(&self) -> Mat4 {
        let Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        Mat4::from_cols_array(&[
            2.0 / (r - l),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / (t - b),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / (f - n),
            0.0,
            -(r + l) / (r - l),
            -(t + b) / (t - b),
            -(f + n) / (f - n),
            1.0,
        ])
    }

    /// `glFrustum`-style perspective projection, column-major.
    pub fn frustum(&self) -> Mat4 {
        let Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        Mat4::from_cols_array(&[
            2.0 * n / (r - l),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 * n / (t - b),
            0.0,
            0.0,
            (r + l) / (r - l),
            (t + b) / (t - b),
            -(f + n) / (f - n),
            -1.0,
            0.0,
            0.0,
            -2.0 * f * n / (f - n),
            0.0,
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Parallel,
    Perspective,
}

/// A movable eye with an orthonormal frame.
///
/// Starts at the origin looking down `-Z` with `+Y` up and `+X` right.
#[derive(Clone, Debug)]
pub struct Camera {
    volume: ClippingVolume,
    projection: Projection,
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn new(volume: ClippingVolume, projection: Projection) -> Self {
        Self {
            volume,
            projection,
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }

    pub fn parallel(volume: ClippingVolume) -> Self {
        Self::new(volume, Projection::Parallel)
    }

    pub fn perspective(volume: ClippingVolume) -> Self {
        Self::new(volume, Projection::Perspective)
    }

    pub fn volume(&self) -> &ClippingVolume {
        &self.volume
    }

    pub fn kind(&self) -> Projection {
        self.projection
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Back to the origin with the default orientation.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.forward = Vec3::NEG_Z;
        self.right = Vec3::X;
        self.up = Vec3::Y;
    }

    /// Pitch: tilts `forward` towards `up`.
    pub fn rotate_x(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.forward = (self.forward * cos + self.up * sin).normalize();
        self.up = -self.forward.cross(self.right).normalize();
    }

    /// Yaw: swings `forward` away from `right`.
    pub fn rotate_y(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.forward = (self.forward * cos - self.right * sin).normalize();
        self.right = self.forward.cross(self.up).normalize();
    }

    /// Roll: turns `right` towards `up`.
    pub fn rotate_z(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.right = (self.right * cos + self.up * sin).normalize();
        self.up = -self.forward.cross(self.right).normalize();
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.forward * distance;
    }

    pub fn move_backward(&mut self, distance: f32) {
        self.position -= self.forward * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        self.position += self.right * distance;
    }

    pub fn move_left(&mut self, distance: f32) {
        self.position -= self.right * distance;
    }

    pub fn move_up(&mut self, distance: f32) {
        self.position += self.up * distance;
    }

    pub fn move_down(&mut self, distance: f32) {
        self.position -= self.up * distance;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Parallel => self.volume.ortho(),
            Projection::Perspective => self.volume.frustum(),
        }
    }

    /// Look-at from `position` towards `position + forward`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    /// Renders `root` through this camera with `program` bound, then resets
    /// the context for the next pass.
    pub fn render(&self, root: &Node, ctx: &mut RenderingContext, program: Rc<dyn Program>) {
        ctx.projection(self.projection_matrix());
        ctx.push(self.view_matrix());
        ctx.bind_program(program);
        root.render(ctx);
        ctx.reset();
    }
}
