use crate::math::{Matrix4, Vec3};

/// Maps draw-space points to clip space and back.
pub trait Camera {
    fn project(&self, point: Vec3) -> Vec3;

    fn invert_project(&self, point: Vec3) -> Vec3;
}

/// Orthographic camera over an arbitrary viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    projection: Matrix4,
    inverse: Matrix4,
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let mut camera = Self { projection: Matrix4::IDENTITY, inverse: Matrix4::IDENTITY };
        camera.set_viewport(left, right, bottom, top);
        camera
    }

    /// Rebuilds the projection and its inverse.
    ///
    /// A degenerate viewport gives a singular projection whose inverse is the
    /// identity.
    pub fn set_viewport(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Matrix4::ortho(left, right, bottom, top);
        self.inverse = self.projection.inverse();
    }

    pub fn projection(&self) -> &Matrix4 {
        &self.projection
    }

    pub fn inverse(&self) -> &Matrix4 {
        &self.inverse
    }
}

impl Camera for OrthographicCamera {
    fn project(&self, point: Vec3) -> Vec3 {
        self.projection.transform_point(point)
    }

    fn invert_project(&self, point: Vec3) -> Vec3 {
        self.inverse.transform_point(point)
    }
}

/// The default camera: one unit per physical pixel, origin at the
/// bottom-left corner of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCamera {
    ortho: OrthographicCamera,
    width: u32,
    height: u32,
}

impl PixelCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ortho: OrthographicCamera::new(0.0, width as f32, 0.0, height as f32),
            width,
            height,
        }
    }

    /// Follows a drawable-size change.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ortho.set_viewport(0.0, width as f32, 0.0, height as f32);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Camera for PixelCamera {
    fn project(&self, point: Vec3) -> Vec3 {
        self.ortho.project(point)
    }

    fn invert_project(&self, point: Vec3) -> Vec3 {
        self.ortho.invert_project(point)
    }
}
