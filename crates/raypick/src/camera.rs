//! Camera, viewport and screen-point ray construction.

use nalgebra::{Isometry3, Perspective3};
use raypick_math::{Mat4, Point3, Vec3};

use crate::error::RaycastError;
use crate::ray::Ray;

/// Pixel dimensions of the render surface a screen point refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport with the given pixel dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A camera exposing the view and projection matrices raycasting needs.
///
/// The subsystem does not own or move the camera; hosts hand in whatever
/// matrices their renderer already maintains.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Wrap existing view and projection matrices.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Perspective camera at `eye` looking at `target`.
    ///
    /// `fov_y` is the vertical field of view in radians; clip planes are
    /// the usual OpenGL-style near/far pair.
    pub fn perspective(
        eye: Point3,
        target: Point3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        Self {
            view: Isometry3::look_at_rh(&eye, &target, &up).to_homogeneous(),
            projection: Perspective3::new(aspect, fov_y, znear, zfar).to_homogeneous(),
        }
    }

    /// The view matrix.
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// The projection matrix.
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Combined `projection * view` matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Ray {
    /// Build a world-space ray through a screen point.
    ///
    /// The point is unprojected at the near and far clip planes through
    /// the inverse view-projection matrix (GL clip conventions, NDC z in
    /// [-1, 1]); the ray starts at the near-plane point and heads toward
    /// the far-plane point. Screen coordinates may be fractional and are
    /// not clamped to the viewport.
    ///
    /// Fails with [`RaycastError::InvalidArgument`] for a zero-sized
    /// viewport or a non-invertible view-projection matrix.
    pub fn from_screen_point(
        camera: &Camera,
        viewport: &Viewport,
        screen_x: f32,
        screen_y: f32,
    ) -> Result<Self, RaycastError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(RaycastError::InvalidArgument(
                "viewport must have non-zero width and height",
            ));
        }

        let inverse = camera
            .view_projection()
            .try_inverse()
            .ok_or(RaycastError::InvalidArgument(
                "view-projection matrix is not invertible",
            ))?;

        // Screen origin is top-left; NDC y points up.
        let ndc_x = 2.0 * screen_x / viewport.width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y / viewport.height as f32;

        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));

        Ray::new(near, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::perspective(
            Point3::new(0.0, 1.5, 10.0),
            Point3::new(0.0, 1.5, 0.0),
            Vec3::y(),
            60f32.to_radians(),
            800.0 / 600.0,
            0.1,
            1000.0,
        )
    }

    #[test]
    fn test_center_ray_matches_camera_forward() {
        let camera = test_camera();
        let viewport = Viewport::new(800, 600);
        let ray = Ray::from_screen_point(&camera, &viewport, 400.0, 300.0).unwrap();
        // Camera looks straight down -Z.
        assert!(ray.direction.x.abs() < 1e-4);
        assert!(ray.direction.y.abs() < 1e-4);
        assert!((ray.direction.z + 1.0).abs() < 1e-4);
        // Origin sits on the near plane in front of the eye.
        assert!((ray.origin.z - (10.0 - 0.1)).abs() < 1e-3);
    }

    #[test]
    fn test_off_center_ray_deviates_into_quadrant() {
        let camera = test_camera();
        let viewport = Viewport::new(800, 600);
        // Top-right quadrant of the screen: +X, +Y in world space.
        let ray = Ray::from_screen_point(&camera, &viewport, 700.0, 100.0).unwrap();
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn test_fractional_screen_coordinates() {
        let camera = test_camera();
        let viewport = Viewport::new(800, 600);
        assert!(Ray::from_screen_point(&camera, &viewport, 400.5, 299.25).is_ok());
    }

    #[test]
    fn test_degenerate_viewport_rejected() {
        let camera = test_camera();
        for viewport in [Viewport::new(0, 600), Viewport::new(800, 0)] {
            let result = Ray::from_screen_point(&camera, &viewport, 0.0, 0.0);
            assert!(matches!(result, Err(RaycastError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_singular_view_projection_rejected() {
        let camera = Camera::new(Mat4::zeros(), Mat4::identity());
        let viewport = Viewport::new(800, 600);
        let result = Ray::from_screen_point(&camera, &viewport, 400.0, 300.0);
        assert!(matches!(result, Err(RaycastError::InvalidArgument(_))));
    }
}
