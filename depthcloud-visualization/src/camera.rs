//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// Maps nalgebra's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1)
#[rustfmt::skip]
fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// An orbit camera for viewing point clouds
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Looking from slightly above and behind the sensor towards the scene in
    /// front of it. Camera coordinates have y pointing down and z forward.
    pub fn sensor_view(aspect_ratio: f32) -> Self {
        Self::new(
            Point3::new(0.0, -0.6, -1.2),
            Point3::new(0.0, 0.0, 1.5),
            Vector3::new(0.0, -1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            0.01,
            20.0,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix in wgpu clip space
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        opengl_to_wgpu_matrix() * perspective.into_inner()
    }

    /// Rotate the camera around the target, angles in radians
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let up = self.up.normalize();
        let right = offset.cross(&up);
        if right.norm() <= f32::EPSILON {
            return;
        }
        let yaw_rotation =
            nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(up), -yaw);
        let pitch_rotation =
            nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(right), pitch);

        let rotated = yaw_rotation * pitch_rotation * offset;
        // Stay off the poles so the view matrix keeps a valid up vector
        if rotated.normalize().dot(&up).abs() < 0.99 {
            self.position = self.target + rotated;
        } else {
            self.position = self.target + yaw_rotation * offset;
        }
    }

    /// Move towards (positive) or away from the target
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        let new_distance = (distance * (1.0 - amount)).clamp(self.near * 2.0, self.far * 0.9);
        if distance > f32::EPSILON {
            self.position = self.target + offset * (new_distance / distance);
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::sensor_view(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orbit_keeps_distance_to_target() {
        let mut camera = Camera::default();
        let before = (camera.position - camera.target).norm();
        camera.orbit(0.3, 0.2);
        camera.orbit(-1.0, 0.0);
        let after = (camera.position - camera.target).norm();
        assert_relative_eq!(before, after, epsilon = 1e-4);
    }

    #[test]
    fn test_zoom_moves_closer() {
        let mut camera = Camera::default();
        let before = (camera.position - camera.target).norm();
        camera.zoom(0.1);
        let after = (camera.position - camera.target).norm();
        assert!(after < before);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let clip = view_proj * camera.target.to_homogeneous();
        let ndc = clip / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
