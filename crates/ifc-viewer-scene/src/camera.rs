// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Look-at perspective camera and picking rays

use ifc_viewer_model::Aabb;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Initial eye position
pub const DEFAULT_EYE: [f32; 3] = [12.0, 6.0, 8.0];
/// Initial look-at target
pub const DEFAULT_TARGET: [f32; 3] = [0.0, 0.0, -10.0];

/// Padding applied when framing bounds
const FIT_MARGIN: f32 = 1.2;

/// Perspective camera looking from `eye` at `target`, Y up
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: DEFAULT_EYE,
            target: DEFAULT_TARGET,
            fov_y: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn set_look_at(&mut self, eye: [f32; 3], target: [f32; 3]) {
        self.eye = eye;
        self.target = target;
    }

    fn eye_point(&self) -> Point3<f32> {
        Point3::from(self.eye)
    }

    fn target_point(&self) -> Point3<f32> {
        Point3::from(self.target)
    }

    fn view(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye_point(), &self.target_point(), &Vector3::y())
    }

    fn projection(&self, aspect: f32) -> Perspective3<f32> {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Perspective3::new(aspect, self.fov_y.to_radians(), self.near, self.far)
    }

    /// Combined world → clip transform
    pub fn view_projection(&self, aspect: f32) -> Matrix4<f32> {
        self.projection(aspect).as_matrix() * self.view().to_homogeneous()
    }

    /// Project a world point to pixel coordinates (origin top-left)
    ///
    /// Returns `None` for points behind the camera.
    pub fn project(&self, point: [f32; 3], width: f32, height: f32) -> Option<[f32; 2]> {
        let clip = self.view_projection(width / height)
            * Point3::from(point).to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some([
            (ndc_x + 1.0) * 0.5 * width,
            (1.0 - ndc_y) * 0.5 * height,
        ])
    }

    /// World-space ray through a pixel
    pub fn ray_through(&self, px: f32, py: f32, width: f32, height: f32) -> Ray {
        let ndc_x = 2.0 * px / width - 1.0;
        let ndc_y = 1.0 - 2.0 * py / height;

        let projection = self.projection(width / height);
        let view = self.view();
        let near = view.inverse_transform_point(
            &projection.unproject_point(&Point3::new(ndc_x, ndc_y, -1.0)),
        );
        let far = view.inverse_transform_point(
            &projection.unproject_point(&Point3::new(ndc_x, ndc_y, 1.0)),
        );

        Ray::new(self.eye_point(), far - near)
    }

    /// Re-target on `bounds` and back off until it fits the view,
    /// keeping the current viewing direction
    pub fn fit_bounds(&mut self, bounds: &Aabb) {
        if bounds.is_empty() {
            return;
        }

        let center = Point3::from(bounds.center());
        let radius = (Point3::from(bounds.max) - Point3::from(bounds.min)).norm() * 0.5;
        let sin_half_fov = (self.fov_y.to_radians() * 0.5).sin();
        let distance = (radius * FIT_MARGIN / sin_half_fov).max(self.near * 10.0);

        let direction = (self.eye_point() - self.target_point())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vector3::new(1.0, 0.5, 1.0).normalize());

        let eye = center + direction * distance;
        self.set_look_at(eye.into(), center.into());
        log::debug!("[Camera] Fit to bounds, distance {distance:.2}");
    }
}

/// Half-line in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| -Vector3::z()),
        }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Distance to the nearest hit on `aabb` (slab test)
    ///
    /// A ray starting inside the box hits at distance 0.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if aabb.is_empty() {
            return None;
        }

        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];

            if dir.abs() < f32::EPSILON {
                if origin < aabb.min[axis] || origin > aabb.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (aabb.min[axis] - origin) * inv;
            let mut t1 = (aabb.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_look_at() {
        let camera = Camera::default();
        assert_eq!(camera.eye, [12.0, 6.0, 8.0]);
        assert_eq!(camera.target, [0.0, 0.0, -10.0]);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let camera = Camera::default();
        let [x, y] = camera.project(camera.target, 800.0, 600.0).unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-2);
        assert_relative_eq!(y, 300.0, epsilon = 1e-2);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let mut camera = Camera::default();
        camera.set_look_at([0.0, 0.0, 10.0], [0.0, 0.0, 0.0]);
        assert!(camera.project([0.0, 0.0, 20.0], 800.0, 600.0).is_none());
    }

    #[test]
    fn test_centre_ray_points_at_target() {
        let camera = Camera::default();
        let ray = camera.ray_through(400.0, 300.0, 800.0, 600.0);
        let expected = (Point3::from(camera.target) - Point3::from(camera.eye)).normalize();
        assert_relative_eq!(ray.direction, expected, epsilon = 1e-4);
        assert_relative_eq!(ray.origin, Point3::from(camera.eye));
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb::around([0.0, 0.0, 0.0], 1.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(ray.intersect_aabb(&aabb).unwrap(), 9.0);

        let miss = Ray::new(Point3::new(5.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(miss.intersect_aabb(&aabb).is_none());

        let away = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(away.intersect_aabb(&aabb).is_none());

        let inside = Ray::new(Point3::origin(), Vector3::x());
        assert_eq!(inside.intersect_aabb(&aabb), Some(0.0));

        assert!(ray.intersect_aabb(&Aabb::empty()).is_none());
    }

    #[test]
    fn test_fit_bounds_keeps_direction() {
        let mut camera = Camera::default();
        let before = (Point3::from(camera.eye) - Point3::from(camera.target)).normalize();

        let bounds = Aabb::new([9.0, -1.0, -1.0], [11.0, 1.0, 1.0]);
        camera.fit_bounds(&bounds);

        assert_eq!(camera.target, [10.0, 0.0, 0.0]);
        let after = (Point3::from(camera.eye) - Point3::from(camera.target)).normalize();
        assert_relative_eq!(before, after, epsilon = 1e-5);

        // Every corner ends up on screen
        for corner in bounds.corners() {
            let [x, y] = camera.project(corner, 800.0, 800.0).unwrap();
            assert!((0.0..=800.0).contains(&x) && (0.0..=800.0).contains(&y));
        }
    }

    #[test]
    fn test_fit_empty_bounds_is_noop() {
        let mut camera = Camera::default();
        camera.fit_bounds(&Aabb::empty());
        assert_eq!(camera, Camera::default());
    }
}
