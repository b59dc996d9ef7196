//! Ray casts against card boxes, used to decide which card a pointer grabs.

use glam::{Quat, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Distance along `ray` to the first hit on an oriented box, if any.
#[must_use]
pub fn intersect_box(ray: &Ray, center: Vec3, rotation: Quat, half_extents: Vec3) -> Option<f32> {
    let inverse = rotation.inverse();
    let origin = inverse * (ray.origin - center);
    let direction = inverse * ray.direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, h) = (origin[axis], direction[axis], half_extents[axis]);
        if d.abs() < 1e-8 {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let a = (-h - o) / d;
        let b = (h - o) / d;
        t_min = t_min.max(a.min(b));
        t_max = t_max.min(a.max(b));
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CARD: Vec3 = Vec3::new(0.8, 1.125, 0.01);

    #[test]
    fn straight_hit_reports_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = intersect_box(&ray, Vec3::ZERO, Quat::IDENTITY, CARD).unwrap();
        assert_relative_eq!(t, 9.99, epsilon = 1e-4);
    }

    #[test]
    fn miss_beside_the_card() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_box(&ray, Vec3::ZERO, Quat::IDENTITY, CARD).is_none());
    }

    #[test]
    fn turned_card_is_hit_edge_on_only_within_depth() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_box(&ray, Vec3::ZERO, rotation, CARD).is_none());
        let ray = Ray::new(Vec3::new(0.005, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_box(&ray, Vec3::ZERO, rotation, CARD).is_some());
    }

    #[test]
    fn box_behind_the_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::NEG_Z);
        assert!(intersect_box(&ray, Vec3::ZERO, Quat::IDENTITY, CARD).is_none());
    }
}
