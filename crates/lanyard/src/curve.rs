//! # Curve Sampler
//!
//! Turns the chain's body positions into the polyline the rope is drawn with.
//!
//! J1 and J2 are not drawn where the solver put them. Each carries a visual
//! position that chases the true one at a speed growing with the gap, so the
//! rope lags behind fast motion and snaps back elastically. The control
//! points `[j3, lagged j2, lagged j1, anchor]` are then fitted with a
//! Catmull-Rom spline and sampled uniformly in the curve parameter.

use glam::Vec3;

use crate::chain::ChainTransforms;
use crate::config::{CurveConfig, Parameterization};

/// Points emitted per update.
pub const CURVE_SAMPLES: usize = 32;

/// Chase speed for a visual-to-true distance, in `[min_speed, max_speed]`.
#[must_use]
pub fn speed_factor(distance: f32, config: &CurveConfig) -> f32 {
    let clamped = clamped_distance(distance, config);
    config.min_speed + clamped * (config.max_speed - config.min_speed)
}

/// Distance input of [`speed_factor`], in `[min_distance, max_distance]`.
#[must_use]
pub fn clamped_distance(distance: f32, config: &CurveConfig) -> f32 {
    if distance.is_nan() {
        return config.min_distance;
    }
    distance.clamp(config.min_distance, config.max_distance)
}

/// Visually lagged position of one intermediate joint.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VisualLag {
    position: Option<Vec3>,
}

impl VisualLag {
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    /// Moves toward `target` and returns the new visual position. The first
    /// call adopts `target` as is.
    pub fn chase(&mut self, target: Vec3, dt: f32, config: &CurveConfig) -> Vec3 {
        let current = *self.position.get_or_insert(target);
        let speed = speed_factor(current.distance(target), config);
        let t = (dt.max(0.0) * speed).min(1.0);
        let next = current.lerp(target, t);
        self.position = Some(next);
        next
    }
}

#[derive(Clone, Debug)]
pub struct CurveSampler {
    config: CurveConfig,
    j1: VisualLag,
    j2: VisualLag,
    controls: [Vec3; 4],
    points: Vec<Vec3>,
}

impl CurveSampler {
    #[must_use]
    pub fn new(config: CurveConfig) -> Self {
        Self {
            config,
            j1: VisualLag::default(),
            j2: VisualLag::default(),
            controls: [Vec3::ZERO; 4],
            points: vec![Vec3::ZERO; CURVE_SAMPLES],
        }
    }

    /// Advances the lag state by `dt` and resamples the curve.
    pub fn update(&mut self, dt: f32, transforms: &ChainTransforms) -> &[Vec3] {
        let j2 = self.j2.chase(transforms.j2.position, dt, &self.config);
        let j1 = self.j1.chase(transforms.j1.position, dt, &self.config);
        self.controls = [transforms.j3.position, j2, j1, transforms.anchor.position];
        let spline = CatmullRom::new(self.controls, self.config.parameterization);
        for (i, point) in self.points.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / (CURVE_SAMPLES - 1) as f32;
            *point = spline.point(t);
        }
        &self.points
    }

    /// Polyline from the last update, J3 first, anchor last.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[must_use]
    pub fn control_points(&self) -> [Vec3; 4] {
        self.controls
    }

    #[must_use]
    pub fn lag(&self) -> (VisualLag, VisualLag) {
        (self.j1, self.j2)
    }
}

/// Open Catmull-Rom spline through a fixed set of control points.
#[derive(Clone, Debug)]
pub struct CatmullRom<const N: usize> {
    points: [Vec3; N],
    alpha: f32,
}

impl<const N: usize> CatmullRom<N> {
    #[must_use]
    pub fn new(points: [Vec3; N], parameterization: Parameterization) -> Self {
        Self {
            points,
            alpha: parameterization.alpha(),
        }
    }

    /// Point at `t` in `[0, 1]`; each segment spans an equal share of `t`.
    #[must_use]
    pub fn point(&self, t: f32) -> Vec3 {
        if N < 2 {
            return self.points.first().copied().unwrap_or(Vec3::ZERO);
        }
        #[allow(clippy::cast_precision_loss)]
        let scaled = t.clamp(0.0, 1.0) * (N - 1) as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut segment = scaled.floor() as usize;
        #[allow(clippy::cast_precision_loss)]
        let mut weight = scaled - segment as f32;
        if segment >= N - 1 {
            segment = N - 2;
            weight = 1.0;
        }

        let p1 = self.points[segment];
        let p2 = self.points[segment + 1];
        // End segments extrapolate a phantom neighbour.
        let p0 = if segment > 0 { self.points[segment - 1] } else { p1 * 2.0 - p2 };
        let p3 = if segment + 2 < N { self.points[segment + 2] } else { p2 * 2.0 - p1 };
        self.segment_point(p0, p1, p2, p3, weight)
    }

    fn segment_point(&self, p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, w: f32) -> Vec3 {
        let knot = |a: Vec3, b: Vec3| a.distance(b).powf(self.alpha);
        let mut dt1 = knot(p1, p2);
        let mut dt0 = knot(p0, p1);
        let mut dt2 = knot(p2, p3);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        // Cubic Hermite on the unit interval.
        let c0 = p1;
        let c1 = t1;
        let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
        let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;
        c0 + w * (c1 + w * (c2 + w * c3))
    }
}
