//! Fixed-timestep accumulator between the render clock and the physics clock.

#[derive(Clone, Debug)]
pub struct FixedStepper {
    fixed_dt: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedStepper {
    #[must_use]
    pub fn new(fixed_dt: f32, max_steps: u32) -> Self {
        Self {
            fixed_dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Banks `frame_dt` and returns how many fixed steps are now due.
    ///
    /// Past `max_steps`, the backlog is dropped so a long stall does not
    /// snowball into ever longer frames.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.fixed_dt {
            tracing::debug!("Dropping {:.4}s of physics backlog", self.accumulator);
            self.accumulator %= self.fixed_dt;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }
}
