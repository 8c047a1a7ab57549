//! # Incremental Animation State Machine
//!
//! A [`StepAnimation`] walks a scalar quantity toward a target in bounded
//! steps: every tick advances by a fixed fraction of the target, and the
//! final tick applies the exact remainder so the animation lands on the
//! target without overshoot. The driver is deliberately free of timers and
//! callbacks; the embedding loop calls [`StepAnimation::advance`] once per
//! scheduled tick and stops rescheduling when it sees [`Step::Finished`].

/// Fraction of the target applied per tick by board animations.
pub const DEFAULT_STEP_RATIO: f32 = 0.05;

/// Outcome of a single animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A partial step of the given delta; more ticks are needed.
    Partial(f32),
    /// The final step. The delta is the exact remaining distance to the
    /// target; after applying it the animation is complete.
    Finished(f32),
}

impl Step {
    /// The delta to apply this tick, regardless of completion.
    pub fn delta(&self) -> f32 {
        match *self {
            Step::Partial(d) | Step::Finished(d) => d,
        }
    }

    /// Whether this was the final tick.
    pub fn is_finished(&self) -> bool {
        matches!(self, Step::Finished(_))
    }
}

/// Incremental convergence toward a scalar target.
///
/// The target may be a translation distance or a rotation angle; the driver
/// does not care. Merging further requests into an in-flight animation is
/// supported through [`extend`](StepAnimation::extend).
#[derive(Debug, Clone, PartialEq)]
pub struct StepAnimation {
    target: f32,
    current: f32,
    step_ratio: f32,
}

impl StepAnimation {
    /// Starts a new animation toward `target`.
    ///
    /// A zero-magnitude target is already converged: no state is created and
    /// no tick should be scheduled.
    pub fn new(target: f32, step_ratio: f32) -> Option<Self> {
        if target == 0.0 {
            return None;
        }
        Some(Self {
            target,
            current: 0.0,
            step_ratio,
        })
    }

    /// Merges an additional delta into the outstanding target.
    pub fn extend(&mut self, extra: f32) {
        self.target += extra;
    }

    /// Advances one tick.
    ///
    /// The step size is `target * step_ratio`, applied toward the remaining
    /// delta. Once the remainder is no larger than one step, the remainder
    /// itself is returned and the animation snaps to the target exactly.
    pub fn advance(&mut self) -> Step {
        let remaining = self.target - self.current;
        let step = self.target * self.step_ratio;
        if step == 0.0 || remaining.abs() <= step.abs() {
            self.current = self.target;
            return Step::Finished(remaining);
        }
        // Step magnitude comes from the target, direction from the
        // remainder, so a merged target on the far side still converges.
        let applied = step.abs() * remaining.signum();
        self.current += applied;
        Step::Partial(applied)
    }

    /// The full target delta.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Progress accumulated so far.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Delta still to be applied.
    pub fn remaining(&self) -> f32 {
        self.target - self.current
    }
}
