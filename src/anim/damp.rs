/// Distance below which a damped value snaps onto its target.
const SNAP_EPSILON: f32 = 0.001;
/// Smallest smooth time accepted (avoids division by zero).
const MIN_SMOOTH_TIME: f32 = 0.0001;

/// A scalar that follows a moving target with a critically damped spring.
///
/// Frame-rate independent: the update integrates the spring analytically
/// for the given `dt`, so one 100ms step lands close to ten 10ms steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damped {
    pub value: f32,
    velocity: f32,
}

impl Damped {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Advance toward `target`. `smooth_time` is roughly the time it takes
    /// to cover most of the distance.
    ///
    /// Returns false once the value has settled on the target.
    pub fn damp(&mut self, target: f32, smooth_time: f32, dt: f32) -> bool {
        if (self.value - target).abs() <= SNAP_EPSILON {
            self.value = target;
            self.velocity = 0.0;
            return false;
        }
        if dt <= 0.0 || !dt.is_finite() {
            return true;
        }

        let omega = 2.0 / smooth_time.max(MIN_SMOOTH_TIME);
        let decay = (-omega * dt).exp();
        let change = self.value - target;
        let temp = (self.velocity + omega * change) * dt;

        self.velocity = (self.velocity - omega * temp) * decay;
        let mut next = target + (change + temp) * decay;

        // Never overshoot the target.
        if (target - self.value > 0.0) == (next > target) {
            next = target;
            self.velocity = 0.0;
        }
        self.value = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mut d: Damped, target: f32, smooth: f32, dt: f32, seconds: f32) -> Damped {
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            d.damp(target, smooth, dt);
        }
        d
    }

    #[test]
    fn converges_within_five_time_constants() {
        let d = run(Damped::new(1.0), 1.15, 0.1, 1.0 / 60.0, 0.5);
        assert!((d.value - 1.15).abs() < 1.15 * 0.01, "got {}", d.value);
    }

    #[test]
    fn stable_under_variable_frame_times() {
        let mut d = Damped::new(0.0);
        let frames = [0.004, 0.25, 0.016, 0.1, 0.033, 0.5, 0.001];
        for _ in 0..10 {
            for dt in frames {
                d.damp(-1.5, 0.2 / 3.0, dt);
                assert!(d.value <= 0.0 && d.value >= -1.5, "overshoot: {}", d.value);
            }
        }
        assert_eq!(d.value, -1.5);
    }

    #[test]
    fn coarse_and_fine_steps_agree() {
        let fine = run(Damped::new(0.0), 1.0, 0.2, 0.001, 0.3);
        let coarse = run(Damped::new(0.0), 1.0, 0.2, 0.05, 0.3);
        assert!((fine.value - coarse.value).abs() < 0.02);
    }

    #[test]
    fn settled_value_reports_idle() {
        let mut d = Damped::new(0.25);
        assert!(!d.damp(0.25, 0.2, 0.016));
        assert!(d.damp(0.1, 0.2, 0.016));
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut d = Damped::new(1.5);
        d.damp(1.0, 0.2, 0.0);
        assert_eq!(d.value, 1.5);
    }
}
