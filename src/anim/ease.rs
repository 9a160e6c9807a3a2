/// Easing curves used by one-shot tweens.
///
/// Names follow the usual tweening vocabulary: `PowerN` is a polynomial of
/// degree N+1, `Circ` is a quarter circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Power1Out,
    Power2InOut,
    CircOut,
}

impl Ease {
    /// Map normalized progress `t` in [0, 1] to eased progress.
    /// Input outside the range is clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
            Ease::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
        }
    }
}
