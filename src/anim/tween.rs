use glam::Vec3;

use super::ease::Ease;

/// How a tween runs: length, start delay and curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Seconds from first write to completion.
    pub duration: f32,
    /// Seconds to wait before the tween starts writing.
    pub delay: f32,
    pub ease: Ease,
}

impl Timing {
    pub const fn new(duration: f32, ease: Ease) -> Self {
        Self {
            duration,
            delay: 0.0,
            ease,
        }
    }

    pub const fn delayed(self, delay: f32) -> Self {
        Self { delay, ..self }
    }

    /// Total seconds until the tween lands.
    pub fn total(&self) -> f32 {
        self.delay + self.duration
    }
}

/// One in-flight interpolation from `from` to `to`.
#[derive(Debug, Clone, Copy)]
struct Tween<K> {
    key: K,
    from: Vec3,
    to: Vec3,
    elapsed: f32,
    timing: Timing,
}

impl<K> Tween<K> {
    /// Value at the current elapsed time, or None while still delayed.
    fn sample(&self) -> Option<Vec3> {
        let active = self.elapsed - self.timing.delay;
        if active < 0.0 {
            return None;
        }
        if self.timing.duration <= 0.0 || active >= self.timing.duration {
            return Some(self.to);
        }
        let t = self.timing.ease.apply(active / self.timing.duration);
        Some(self.from.lerp(self.to, t))
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.timing.total()
    }
}

/// Shared timeline of one-shot tweens, advanced once per frame.
///
/// Each tween is addressed by a key (typically entity + channel). Starting a
/// tween on a key that already has one replaces it, so a value is never
/// driven by two tweens at once.
pub struct TweenManager<K> {
    tweens: Vec<Tween<K>>,
}

impl<K: Copy + PartialEq + std::fmt::Debug> TweenManager<K> {
    pub fn new() -> Self {
        Self { tweens: Vec::new() }
    }

    /// Start tweening `key` from `from` to `to`. Any tween already driving
    /// `key` is cancelled. Returns true if one was replaced.
    pub fn start(&mut self, key: K, from: Vec3, to: Vec3, timing: Timing) -> bool {
        let replaced = self.cancel(key);
        self.tweens.push(Tween {
            key,
            from,
            to,
            elapsed: 0.0,
            timing,
        });
        replaced
    }

    /// Drop the tween driving `key`, if any.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.key != key);
        self.tweens.len() != before
    }

    /// Drop every tween whose key matches.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) {
        self.tweens.retain(|t| !pred(&t.key));
    }

    /// Advance all tweens by `dt` and hand each sampled value to `apply`.
    ///
    /// When `apply` returns false the key no longer resolves to anything and
    /// the tween is discarded. Finished tweens write their exact end value
    /// once and are then removed.
    pub fn advance(&mut self, dt: f32, mut apply: impl FnMut(K, Vec3) -> bool) {
        self.tweens.retain_mut(|tween| {
            tween.elapsed += dt;
            let Some(value) = tween.sample() else {
                return true;
            };
            if !apply(tween.key, value) {
                log::trace!("Dropping tween for unresolved target {:?}", tween.key);
                return false;
            }
            !tween.finished()
        });
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn timing(duration: f32) -> Timing {
        Timing::new(duration, Ease::Power1Out)
    }

    /// Run until idle and collect the last value written per key.
    fn finish(tm: &mut TweenManager<u32>) -> Vec<(u32, Vec3)> {
        let mut last: Vec<(u32, Vec3)> = Vec::new();
        while !tm.is_idle() {
            tm.advance(DT, |key, v| {
                match last.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = v,
                    None => last.push((key, v)),
                }
                true
            });
        }
        last.sort_by_key(|(k, _)| *k);
        last
    }

    #[test]
    fn lands_exactly_on_target() {
        let mut tm = TweenManager::new();
        let to = Vec3::new(0.3, -1.7, 2.9);
        tm.start(0u32, Vec3::ZERO, to, Timing::new(1.0, Ease::Power2InOut));

        let mut last = Vec3::ZERO;
        for _ in 0..80 {
            tm.advance(DT, |_, v| {
                last = v;
                true
            });
        }
        assert_eq!(last, to);
        assert!(tm.is_idle());
    }

    #[test]
    fn restart_replaces_previous_tween() {
        let mut tm = TweenManager::new();
        tm.start(7u32, Vec3::ZERO, Vec3::X, timing(1.0));
        assert!(tm.start(7, Vec3::ZERO, Vec3::Y, timing(1.0)));
        assert_eq!(tm.len(), 1);
        assert_eq!(finish(&mut tm), vec![(7, Vec3::Y)]);
    }

    #[test]
    fn delay_holds_off_writes() {
        let mut tm = TweenManager::new();
        tm.start(1u32, Vec3::ZERO, Vec3::ONE, timing(1.0).delayed(0.5));
        let mut writes = 0;
        for _ in 0..20 {
            tm.advance(DT, |_, _| {
                writes += 1;
                true
            });
        }
        assert_eq!(writes, 0);
        for _ in 0..20 {
            tm.advance(DT, |_, _| {
                writes += 1;
                true
            });
        }
        assert!(writes > 0);
    }

    #[test]
    fn unresolved_target_is_dropped() {
        let mut tm = TweenManager::new();
        tm.start(1u32, Vec3::ZERO, Vec3::ONE, timing(1.0));
        tm.start(2u32, Vec3::ZERO, Vec3::ONE, timing(1.0));
        tm.advance(DT, |key, _| key != 2);
        assert_eq!(tm.len(), 1);
        assert_eq!(finish(&mut tm), vec![(1, Vec3::ONE)]);
    }

    #[test]
    fn cancel_where_filters_by_key() {
        let mut tm = TweenManager::new();
        for k in 0u32..6 {
            tm.start(k, Vec3::ZERO, Vec3::ONE, timing(1.0));
        }
        tm.cancel_where(|k| k % 2 == 0);
        assert_eq!(tm.len(), 3);
        let keys: Vec<u32> = finish(&mut tm).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 3, 5]);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut tm = TweenManager::new();
        tm.start(0u32, Vec3::ZERO, Vec3::splat(4.0), timing(0.0));
        let mut got = Vec3::ZERO;
        tm.advance(DT, |_, v| {
            got = v;
            true
        });
        assert_eq!(got, Vec3::splat(4.0));
        assert!(tm.is_idle());
    }
}
