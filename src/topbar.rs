//! Top bar: the logo that resets the gallery, plus the full-screen cover
//! that masks the jump back to the carousel.

use crate::anim::Ease;
use crate::state::InteractionState;

/// Seconds the cover takes to grow over the whole screen.
pub const COVER_DURATION: f32 = 6.0;
/// Seconds the cover stays fully closed before vanishing.
pub const COVER_HOLD: f32 = 0.1;
/// Cover scale at full coverage.
pub const COVER_MAX_SCALE: f32 = 200.0;
/// Logo hit box in physical pixels, anchored top-left.
pub const LOGO_BOX: f32 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CoverPhase {
    Hidden,
    Growing { from: f32, elapsed: f32 },
    Holding { elapsed: f32 },
}

/// Circular overlay that grows from the logo until it covers the screen,
/// holds briefly, then disappears at once.
#[derive(Debug, Clone, Copy)]
pub struct CoverReveal {
    phase: CoverPhase,
}

impl CoverReveal {
    pub fn new() -> Self {
        Self {
            phase: CoverPhase::Hidden,
        }
    }

    /// Start (or restart) growing from the current scale.
    pub fn play(&mut self) {
        self.phase = CoverPhase::Growing {
            from: self.scale(),
            elapsed: 0.0,
        };
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase = match self.phase {
            CoverPhase::Hidden => CoverPhase::Hidden,
            CoverPhase::Growing { from, elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= COVER_DURATION {
                    CoverPhase::Holding {
                        elapsed: elapsed - COVER_DURATION,
                    }
                } else {
                    CoverPhase::Growing { from, elapsed }
                }
            }
            CoverPhase::Holding { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= COVER_HOLD {
                    log::debug!("Cover released");
                    CoverPhase::Hidden
                } else {
                    CoverPhase::Holding { elapsed }
                }
            }
        };
    }

    /// 0 when hidden, up to [`COVER_MAX_SCALE`] when closed.
    pub fn scale(&self) -> f32 {
        match self.phase {
            CoverPhase::Hidden => 0.0,
            CoverPhase::Growing { from, elapsed } => {
                let t = Ease::Power2InOut.apply(elapsed / COVER_DURATION);
                from + (COVER_MAX_SCALE - from) * t
            }
            CoverPhase::Holding { .. } => COVER_MAX_SCALE,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != CoverPhase::Hidden
    }
}

/// The top bar as seen by the gallery: one reset action.
pub struct TopBar {
    pub cover: CoverReveal,
}

impl TopBar {
    pub fn new() -> Self {
        Self {
            cover: CoverReveal::new(),
        }
    }

    /// Collapse the gallery and play the cover. The cover is cosmetic; the
    /// collapse doesn't wait for it.
    pub fn trigger_reset(&mut self, state: &mut InteractionState) {
        log::info!("Top bar reset");
        state.set(false);
        self.cover.play();
    }

    /// Whether a click at physical `(x, y)` lands on the logo.
    pub fn hits_logo(x: f32, y: f32) -> bool {
        (0.0..LOGO_BOX).contains(&x) && (0.0..LOGO_BOX).contains(&y)
    }
}
