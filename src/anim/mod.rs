pub mod damp;
pub mod ease;
pub mod tween;

pub use damp::Damped;
pub use ease::Ease;
pub use tween::{Timing, TweenManager};
