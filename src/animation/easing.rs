//! Interpolation curves.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// How a value moves from its start to its end over a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Quarter cosine curve, used by every progress transition.
    #[default]
    CosineOut,
    /// Constant speed, for effects that advance by a fixed step per frame.
    Linear,
}

impl Easing {
    /// Value after `elapsed` of `duration`, moving `change` away from `start`.
    ///
    /// Under `rtl` the value moves towards smaller numbers. Past the end of
    /// the traversal the exact end value is returned.
    pub fn value(self, elapsed: f64, start: f64, change: f64, duration: f64, rtl: bool) -> f64 {
        if duration <= 0.0 || elapsed >= duration {
            return end_value(start, change, rtl);
        }
        let elapsed = elapsed.max(0.0);
        match self {
            Self::CosineOut => cosine_out(elapsed, start, change, duration, rtl),
            Self::Linear => {
                let step = change * elapsed / duration;
                if rtl {
                    start - step
                } else {
                    start + step
                }
            }
        }
    }
}

/// `s * cos(t / d * π/2) + (start + dir * change)` with `s = -dir * change`.
pub fn cosine_out(elapsed: f64, start: f64, change: f64, duration: f64, rtl: bool) -> f64 {
    let (scale, offset) = if rtl {
        (change, start - change)
    } else {
        (-change, start + change)
    };
    scale * (elapsed / duration * FRAC_PI_2).cos() + offset
}

/// Where a traversal ends.
pub fn end_value(start: f64, change: f64, rtl: bool) -> f64 {
    if rtl {
        start - change
    } else {
        start + change
    }
}
