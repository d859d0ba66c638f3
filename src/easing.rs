//! Easing curves over `t ∈ [0, 1]`.
//!
//! Transitions use [`ease_in_out_quint`]; it is monotonic and never
//! overshoots. The cubic and back-out curves are kept for callers that want
//! a softer or springier feel.
//!
//! | Curve | Overshoot |
//! |-------|-----------|
//! | [`Easing::Quint`] | no |
//! | [`Easing::Cubic`] | no |
//! | [`Easing::BackOut`] | yes, ~10% past 1 |

use serde::{Deserialize, Serialize};

/// Selectable easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Quint,
    Cubic,
    BackOut,
}

impl Easing {
    /// Evaluate the curve. `t` is clamped to `[0, 1]` first.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Quint => ease_in_out_quint(t),
            Easing::Cubic => ease_in_out_cubic(t),
            Easing::BackOut => ease_out_back(t),
        }
    }
}

/// `16t⁵` for the first half, `1 - (-2t + 2)⁵ / 2` for the second.
#[inline]
pub fn ease_in_out_quint(t: f32) -> f32 {
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
    }
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t.powi(3)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[inline]
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
}
