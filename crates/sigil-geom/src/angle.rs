use crate::Vec2;
use std::f32::consts::{PI, TAU};

/// Rotation value with memoized sine and cosine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Angle {
    val: f32,
    sin: f32,
    cos: f32,
}

impl Angle {
    pub const IDENTITY: Angle = Angle {
        val: 0.0,
        sin: 0.0,
        cos: 1.0,
    };

    #[inline]
    pub fn new(radians: f32) -> Self {
        Self {
            val: radians,
            sin: radians.sin(),
            cos: radians.cos(),
        }
    }

    /// Reconstructs the value with `atan2`; the pair is expected to be a
    /// unit direction.
    #[inline]
    pub fn from_sin_cos(sin: f32, cos: f32) -> Self {
        Self {
            val: sin.atan2(cos),
            sin,
            cos,
        }
    }

    #[inline]
    pub fn radians(self) -> f32 {
        self.val
    }

    #[inline]
    pub fn sin(self) -> f32 {
        self.sin
    }

    #[inline]
    pub fn cos(self) -> f32 {
        self.cos
    }

    #[inline]
    pub fn rotate(self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.cos - p.y * self.sin,
            p.x * self.sin + p.y * self.cos,
        )
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Angle of the vector from `a` to `b`, measured from the x-axis toward the
/// y-axis, in [-pi, pi].
#[inline]
pub fn angle_to(a: Vec2, b: Vec2) -> f32 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Wraps an angle into [0, 2*pi).
#[inline]
pub fn normalize_2pi(rad: f32) -> f32 {
    let r = rad % TAU;
    if r < 0.0 { r + TAU } else { r }
}

/// Signed arc with magnitude <= pi such that `from + arc` lands on `to`
/// modulo a full turn.
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let d = normalize_2pi(to - from);
    if d > PI { d - TAU } else { d }
}

/// Angle halfway along the shortest arc from `a` to `b`, in [0, 2*pi).
pub fn middle_angle(a: f32, b: f32) -> f32 {
    normalize_2pi(a + shortest_arc(a, b) * 0.5)
}

/// Running angular average: avg(i) = middle(avg(i-1), a_i).
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleAverage {
    value: f32,
    seeded: bool,
}

impl AngleAverage {
    pub fn add(&mut self, rad: f32) {
        self.value = if self.seeded {
            middle_angle(self.value, rad)
        } else {
            rad
        };
        self.seeded = true;
    }

    pub fn get(&self) -> f32 {
        self.value
    }
}
