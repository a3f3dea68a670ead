//! Toroidal geometry primitives.
//!
//! The arena wraps on both axes, so every proximity, steering, and collision
//! computation in this crate goes through [`Arena::delta`] instead of a raw
//! Euclidean difference. The shortest displacement is the modulo-centred
//! delta, which is equivalent to taking the minimum over the 3×3 tiling of
//! the arena.

use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D vector in arena pixels (or pixels per tick for velocities).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle of this vector in radians, in (-π, π].
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Returns the unit vector, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Counter-clockwise perpendicular (rotates by +90° in screen space).
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Shortest displacement between two points on the torus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrappedDelta {
    pub dx: f64,
    pub dy: f64,
    pub distance: f64,
}

impl WrappedDelta {
    pub fn vector(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }

    /// Bearing of the displacement in radians.
    pub fn bearing(&self) -> f64 {
        self.dy.atan2(self.dx)
    }
}

/// Rectangular play field whose axes wrap to the opposite edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Shortest displacement from `a` to `b` (i.e. `b - a` wrapped).
    pub fn delta(&self, a: Vec2, b: Vec2) -> WrappedDelta {
        let dx = wrap_centered(b.x - a.x, self.width);
        let dy = wrap_centered(b.y - a.y, self.height);
        WrappedDelta {
            dx,
            dy,
            distance: dx.hypot(dy),
        }
    }

    pub fn distance(&self, a: Vec2, b: Vec2) -> f64 {
        self.delta(a, b).distance
    }

    /// Wraps a position into `[0, width) × [0, height)`.
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }
}

fn wrap_axis(v: f64, span: f64) -> f64 {
    let w = v.rem_euclid(span);
    // rem_euclid rounds tiny negatives up to exactly `span`
    if w >= span { 0.0 } else { w }
}

/// Free-function form of [`Arena::delta`] over raw coordinates.
pub fn wrapped_delta(ax: f64, ay: f64, bx: f64, by: f64, width: f64, height: f64) -> WrappedDelta {
    Arena::new(width, height).delta(Vec2::new(ax, ay), Vec2::new(bx, by))
}

/// Maps `d` into `[-span/2, span/2)`.
fn wrap_centered(d: f64, span: f64) -> f64 {
    let half = span * 0.5;
    (d + half).rem_euclid(span) - half
}

/// Normalises an angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn delta_prefers_wrapped_path() {
        let arena = Arena::new(1000.0, 800.0);
        let d = arena.delta(Vec2::new(10.0, 10.0), Vec2::new(990.0, 790.0));

        assert!((d.dx - -20.0).abs() < EPS);
        assert!((d.dy - -20.0).abs() < EPS);
        assert!((d.distance - 20.0_f64.hypot(20.0)).abs() < EPS);
    }

    #[test]
    fn delta_is_antisymmetric_and_never_longer_than_euclidean() {
        let arenas = [
            Arena::new(1000.0, 800.0),
            Arena::new(37.5, 1200.0),
            Arena::new(1.0, 1.0),
        ];
        let points = [
            (0.0, 0.0),
            (12.0, 790.0),
            (499.0, 401.0),
            (999.0, 0.5),
            (250.25, 33.0),
        ];

        for arena in arenas {
            for &(ax, ay) in &points {
                for &(bx, by) in &points {
                    let a = arena.wrap(Vec2::new(ax, ay));
                    let b = arena.wrap(Vec2::new(bx, by));
                    let ab = arena.delta(a, b);
                    let ba = arena.delta(b, a);
                    let euclid = (b - a).length();

                    assert!(ab.distance <= euclid + EPS);
                    assert!((ab.distance - ba.distance).abs() < EPS);
                    // Exact half-span ties may pick either sign; only the
                    // magnitude is meaningful there.
                    if (ab.dx.abs() - arena.width * 0.5).abs() > EPS {
                        assert!((ab.dx + ba.dx).abs() < EPS);
                    }
                    if (ab.dy.abs() - arena.height * 0.5).abs() > EPS {
                        assert!((ab.dy + ba.dy).abs() < EPS);
                    }
                }
            }
        }
    }

    #[test]
    fn free_function_matches_arena_method() {
        let d = wrapped_delta(5.0, 5.0, 95.0, 50.0, 100.0, 100.0);
        assert!((d.dx - -10.0).abs() < EPS);
        assert!((d.dy - 45.0).abs() < EPS);
    }

    #[test]
    fn wrap_keeps_positions_in_bounds() {
        let arena = Arena::new(100.0, 50.0);
        let p = arena.wrap(Vec2::new(-1.0, 50.0));
        assert!((p.x - 99.0).abs() < EPS);
        assert!(p.y.abs() < EPS);

        let q = arena.wrap(Vec2::new(250.0, -125.0));
        assert!((q.x - 50.0).abs() < EPS);
        assert!((q.y - 25.0).abs() < EPS);
    }

    #[test]
    fn normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI).abs() - PI).abs() < 1e-12);
        assert!((normalize_angle(-0.5) - -0.5).abs() < EPS);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < EPS);
    }

    #[test]
    fn invalid_arena_detected() {
        assert!(!Arena::new(0.0, 10.0).is_valid());
        assert!(!Arena::new(f64::NAN, 10.0).is_valid());
        assert!(Arena::new(1.0, 1.0).is_valid());
    }
}
