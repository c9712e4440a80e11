//! Closed real intervals and conservative interval arithmetic.
//!
//! Intervals bound the value of an expression over a box. The CSG painter
//! uses them to decide whether a whole quad-tree cell is inside or outside a
//! shape without visiting its pixels.

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed interval `[low, high]`. An interval with `low > high` is empty.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: CoordF,
    pub high: CoordF,
}

impl Interval {
    /// Create an interval, ordering the bounds.
    #[inline]
    pub fn new(a: CoordF, b: CoordF) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The degenerate interval `[v, v]`.
    #[inline]
    pub const fn point(v: CoordF) -> Self {
        Self { low: v, high: v }
    }

    /// The empty interval.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            low: CoordF::INFINITY,
            high: CoordF::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Width of the interval (zero when empty).
    #[inline]
    pub fn length(&self) -> CoordF {
        if self.is_empty() {
            0.0
        } else {
            self.high - self.low
        }
    }

    #[inline]
    pub fn centre(&self) -> CoordF {
        0.5 * (self.low + self.high)
    }

    /// Grow the interval to include `v`.
    pub fn expand_to(&mut self, v: CoordF) {
        self.low = self.low.min(v);
        self.high = self.high.max(v);
    }

    /// Widen both ends by `d` (negative `d` shrinks).
    pub fn offset(&self, d: CoordF) -> Interval {
        if self.is_empty() {
            return *self;
        }
        Interval {
            low: self.low - d,
            high: self.high + d,
        }
    }

    #[inline]
    pub fn contains(&self, v: CoordF) -> bool {
        v >= self.low && v <= self.high
    }

    /// True when the interval straddles (or touches) zero, i.e. the sign of
    /// the expression it bounds is undetermined.
    #[inline]
    pub fn zero(&self) -> bool {
        self.low <= 0.0 && self.high >= 0.0
    }

    /// Interval sum.
    #[inline]
    pub fn add(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low + other.low,
            high: self.high + other.high,
        }
    }

    /// Interval plus a scalar.
    #[inline]
    pub fn add_scalar(&self, v: CoordF) -> Interval {
        Interval {
            low: self.low + v,
            high: self.high + v,
        }
    }

    /// Interval difference.
    #[inline]
    pub fn sub(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low - other.high,
            high: self.high - other.low,
        }
    }

    /// Interval product.
    pub fn mul(&self, other: &Interval) -> Interval {
        let products = [
            self.low * other.low,
            self.low * other.high,
            self.high * other.low,
            self.high * other.high,
        ];
        let mut result = Interval::empty();
        for p in products {
            result.expand_to(p);
        }
        result
    }

    /// Interval scaled by a scalar; a negative factor swaps the bounds.
    #[inline]
    pub fn mul_scalar(&self, v: CoordF) -> Interval {
        Interval::new(self.low * v, self.high * v)
    }

    /// Bound of `min(a, b)` over both intervals.
    #[inline]
    pub fn min(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.min(other.low),
            high: self.high.min(other.high),
        }
    }

    /// Bound of `max(a, b)` over both intervals.
    #[inline]
    pub fn max(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.max(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Smallest interval containing both.
    pub fn union(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Interval {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Overlap of both intervals (possibly empty).
    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.max(other.low),
            high: self.high.min(other.high),
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::empty()
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[empty]")
        } else {
            write!(f, "[{}, {}]", self.low, self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Interval::new(1.0, 2.0);
        let b = Interval::new(-3.0, 4.0);
        assert_eq!(a.add(&b), Interval::new(-2.0, 6.0));
        assert_eq!(a.sub(&b), Interval::new(-3.0, 5.0));
        assert_eq!(a.mul(&b), Interval::new(-6.0, 8.0));
        assert_eq!(a.mul_scalar(-2.0), Interval::new(-4.0, -2.0));
    }

    #[test]
    fn test_zero() {
        assert!(Interval::new(-1.0, 1.0).zero());
        assert!(Interval::new(0.0, 1.0).zero());
        assert!(!Interval::new(0.5, 1.0).zero());
        assert!(!Interval::new(-2.0, -0.1).zero());
    }

    #[test]
    fn test_empty() {
        let e = Interval::empty();
        assert!(e.is_empty());
        assert_eq!(e.length(), 0.0);
        let a = Interval::new(1.0, 3.0);
        assert_eq!(e.union(&a), a);
        assert!(a.intersection(&Interval::new(4.0, 5.0)).is_empty());
    }

    #[test]
    fn test_min_max() {
        let a = Interval::new(1.0, 5.0);
        let b = Interval::new(2.0, 3.0);
        assert_eq!(a.min(&b), Interval::new(1.0, 3.0));
        assert_eq!(a.max(&b), Interval::new(2.0, 5.0));
    }
}
