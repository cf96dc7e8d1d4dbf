// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// Both edges are inclusive: a box whose `max_x` lies exactly on a cell
/// boundary also touches the cell on the far side of that boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// A zero-area box located at a single point.
    #[inline]
    pub const fn from_point(x: T, y: T) -> Self {
        Self::new(x, y, x, y)
    }

    /// The same box with each axis ordered so that `min <= max`.
    #[inline]
    pub fn normalized(&self) -> Self {
        Self {
            min_x: min_t(self.min_x, self.max_x),
            min_y: min_t(self.min_y, self.max_y),
            max_x: max_t(self.min_x, self.max_x),
            max_y: max_t(self.min_y, self.max_y),
        }
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// Note that the edge of the AABB is considered to be part of itself, meaning
    /// that two AABBs that share an edge are considered to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use proximity_grid::Aabb2D;
    ///
    /// let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(!a.overlaps(&Aabb2D::new(11.0, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from origin and size.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: T::add(x, w),
            max_y: T::add(y, h),
        }
    }

    /// The square enclosing a circle of `radius` around `(cx, cy)`.
    ///
    /// Negative radii are clamped to zero, so the result is never inverted.
    #[inline]
    pub fn around(cx: T, cy: T, radius: T) -> Self {
        let r = T::max(radius, T::zero());
        Self {
            min_x: T::sub(cx, r),
            min_y: T::sub(cy, r),
            max_x: T::add(cx, r),
            max_y: T::add(cy, r),
        }
    }
}

/// Numeric scalar abstraction for 2D AABBs.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Min of the two scalar values.
    fn min(a: Self, b: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }
}

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        core::cmp::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        core::cmp::min(a, b)
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}
