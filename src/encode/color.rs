use std::ops::{Add, Div, Mul, Sub};

use bytemuck::{Pod, Zeroable};

/// Three channel color vector used for texels and endpoints.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct Vec3 {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,
}

/// Rec. 601 luma weights.
const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

impl Vec3 {
    pub(crate) const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub(crate) const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    #[inline(always)]
    pub(crate) fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    #[inline(always)]
    pub(crate) fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    #[inline(always)]
    pub(crate) fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline(always)]
    pub(crate) fn sum(self) -> f32 {
        self.x + self.y + self.z
    }

    /// Per channel minimum. Keeps `self` where a channel of `other` is NaN.
    #[inline(always)]
    pub(crate) fn min(self, other: Self) -> Self {
        self.zip(other, |a, b| if b < a { b } else { a })
    }

    /// Per channel maximum. Keeps `self` where a channel of `other` is NaN.
    #[inline(always)]
    pub(crate) fn max(self, other: Self) -> Self {
        self.zip(other, |a, b| if b > a { b } else { a })
    }

    /// Clamps every channel into `[lo, hi]`, NaN channels pass through.
    #[inline(always)]
    pub(crate) fn clamp(self, lo: Self, hi: Self) -> Self {
        Self::new(
            clamp(self.x, lo.x, hi.x),
            clamp(self.y, lo.y, hi.y),
            clamp(self.z, lo.z, hi.z),
        )
    }

    #[inline(always)]
    pub(crate) fn clamp_scalar(self, lo: f32, hi: f32) -> Self {
        self.map(|v| clamp(v, lo, hi))
    }

    #[inline(always)]
    pub(crate) fn log2(self) -> Self {
        self.map(f32::log2)
    }

    #[inline(always)]
    pub(crate) fn exp2(self) -> Self {
        self.map(f32::exp2)
    }

    /// Scales to unit length. A zero vector stays zero.
    #[inline]
    pub(crate) fn normalize(self) -> Self {
        let length = self.dot(self).sqrt();
        if length > 0.0 {
            self / length
        } else {
            Self::splat(0.0)
        }
    }
}

#[inline(always)]
pub(crate) fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

#[inline(always)]
pub(crate) fn saturate(v: f32) -> f32 {
    clamp(v, 0.0, 1.0)
}

impl From<[f32; 3]> for Vec3 {
    #[inline(always)]
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f32; 3] {
    #[inline(always)]
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

macro_rules! impl_vec3_op {
    ($trait:ident, $fn:ident, $op:tt) => {
        impl $trait for Vec3 {
            type Output = Vec3;

            #[inline(always)]
            fn $fn(self, rhs: Vec3) -> Vec3 {
                Vec3::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }

        impl $trait<f32> for Vec3 {
            type Output = Vec3;

            #[inline(always)]
            fn $fn(self, rhs: f32) -> Vec3 {
                Vec3::new(self.x $op rhs, self.y $op rhs, self.z $op rhs)
            }
        }

        impl $trait<Vec3> for f32 {
            type Output = Vec3;

            #[inline(always)]
            fn $fn(self, rhs: Vec3) -> Vec3 {
                Vec3::new(self $op rhs.x, self $op rhs.y, self $op rhs.z)
            }
        }
    };
}

impl_vec3_op!(Add, add, +);
impl_vec3_op!(Sub, sub, -);
impl_vec3_op!(Mul, mul, *);
impl_vec3_op!(Div, div, /);

/// Squared log2 error between an original color `a` and its reconstruction `b`.
///
/// Both colors are offset by one so that black and near black texels do not
/// dominate the error.
#[inline]
pub(crate) fn msle(a: Vec3, b: Vec3, luminance_weights: bool) -> f32 {
    let delta = ((b + 1.0) / (a + 1.0)).log2();
    let delta_sq = delta * delta;

    if luminance_weights {
        (delta_sq * LUMINANCE_WEIGHTS).sum()
    } else {
        delta_sq.sum()
    }
}

/// Squared distance of `point` from the line through `origin` along the unit vector `direction`.
#[inline]
pub(crate) fn dist_to_line_sq(origin: Vec3, direction: Vec3, point: Vec3) -> f32 {
    let w = point - origin;
    let x = w - w.dot(direction) * direction;
    x.dot(x)
}
