// Copyright (c) 2025 Ken Barker

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The angular module contains the `AngularDistance` and `AngularExtent` types.
//!
//! Both types represent an angle in the range [0, π] radians by its cosine
//! (and, for `AngularExtent`, its sine), so that spatial comparisons can be
//! performed with dot products instead of inverse trigonometric functions.
//!
//! Since cosine decreases monotonically over [0, π], the order of the cosines
//! is the reverse of the order of the angles.

#![allow(clippy::float_cmp)]

use crate::GeometryError;
use angle_sc::{is_within_tolerance, trig, Angle, Radians};
use core::cmp::Ordering;
use core::ops::{Add, Sub};

/// The tolerance used to compare cosines.
/// Angles whose cosines are within this tolerance compare as equal.
pub const COSINE_EPSILON: f64 = 1.0e-12;

/// Whether `angle` is in the range [0, π] radians.
fn is_valid_angle(angle: Radians) -> bool {
    (0.0..=core::f64::consts::PI).contains(&angle.0)
}

/// Compare cosines in reverse order, treating cosines within
/// `COSINE_EPSILON` of each other as equal.
fn compare_cosines(lhs: f64, rhs: f64) -> Ordering {
    if is_within_tolerance(lhs, rhs, COSINE_EPSILON) {
        Ordering::Equal
    } else if lhs > rhs {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// An angular distance in the range [0, π] radians, stored as its cosine.
#[derive(Clone, Copy, Debug)]
pub struct AngularDistance {
    cosine: f64,
}

impl AngularDistance {
    /// An angular distance of zero radians.
    pub const ZERO: Self = Self { cosine: 1.0 };
    /// An angular distance of π/2 radians.
    pub const HALF_PI: Self = Self { cosine: 0.0 };
    /// An angular distance of π radians.
    pub const PI: Self = Self { cosine: -1.0 };

    /// Create an `AngularDistance` from the cosine of an angle.
    /// The cosine is clamped to the range [-1, 1].
    #[must_use]
    pub fn create_from_cosine(cosine: f64) -> Self {
        Self {
            cosine: trig::UnitNegRange::clamp(cosine).0,
        }
    }

    /// Create an `AngularDistance` from an angle.
    /// * `angle` - the angle, it must be in the range [0, π] radians.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::AngleOutOfRange` if `angle` is not in [0, π].
    pub fn create_from_angle(angle: Radians) -> Result<Self, GeometryError> {
        if is_valid_angle(angle) {
            Ok(Self {
                cosine: libm::cos(angle.0),
            })
        } else {
            Err(GeometryError::AngleOutOfRange(angle.0))
        }
    }

    /// The cosine of the angular distance.
    #[must_use]
    pub const fn get_cosine(&self) -> f64 {
        self.cosine
    }

    /// Calculate the angular distance in radians.
    /// Note: this calls `acos`, so it is relatively expensive.
    #[must_use]
    pub fn calculate_angle(&self) -> Radians {
        Radians(libm::acos(self.cosine))
    }

    /// Whether this distance is less than `other`, without any tolerance.
    #[must_use]
    pub fn is_precisely_less_than(&self, other: &Self) -> bool {
        self.cosine > other.cosine
    }

    /// Whether this distance is greater than `other`, without any tolerance.
    #[must_use]
    pub fn is_precisely_greater_than(&self, other: &Self) -> bool {
        self.cosine < other.cosine
    }
}

impl PartialEq for AngularDistance {
    fn eq(&self, other: &Self) -> bool {
        compare_cosines(self.cosine, other.cosine) == Ordering::Equal
    }
}

impl PartialOrd for AngularDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare_cosines(self.cosine, other.cosine))
    }
}

impl From<AngularExtent> for AngularDistance {
    fn from(extent: AngularExtent) -> Self {
        Self {
            cosine: extent.cosine,
        }
    }
}

/// An angular extent in the range [0, π] radians, stored as its cosine and sine.
///
/// Angular extents may be added and subtracted using the trigonometric
/// angle sum and difference identities. Results are clamped to [0, π].
#[derive(Clone, Copy, Debug)]
pub struct AngularExtent {
    cosine: f64,
    sine: f64,
}

impl AngularExtent {
    /// An angular extent of zero radians.
    pub const ZERO: Self = Self {
        cosine: 1.0,
        sine: 0.0,
    };
    /// An angular extent of π/2 radians.
    pub const HALF_PI: Self = Self {
        cosine: 0.0,
        sine: 1.0,
    };
    /// An angular extent of π radians.
    pub const PI: Self = Self {
        cosine: -1.0,
        sine: 0.0,
    };

    /// Create an `AngularExtent` from the cosine of an angle.
    /// The cosine is clamped to the range [-1, 1].
    #[must_use]
    pub fn create_from_cosine(cosine: f64) -> Self {
        let cosine = trig::UnitNegRange::clamp(cosine);
        Self {
            cosine: cosine.0,
            sine: trig::swap_sin_cos(cosine).0,
        }
    }

    /// Create an `AngularExtent` from the cosine and sine of an angle.
    /// The sine must be non-negative, since the angle is in [0, π].
    #[must_use]
    pub fn create_from_cosine_and_sine(cosine: f64, sine: f64) -> Self {
        debug_assert!(0.0 <= sine);
        Self {
            cosine: trig::UnitNegRange::clamp(cosine).0,
            sine: trig::UnitNegRange::clamp(sine).0,
        }
    }

    /// Create an `AngularExtent` from an angle.
    /// * `angle` - the angle, it must be in the range [0, π] radians.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::AngleOutOfRange` if `angle` is not in [0, π].
    pub fn create_from_angle(angle: Radians) -> Result<Self, GeometryError> {
        if is_valid_angle(angle) {
            Ok(Self::from(Angle::from(angle)))
        } else {
            Err(GeometryError::AngleOutOfRange(angle.0))
        }
    }

    /// The cosine of the angular extent.
    #[must_use]
    pub const fn get_cosine(&self) -> f64 {
        self.cosine
    }

    /// The sine of the angular extent.
    #[must_use]
    pub const fn get_sine(&self) -> f64 {
        self.sine
    }

    /// The angular extent in radians.
    #[must_use]
    pub fn get_angle(&self) -> Radians {
        Radians(libm::atan2(self.sine, self.cosine))
    }
}

impl From<Angle> for AngularExtent {
    /// Create an `AngularExtent` from the magnitude of an `Angle`.
    fn from(angle: Angle) -> Self {
        Self {
            cosine: angle.cos().0,
            sine: libm::fabs(angle.sin().0),
        }
    }
}

impl From<AngularDistance> for AngularExtent {
    fn from(distance: AngularDistance) -> Self {
        Self::create_from_cosine(distance.cosine)
    }
}

impl Add for AngularExtent {
    type Output = Self;

    /// Add two angular extents, clamping the result to π.
    fn add(self, other: Self) -> Self {
        // cos(A) + cos(B) = 2 cos((A+B)/2) cos((A-B)/2), so the sum is negative
        // only if A + B exceeds π.
        if self.cosine + other.cosine < 0.0 {
            Self::PI
        } else {
            // rounding can make the sine slightly negative when the sum is π
            let sine = self.sine * other.cosine + self.cosine * other.sine;
            Self::create_from_cosine_and_sine(
                self.cosine * other.cosine - self.sine * other.sine,
                if sine < 0.0 { 0.0 } else { sine },
            )
        }
    }
}

impl Sub for AngularExtent {
    type Output = Self;

    /// Subtract an angular extent, clamping the result to zero.
    fn sub(self, other: Self) -> Self {
        if self.cosine > other.cosine {
            Self::ZERO
        } else {
            let sine = self.sine * other.cosine - self.cosine * other.sine;
            Self::create_from_cosine_and_sine(
                self.cosine * other.cosine + self.sine * other.sine,
                if sine < 0.0 { 0.0 } else { sine },
            )
        }
    }
}

impl PartialEq for AngularExtent {
    fn eq(&self, other: &Self) -> bool {
        compare_cosines(self.cosine, other.cosine) == Ordering::Equal
    }
}

impl PartialOrd for AngularExtent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare_cosines(self.cosine, other.cosine))
    }
}
