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

//! The error module contains the `GeometryError` type returned by the
//! operations of this library that can fail.
//!
//! Precondition violations and indeterminate results are reported as errors.
//! Numerical near-degeneracies are handled locally by the algorithms, using
//! the epsilon constants of the modules that own them.

use crate::PointOnSphere;

/// The errors that may be returned by the geometry operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A great circle arc cannot be created between antipodal points.
    #[error("great circle arc end-points are antipodal: {start:?}, {end:?}")]
    AntipodalArcEndpoints {
        start: PointOnSphere,
        end: PointOnSphere,
    },

    /// A zero-length great circle arc does not have a rotation axis.
    #[error("zero-length great circle arc has an indeterminate rotation axis: {start:?}, {end:?}")]
    IndeterminateArcRotationAxis {
        start: PointOnSphere,
        end: PointOnSphere,
    },

    /// The great circles of the arcs are coincident or an arc is point-like.
    #[error("great circle intersection is indeterminate")]
    IndeterminateGreatCircleIntersection,

    /// An angle was not in the range [0, π] radians.
    #[error("angle {0} radians is outside the range [0, pi]")]
    AngleOutOfRange(f64),

    /// A latitude was not in the range [-90, 90] degrees.
    #[error("latitude {0} degrees is outside the range [-90, 90]")]
    InvalidLatitude(f64),

    /// A longitude was not in the range [-360, 360] degrees.
    #[error("longitude {0} degrees is outside the range [-360, 360]")]
    InvalidLongitude(f64),

    /// A vector was not of unit length.
    #[error("vector is not of unit length")]
    NonUnitVector,

    /// Too few points were supplied to construct a geometry.
    #[error("at least {required} points are required, {actual} were supplied")]
    InsufficientPoints { required: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_display() {
        let error = GeometryError::InsufficientPoints {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            "at least 2 points are required, 1 were supplied",
            error.to_string()
        );

        let error = GeometryError::AngleOutOfRange(4.0);
        assert_eq!(
            "angle 4 radians is outside the range [0, pi]",
            error.to_string()
        );
        assert_eq!(error.clone(), error);
    }
}
