//! Arc-length parameterized paths.
//!
//! A [`Path`] is an immutable snapshot of an authored curve: an ordered list of
//! [`PathSample`]s with cumulative distances, plus the total length. Queries by
//! distance interpolate linearly between the bracketing samples, see [`Path::sample_at`].
use glam::DVec3;
use mint::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod orientation;

pub use orientation::{right_axis, rotation_aligned_to, Rotation};

/// Denominator used in place of a zero-length segment.
pub const SEGMENT_EPSILON: f64 = 1e-6;

/// Tangents shorter than this are treated as degenerate.
pub const DIRECTION_EPSILON: f64 = 1e-6;

/// Tolerance when checking the first and last sample distances.
const LENGTH_TOLERANCE: f64 = 1e-6;

/// One authored waypoint on a path.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Cumulative arc length at this waypoint.
    pub distance: f64,
    /// World position.
    pub position: DVec3,
    /// Curve tangent; need not be unit length.
    pub tangent: DVec3,
}

impl PathSample {
    pub fn new(distance: f64, position: impl Into<DVec3>, tangent: impl Into<DVec3>) -> Self {
        Self {
            distance,
            position: position.into(),
            tangent: tangent.into(),
        }
    }
}

/// Position and unit direction at a distance along a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: DVec3,
    pub direction: DVec3,
}

/// Immutable, validated arc-length sampled path.
///
/// Deserialization goes through [`Path::new`], so invalid input is rejected.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PathParts"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    samples: Vec<PathSample>,
    total_length: f64,
}

/// Unvalidated fields of a [`Path`].
#[cfg(any(test, feature = "serde"))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[derive(Debug, Clone)]
struct PathParts {
    samples: Vec<PathSample>,
    total_length: f64,
}

#[cfg(any(test, feature = "serde"))]
impl TryFrom<PathParts> for Path {
    type Error = Error;

    fn try_from(parts: PathParts) -> Result<Self> {
        Path::new(parts.samples, parts.total_length)
    }
}

impl Path {
    /// Creates a path from ordered samples.
    ///
    /// Fails unless there is at least one sample, distances are finite and
    /// non-decreasing, the first distance is 0, and the last equals `total_length`.
    pub fn new(samples: Vec<PathSample>, total_length: f64) -> Result<Self> {
        let (first, last) = match (samples.first(), samples.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(Error::InvalidPath("path has no samples".into())),
        };
        if !total_length.is_finite() || total_length < 0.0 {
            return Err(Error::InvalidPath(format!(
                "total length must be finite and >= 0, got {total_length}"
            )));
        }
        if let Some(i) = samples.iter().position(|s| !s.distance.is_finite()) {
            return Err(Error::InvalidPath(format!(
                "sample distance at index {i} is not finite"
            )));
        }
        if first.distance.abs() > LENGTH_TOLERANCE {
            return Err(Error::InvalidPath(format!(
                "first sample must start at distance 0, got {}",
                first.distance
            )));
        }
        let tolerance = LENGTH_TOLERANCE * total_length.max(1.0);
        if (last.distance - total_length).abs() > tolerance {
            return Err(Error::InvalidPath(format!(
                "last sample distance {} does not match total length {total_length}",
                last.distance
            )));
        }
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].distance < pair[0].distance {
                return Err(Error::InvalidPath(format!(
                    "sample distances must be non-decreasing (index {})",
                    i + 1
                )));
            }
        }
        if samples
            .iter()
            .any(|s| !s.position.is_finite() || !s.tangent.is_finite())
        {
            return Err(Error::InvalidPath(
                "sample positions and tangents must be finite".into(),
            ));
        }

        Ok(Self {
            samples,
            total_length,
        })
    }

    /// Builds a path from world points, using cumulative chord length as distance.
    ///
    /// Each waypoint's tangent is the mean of its adjacent segment directions.
    pub fn from_polyline<P>(points: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: Into<Vector3<f64>>,
    {
        let points: Vec<DVec3> = points
            .into_iter()
            .map(|p| DVec3::from(p.into()))
            .collect();
        if points.is_empty() {
            return Err(Error::InvalidPath("polyline has no points".into()));
        }

        let segment_dirs: Vec<DVec3> = points
            .windows(2)
            .map(|w| (w[1] - w[0]).normalize_or_zero())
            .collect();

        let mut samples = Vec::with_capacity(points.len());
        let mut distance = 0.0;
        for (i, &position) in points.iter().enumerate() {
            if i > 0 {
                distance += position.distance(points[i - 1]);
            }
            let incoming = i.checked_sub(1).and_then(|j| segment_dirs.get(j)).copied();
            let outgoing = segment_dirs.get(i).copied();
            let tangent = match (incoming, outgoing) {
                (Some(a), Some(b)) => (a + b).normalize_or(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => DVec3::X,
            };
            samples.push(PathSample::new(distance, position, tangent));
        }

        Self::new(samples, distance)
    }

    /// Straight path from `start` to `end` with two samples.
    pub fn straight(start: impl Into<DVec3>, end: impl Into<DVec3>) -> Result<Self> {
        let start = start.into();
        let end = end.into();
        let length = start.distance(end);
        let tangent = (end - start).normalize_or(DVec3::X);
        Self::new(
            vec![
                PathSample::new(0.0, start, tangent),
                PathSample::new(length, end, tangent),
            ],
            length,
        )
    }

    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Samples position and unit direction at `distance`, clamped to `[0, total_length]`.
    pub fn sample_at(&self, distance: f64) -> PathPoint {
        let d = if distance.is_nan() {
            0.0
        } else {
            distance.clamp(0.0, self.total_length)
        };

        let last = self.samples.len() - 1;
        if last == 0 {
            return PathPoint {
                position: self.samples[0].position,
                direction: self.fallback_direction(0),
            };
        }

        // Distances are non-decreasing, so the first segment whose end reaches `d` brackets it.
        let i = self.samples[..last]
            .iter()
            .zip(&self.samples[1..])
            .position(|(a, b)| a.distance <= d && d <= b.distance)
            .unwrap_or(last - 1);

        let a = &self.samples[i];
        let b = &self.samples[i + 1];
        let mut segment = b.distance - a.distance;
        if segment.abs() < SEGMENT_EPSILON {
            segment = SEGMENT_EPSILON;
        }
        let t = ((d - a.distance) / segment).clamp(0.0, 1.0);

        let position = a.position + (b.position - a.position) * t;
        let tangent = a.tangent + (b.tangent - a.tangent) * t;
        let direction = if tangent.length() < DIRECTION_EPSILON {
            self.fallback_direction(i)
        } else {
            tangent.normalize()
        };

        PathPoint {
            position,
            direction,
        }
    }

    /// Nearest usable tangent at or before `index`, then after it, else world X.
    fn fallback_direction(&self, index: usize) -> DVec3 {
        let usable = |s: &PathSample| {
            (s.tangent.length() >= DIRECTION_EPSILON).then(|| s.tangent.normalize())
        };
        self.samples[..=index]
            .iter()
            .rev()
            .find_map(usable)
            .or_else(|| self.samples[index + 1..].iter().find_map(usable))
            .unwrap_or(DVec3::X)
    }
}
