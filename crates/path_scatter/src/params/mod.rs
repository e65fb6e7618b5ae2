//! Per-asset placement parameters and their resolution into concrete values.
//!
//! An [`AssetSpec`] describes one object type. Each field is a [`FieldRange`] that is
//! either fixed or drawn uniformly from `[base, max]` when ranged. Quantity is resolved
//! once per generation via [`resolver::resolve_quantity`]; the remaining fields are
//! re-rolled per instance via [`resolver::resolve_request`].
use glam::DVec3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::random::{uniform_f64, uniform_inclusive_i64};

pub mod resolver;

pub use resolver::{draw_scatter_offset, resolve_quantity, resolve_request, PlacementRequest};

pub type AssetId = String;

/// Values that can be drawn uniformly between a base and a maximum.
pub trait RangeValue: Copy {
    /// Draws a value in `[base, max]`. Implementations return `base` (per component)
    /// where `max` is not above it.
    fn draw(base: Self, max: Self, rng: &mut dyn RngCore) -> Self;
}

impl RangeValue for f64 {
    fn draw(base: Self, max: Self, rng: &mut dyn RngCore) -> Self {
        uniform_f64(rng, base, max)
    }
}

impl RangeValue for i64 {
    fn draw(base: Self, max: Self, rng: &mut dyn RngCore) -> Self {
        uniform_inclusive_i64(rng, base, max)
    }
}

impl RangeValue for DVec3 {
    fn draw(base: Self, max: Self, rng: &mut dyn RngCore) -> Self {
        DVec3::new(
            f64::draw(base.x, max.x, rng),
            f64::draw(base.y, max.y, rng),
            f64::draw(base.z, max.z, rng),
        )
    }
}

/// A value that is either fixed at `base` or drawn from `[base, max]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange<T> {
    pub base: T,
    pub max: Option<T>,
    pub use_range: bool,
}

impl<T: RangeValue> FieldRange<T> {
    /// A fixed value.
    pub fn fixed(base: T) -> Self {
        Self {
            base,
            max: None,
            use_range: false,
        }
    }

    /// A value drawn from `[base, max]`.
    pub fn ranged(base: T, max: T) -> Self {
        Self {
            base,
            max: Some(max),
            use_range: true,
        }
    }

    /// Returns `true` when resolving may draw from the rng.
    pub fn is_ranged(&self) -> bool {
        self.use_range && self.max.is_some()
    }

    /// Resolves to a concrete value. Draws only when ranged.
    pub fn resolve(&self, rng: &mut dyn RngCore) -> T {
        match self.max {
            Some(max) if self.use_range => T::draw(self.base, max, rng),
            _ => self.base,
        }
    }
}

/// Placement parameters for one object type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct AssetSpec {
    /// Content identifier resolved by the content store and scene host.
    pub id: AssetId,
    /// Number of instances to place. Resolved once per generation.
    pub quantity: FieldRange<i64>,
    /// Extra gap between neighbouring bounding spheres.
    pub spacing: FieldRange<f64>,
    /// Per-axis scale.
    pub scale: FieldRange<DVec3>,
    /// `(pitch, yaw, roll)` in degrees; `None` aligns to the path tangent.
    pub rotation: Option<FieldRange<DVec3>>,
    /// Maximum lateral offset from the path, applied along its right axis.
    pub scatter: f64,
}

impl AssetSpec {
    /// One unscaled, tangent-aligned instance with no spacing or scatter.
    pub fn new(id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            quantity: FieldRange::fixed(1),
            spacing: FieldRange::fixed(0.0),
            scale: FieldRange::fixed(DVec3::ONE),
            rotation: None,
            scatter: 0.0,
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = FieldRange::fixed(quantity);
        self
    }

    pub fn with_quantity_range(mut self, min: i64, max: i64) -> Self {
        self.quantity = FieldRange::ranged(min, max);
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = FieldRange::fixed(spacing);
        self
    }

    pub fn with_spacing_range(mut self, min: f64, max: f64) -> Self {
        self.spacing = FieldRange::ranged(min, max);
        self
    }

    pub fn with_scale(mut self, scale: impl Into<DVec3>) -> Self {
        self.scale = FieldRange::fixed(scale.into());
        self
    }

    pub fn with_scale_range(mut self, min: impl Into<DVec3>, max: impl Into<DVec3>) -> Self {
        self.scale = FieldRange::ranged(min.into(), max.into());
        self
    }

    /// Fixed `(pitch, yaw, roll)` rotation in degrees.
    pub fn with_rotation(mut self, rotation: impl Into<DVec3>) -> Self {
        self.rotation = Some(FieldRange::fixed(rotation.into()));
        self
    }

    pub fn with_rotation_range(mut self, min: impl Into<DVec3>, max: impl Into<DVec3>) -> Self {
        self.rotation = Some(FieldRange::ranged(min.into(), max.into()));
        self
    }

    /// Align instances to the path tangent.
    pub fn with_path_aligned_rotation(mut self) -> Self {
        self.rotation = None;
        self
    }

    pub fn with_scatter(mut self, scatter: f64) -> Self {
        self.scatter = scatter;
        self
    }

    /// Whether the spacing differs from `other` by more than `tolerance`.
    pub(crate) fn spacing_differs(&self, other: &AssetSpec, tolerance: f64) -> bool {
        let a = &self.spacing;
        let b = &other.spacing;
        if (a.base - b.base).abs() > tolerance || a.is_ranged() != b.is_ranged() {
            return true;
        }
        match (a.max, b.max) {
            (Some(x), Some(y)) if a.is_ranged() => (x - y).abs() > tolerance,
            _ => false,
        }
    }
}
