//! Resolution of [`AssetSpec`]s into concrete per-run and per-instance values.
use glam::DVec3;
use rand::RngCore;

use crate::params::{AssetId, AssetSpec, FieldRange};
use crate::path::Rotation;
use crate::random::uniform_f64;

/// Concrete parameters for one instance about to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub asset_id: AssetId,
    pub scale: DVec3,
    /// `None` means align to the path tangent at the placement distance.
    pub rotation: Option<Rotation>,
    /// Resolved spacing contributing to the advance before this instance.
    pub spacing: f64,
    /// Lateral scatter bound for this instance.
    pub scatter: f64,
}

/// Resolves the instance count for one generation.
///
/// Draws an inclusive integer in `[base, max]` only when the range is enabled and
/// `max > base`. Callers exclude the asset when the result is `<= 0`.
pub fn resolve_quantity(quantity: &FieldRange<i64>, rng: &mut dyn RngCore) -> i64 {
    quantity.resolve(rng)
}

/// Resolves spacing, scale, rotation, and scatter for a single instance.
pub fn resolve_request(spec: &AssetSpec, rng: &mut dyn RngCore) -> PlacementRequest {
    let spacing = spec.spacing.resolve(rng);
    let scale = spec.scale.resolve(rng);
    let rotation = spec
        .rotation
        .as_ref()
        .map(|r| Rotation::from_vec3(r.resolve(rng)));

    PlacementRequest {
        asset_id: spec.id.clone(),
        scale,
        rotation,
        spacing,
        scatter: spec.scatter.abs(),
    }
}

/// Draws a lateral offset in `[-scatter, scatter]`. No draw is made for zero scatter.
pub fn draw_scatter_offset(scatter: f64, rng: &mut dyn RngCore) -> f64 {
    let bound = scatter.abs();
    if bound == 0.0 {
        return 0.0;
    }
    uniform_f64(rng, -bound, bound)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::tests::FixedRng;

    #[test]
    fn fixed_quantity_is_base() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_quantity(&FieldRange::fixed(3), &mut rng), 3);
        assert_eq!(resolve_quantity(&FieldRange::fixed(-1), &mut rng), -1);
    }

    #[test]
    fn ranged_quantity_is_inclusive() {
        let mut rng = StdRng::seed_from_u64(21);
        let q = FieldRange::ranged(1, 3);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let v = resolve_quantity(&q, &mut rng);
            assert!((1..=3).contains(&v));
            seen[(v - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn quantity_max_not_above_base_yields_base() {
        let mut rng = StdRng::seed_from_u64(21);
        assert_eq!(resolve_quantity(&FieldRange::ranged(4, 2), &mut rng), 4);
    }

    #[test]
    fn unranged_request_returns_spec_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let spec = AssetSpec::new("post")
            .with_spacing(12.0)
            .with_scale([2.0, 2.0, 3.0])
            .with_rotation([0.0, 45.0, 0.0])
            .with_scatter(-4.0);
        let req = resolve_request(&spec, &mut rng);
        assert_eq!(req.asset_id, "post");
        assert_eq!(req.spacing, 12.0);
        assert_eq!(req.scale, DVec3::new(2.0, 2.0, 3.0));
        assert_eq!(req.rotation, Some(Rotation::new(0.0, 45.0, 0.0)));
        assert_eq!(req.scatter, 4.0);
    }

    #[test]
    fn missing_rotation_stays_unresolved() {
        let mut rng = StdRng::seed_from_u64(0);
        let req = resolve_request(&AssetSpec::new("post"), &mut rng);
        assert!(req.rotation.is_none());
    }

    #[test]
    fn ranged_request_fields_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(99);
        let spec = AssetSpec::new("tree")
            .with_spacing_range(5.0, 15.0)
            .with_scale_range([1.0, 1.0, 1.0], [1.5, 2.0, 2.5])
            .with_rotation_range([0.0, -180.0, 0.0], [0.0, 180.0, 0.0]);
        for _ in 0..100 {
            let req = resolve_request(&spec, &mut rng);
            assert!((5.0..=15.0).contains(&req.spacing));
            assert!((1.0..=1.5).contains(&req.scale.x));
            assert!((1.0..=2.5).contains(&req.scale.z));
            let rot = req.rotation.expect("ranged rotation resolves");
            assert!((-180.0..=180.0).contains(&rot.yaw));
            assert_eq!(rot.pitch, 0.0);
        }
    }

    #[test]
    fn scatter_offset_spans_symmetric_interval() {
        assert_eq!(draw_scatter_offset(0.0, &mut FixedRng { value: 123 }), 0.0);
        assert_eq!(draw_scatter_offset(3.0, &mut FixedRng { value: 0 }), -3.0);

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let v = draw_scatter_offset(3.0, &mut rng);
            assert!((-3.0..=3.0).contains(&v));
        }
    }
}
