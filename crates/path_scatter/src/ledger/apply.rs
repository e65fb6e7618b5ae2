use std::collections::BTreeMap;

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::HostContext;
use crate::params::{resolve_request, AssetId, AssetSpec};
use crate::path::Path;
use crate::placement::events::{EventSink, PlacementEvent};
use crate::placement::overlap::{advance, candidate_transform};
use crate::placement::{FirstPlacement, PlacementConfig};

use super::{GenerationId, Ledger};

/// Result of re-applying a generation.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplySummary {
    /// Records whose objects received a new transform.
    pub repositioned: usize,
    /// Records whose objects no longer exist in the scene.
    pub missing: usize,
    /// Records whose transform update was rejected by the host.
    pub failed: usize,
    /// Assets whose spacing differs from the snapshot, in spawn order of first use.
    pub spacing_changed: Vec<AssetId>,
}

impl Ledger {
    /// Re-resolves a generation against new specs and a new path.
    ///
    /// Records are walked in spawn order. Distances are kept until the first record
    /// whose asset changed spacing, then recomputed with the advance rule. Nothing is
    /// spawned or destroyed and the instance count never changes. Records that cannot
    /// be updated are logged and sent to `sink` as warnings.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        id: GenerationId,
        specs: &[AssetSpec],
        path: &Path,
        config: &PlacementConfig,
        ctx: &mut HostContext<'_>,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<ApplySummary> {
        let generation = self
            .entries
            .get_mut(&id)
            .ok_or(Error::UnknownGeneration(id))?;

        let incoming: BTreeMap<&str, &AssetSpec> =
            specs.iter().map(|s| (s.id.as_str(), s)).collect();

        // Quantity always comes from the snapshot.
        let mut next_specs: BTreeMap<AssetId, AssetSpec> = BTreeMap::new();
        let mut summary = ApplySummary::default();
        for (asset_id, old) in &generation.spec_snapshot {
            let spec = match incoming.get(asset_id.as_str()) {
                Some(new) => {
                    let mut spec = (*new).clone();
                    spec.quantity = old.quantity;
                    spec
                }
                None => old.clone(),
            };
            next_specs.insert(asset_id.clone(), spec);
        }
        for record in &generation.records {
            let changed = match (
                generation.spec_snapshot.get(&record.asset_id),
                next_specs.get(&record.asset_id),
            ) {
                (Some(old), Some(new)) => old.spacing_differs(new, config.spacing_tolerance),
                _ => false,
            };
            if changed && !summary.spacing_changed.contains(&record.asset_id) {
                summary.spacing_changed.push(record.asset_id.clone());
            }
        }

        let total = path.total_length();
        let mut cascading = false;
        let mut prev_distance = 0.0;
        let mut prev_radius = 0.0;

        for (index, record) in generation.records.iter_mut().enumerate() {
            let name = record.display_name();
            let mut warning = |message: String| {
                warn!("{}: {}", id, message);
                sink.send(PlacementEvent::Warning {
                    context: format!("{id}: {name}"),
                    message,
                });
            };

            let Some(spec) = next_specs.get(&record.asset_id) else {
                warning(format!("no spec for '{}'; leaving it in place.", name));
                continue;
            };
            let request = resolve_request(spec, rng);

            let curr_radius = match ctx.content.half_extent(&record.asset_id) {
                Ok(half_extent) => half_extent.abs().max_element(),
                Err(e) => {
                    warning(format!("{}; using zero radius.", e));
                    0.0
                }
            };

            if summary.spacing_changed.contains(&record.asset_id) {
                cascading = true;
            }
            let distance = if !cascading {
                record.distance
            } else if index == 0 && config.first_placement == FirstPlacement::AtOrigin {
                0.0
            } else {
                prev_distance + advance(prev_radius, curr_radius, request.spacing, config)
            };
            let distance = distance.clamp(0.0, total);

            let transform = candidate_transform(path, distance, &request, rng);
            prev_distance = distance;
            prev_radius = curr_radius * request.scale.abs().max_element();

            let Some(handle) = ctx.resolve(record.handle, record.label.as_deref()) else {
                warning(format!("object '{}' no longer exists; skipping.", name));
                summary.missing += 1;
                continue;
            };

            match ctx.scene.set_transform(handle, &transform) {
                Ok(()) => {
                    debug!("{}: '{}' moved to distance {:.2}.", id, name, distance);
                    record.handle = handle;
                    record.transform = transform;
                    record.distance = distance;
                    summary.repositioned += 1;
                }
                Err(e) => {
                    warning(format!("failed to update '{}': {}.", name, e));
                    summary.failed += 1;
                }
            }
        }

        generation.path_snapshot = path.clone();
        generation.spec_snapshot = next_specs;

        info!(
            "{} applied ({} repositioned, {} missing, {} failed).",
            id, summary.repositioned, summary.missing, summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::host::{InMemoryContent, InMemoryScene, SceneHost};
    use crate::ledger::PlacementRecord;
    use crate::placement::events::VecSink;

    fn content() -> InMemoryContent {
        InMemoryContent::new().with_asset("post", [25.0, 25.0, 25.0])
    }

    fn straight(length: f64) -> Path {
        Path::straight([0.0, 0.0, 0.0], [length, 0.0, 0.0]).unwrap()
    }

    /// Commits posts at the given distances along a straight path.
    fn commit(
        ledger: &mut Ledger,
        scene: &mut InMemoryScene,
        spec: &AssetSpec,
        distances: &[f64],
        path: &Path,
    ) -> GenerationId {
        let records = distances
            .iter()
            .map(|&d| {
                let transform = crate::host::Transform::from_translation(path.sample_at(d).position);
                let handle = scene.spawn(&spec.id, &transform).unwrap();
                PlacementRecord {
                    label: scene.label(handle),
                    asset_id: spec.id.clone(),
                    handle,
                    transform,
                    distance: d,
                }
            })
            .collect();
        let specs = BTreeMap::from([(spec.id.clone(), spec.clone())]);
        ledger.commit(records, path.clone(), specs).unwrap()
    }

    #[test]
    fn unknown_generation_is_an_error() {
        let content = content();
        let mut scene = InMemoryScene::from_content(&content);
        let mut ledger = Ledger::new();
        let mut ctx = HostContext::new(&content, &mut scene);
        let err = ledger
            .apply(
                GenerationId(1),
                &[],
                &straight(10.0),
                &PlacementConfig::default(),
                &mut ctx,
                &mut StdRng::seed_from_u64(0),
                &mut (),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGeneration(GenerationId(1))));
    }

    #[test]
    fn quantity_is_kept_from_snapshot() {
        let content = content();
        let mut scene = InMemoryScene::from_content(&content);
        let mut ledger = Ledger::new();
        let path = straight(1000.0);
        let spec = AssetSpec::new("post").with_quantity(3).with_spacing(50.0);
        let id = commit(&mut ledger, &mut scene, &spec, &[0.0, 100.0, 200.0], &path);

        let mut ctx = HostContext::new(&content, &mut scene);
        let summary = ledger
            .apply(
                id,
                &[spec.clone().with_quantity(9).with_scale([2.0, 2.0, 2.0])],
                &path,
                &PlacementConfig::default(),
                &mut ctx,
                &mut StdRng::seed_from_u64(1),
                &mut (),
            )
            .unwrap();

        assert_eq!(summary.repositioned, 3);
        assert!(summary.spacing_changed.is_empty());
        let generation = ledger.get(id).unwrap();
        assert_eq!(generation.len(), 3);
        assert_eq!(generation.spec_snapshot["post"].quantity, spec.quantity);
        assert_eq!(generation.spec_snapshot["post"].scale.base, glam::DVec3::splat(2.0));
        assert!(generation
            .records
            .iter()
            .all(|r| r.transform.scale == glam::DVec3::splat(2.0)));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn missing_objects_are_counted_and_skipped() {
        let content = content();
        let mut scene = InMemoryScene::from_content(&content);
        let mut ledger = Ledger::new();
        let path = straight(1000.0);
        let spec = AssetSpec::new("post").with_quantity(2).with_spacing(50.0);
        let id = commit(&mut ledger, &mut scene, &spec, &[0.0, 100.0], &path);
        let gone = ledger.get(id).unwrap().records[0].handle;
        scene.destroy(gone).unwrap();

        let mut ctx = HostContext::new(&content, &mut scene);
        let mut sink = VecSink::new();
        let summary = ledger
            .apply(
                id,
                &[spec],
                &path,
                &PlacementConfig::default(),
                &mut ctx,
                &mut StdRng::seed_from_u64(1),
                &mut sink,
            )
            .unwrap();
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.repositioned, 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            &sink.as_slice()[0],
            PlacementEvent::Warning { context, message }
                if context == "Generation 1: post_0" && message.contains("no longer exists")
        ));
    }

    #[test]
    fn shorter_path_clamps_recomputed_distances() {
        let content = content();
        let mut scene = InMemoryScene::from_content(&content);
        let mut ledger = Ledger::new();
        let path = straight(1000.0);
        let spec = AssetSpec::new("post").with_quantity(3).with_spacing(50.0);
        let id = commit(&mut ledger, &mut scene, &spec, &[0.0, 100.0, 200.0], &path);

        let mut ctx = HostContext::new(&content, &mut scene);
        let summary = ledger
            .apply(
                id,
                &[spec.with_spacing(150.0)],
                &straight(300.0),
                &PlacementConfig::default(),
                &mut ctx,
                &mut StdRng::seed_from_u64(1),
                &mut (),
            )
            .unwrap();
        assert_eq!(summary.spacing_changed, vec!["post".to_string()]);
        let distances: Vec<f64> = ledger
            .get(id)
            .unwrap()
            .records
            .iter()
            .map(|r| r.distance)
            .collect();
        assert_eq!(distances, vec![0.0, 200.0, 300.0]);
        assert_eq!(ledger.get(id).unwrap().path_snapshot.total_length(), 300.0);
    }
}
