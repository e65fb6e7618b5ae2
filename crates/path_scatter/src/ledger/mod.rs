//! In-memory record of committed placement runs.
//!
//! A [`Generation`] keeps the path and asset specs a run was made with next to the
//! handles of every object it committed, so the run can later be re-applied with new
//! parameters ([`Ledger::apply`]) or rolled back ([`Ledger::delete`]).
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::host::{resolve_handle, ObjectHandle, SceneHost, Transform};
use crate::params::{AssetId, AssetSpec};
use crate::path::Path;
use crate::placement::events::{EventSink, PlacementEvent};

mod apply;

pub use apply::ApplySummary;

/// Identifier of a ledger entry. Allocated from a counter and never reused.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationId(pub u64);

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation {}", self.0)
    }
}

/// One committed object.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    /// Label the host assigned at spawn time, if it assigns any. Used to find the
    /// object if the handle went stale.
    pub label: Option<String>,
    pub asset_id: AssetId,
    pub handle: ObjectHandle,
    pub transform: Transform,
    /// Arc length along the path snapshot.
    pub distance: f64,
}

impl PlacementRecord {
    /// Host label, or the handle when the host assigns none.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.handle.to_string(),
        }
    }
}

/// A recorded placement run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Generation {
    pub id: GenerationId,
    pub path_snapshot: Path,
    pub spec_snapshot: BTreeMap<AssetId, AssetSpec>,
    /// Records in spawn order.
    pub records: Vec<PlacementRecord>,
    /// Display names ([`PlacementRecord::display_name`]) in spawn order.
    pub spawn_order: Vec<String>,
}

impl Generation {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, label: &str) -> Option<&PlacementRecord> {
        self.records
            .iter()
            .find(|r| r.label.as_deref() == Some(label))
    }
}

/// Result of deleting a generation.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Destroy calls issued, one per record.
    pub requested: usize,
    pub destroyed: usize,
    pub failed: usize,
}

/// Ordered collection of generations.
#[derive(Debug)]
pub struct Ledger {
    entries: BTreeMap<GenerationId, Generation>,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Records a finished run. Runs without placements are rejected.
    pub fn commit(
        &mut self,
        records: Vec<PlacementRecord>,
        path: Path,
        specs: BTreeMap<AssetId, AssetSpec>,
    ) -> Result<GenerationId> {
        if records.is_empty() {
            return Err(Error::EmptyGeneration);
        }
        let id = GenerationId(self.next_id);
        self.next_id += 1;

        let spawn_order = records.iter().map(PlacementRecord::display_name).collect();
        info!("{} committed with {} placements.", id, records.len());
        self.entries.insert(
            id,
            Generation {
                id,
                path_snapshot: path,
                spec_snapshot: specs,
                records,
                spawn_order,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: GenerationId) -> Option<&Generation> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: GenerationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Generations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Generation> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = GenerationId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destroys every object of a generation and forgets it.
    ///
    /// Exactly one destroy is issued per record, in spawn order. A stale handle is
    /// looked up by its host label; without one the destroy goes to the stale handle
    /// and counts as failed. The entry is removed even when some destroys fail.
    pub fn delete(
        &mut self,
        id: GenerationId,
        scene: &mut dyn SceneHost,
        sink: &mut dyn EventSink,
    ) -> Result<DeleteSummary> {
        let generation = self
            .entries
            .remove(&id)
            .ok_or(Error::UnknownGeneration(id))?;

        let mut summary = DeleteSummary::default();
        for record in &generation.records {
            let handle = resolve_handle(&*scene, record.handle, record.label.as_deref())
                .unwrap_or(record.handle);
            summary.requested += 1;
            match scene.destroy(handle) {
                Ok(()) => summary.destroyed += 1,
                Err(e) => {
                    summary.failed += 1;
                    let name = record.display_name();
                    warn!("{}: failed to destroy '{}': {}.", id, name, e);
                    sink.send(PlacementEvent::Warning {
                        context: format!("{id}: {name}"),
                        message: format!("failed to destroy: {e}"),
                    });
                }
            }
        }

        info!(
            "{} deleted ({} destroyed, {} failed).",
            id, summary.destroyed, summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::host::{InMemoryContent, InMemoryScene};
    use crate::placement::events::VecSink;

    fn path() -> Path {
        Path::straight([0.0, 0.0, 0.0], [100.0, 0.0, 0.0]).unwrap()
    }

    fn spawn_records(scene: &mut InMemoryScene, n: usize) -> Vec<PlacementRecord> {
        (0..n)
            .map(|i| {
                let transform = Transform::from_translation(DVec3::new(i as f64 * 10.0, 0.0, 0.0));
                let handle = scene.spawn("post", &transform).unwrap();
                PlacementRecord {
                    label: scene.label(handle),
                    asset_id: "post".into(),
                    handle,
                    transform,
                    distance: i as f64 * 10.0,
                }
            })
            .collect()
    }

    fn scene() -> InMemoryScene {
        InMemoryScene::from_content(&InMemoryContent::new().with_asset("post", [1.0, 1.0, 1.0]))
    }

    #[test]
    fn generation_id_displays_as_name() {
        assert_eq!(GenerationId(3).to_string(), "Generation 3");
    }

    #[test]
    fn empty_runs_are_not_recorded() {
        let mut ledger = Ledger::new();
        let err = ledger
            .commit(Vec::new(), path(), BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyGeneration));
        assert!(ledger.is_empty());
    }

    #[test]
    fn commit_keeps_spawn_order() {
        let mut scene = scene();
        let records = spawn_records(&mut scene, 3);
        let mut ledger = Ledger::new();
        let id = ledger.commit(records, path(), BTreeMap::new()).unwrap();
        let generation = ledger.get(id).unwrap();
        assert_eq!(generation.spawn_order, vec!["post_0", "post_1", "post_2"]);
        assert_eq!(generation.record("post_1").unwrap().distance, 10.0);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = scene();
        let mut ledger = Ledger::new();
        let first = ledger
            .commit(spawn_records(&mut scene, 1), path(), BTreeMap::new())
            .unwrap();
        ledger.delete(first, &mut scene, &mut ()).unwrap();
        let second = ledger
            .commit(spawn_records(&mut scene, 1), path(), BTreeMap::new())
            .unwrap();
        assert_eq!(first, GenerationId(1));
        assert_eq!(second, GenerationId(2));
        assert_eq!(ledger.ids().collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn delete_destroys_every_record_and_removes_entry() {
        let mut scene = scene();
        let mut ledger = Ledger::new();
        let id = ledger
            .commit(spawn_records(&mut scene, 4), path(), BTreeMap::new())
            .unwrap();
        let summary = ledger.delete(id, &mut scene, &mut ()).unwrap();
        assert_eq!(summary.requested, 4);
        assert_eq!(summary.destroyed, 4);
        assert_eq!(summary.failed, 0);
        assert!(scene.is_empty());
        assert!(!ledger.contains(id));
    }

    #[test]
    fn delete_counts_objects_that_already_vanished() {
        let mut scene = scene();
        let mut ledger = Ledger::new();
        let records = spawn_records(&mut scene, 3);
        let gone = records[1].handle;
        let id = ledger.commit(records, path(), BTreeMap::new()).unwrap();
        scene.destroy(gone).unwrap();

        let mut sink = VecSink::new();
        let summary = ledger.delete(id, &mut scene, &mut sink).unwrap();
        assert_eq!(summary.requested, 3);
        assert_eq!(summary.destroyed, 2);
        assert_eq!(summary.failed, 1);
        assert!(ledger.is_empty());
        let warnings: Vec<_> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                PlacementEvent::Warning { context, .. } => Some(context.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(warnings, vec!["Generation 1: post_1"]);
    }

    #[test]
    fn unlabelled_stale_handles_are_not_looked_up_by_name() {
        let mut scene = scene();
        let mut ledger = Ledger::new();
        let kept = spawn_records(&mut scene, 1);
        let mut records = spawn_records(&mut scene, 1);
        let gone = records[0].handle;
        records[0].label = None;
        ledger.commit(kept, path(), BTreeMap::new()).unwrap();
        let id = ledger.commit(records, path(), BTreeMap::new()).unwrap();
        scene.destroy(gone).unwrap();

        let summary = ledger.delete(id, &mut scene, &mut ()).unwrap();
        assert_eq!(summary.requested, 1);
        assert_eq!(summary.destroyed, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(ledger.get(GenerationId(1)).unwrap().spawn_order, vec!["post_0"]);
    }

    #[test]
    fn display_name_falls_back_to_handle() {
        let mut scene = scene();
        let mut record = spawn_records(&mut scene, 1).remove(0);
        assert_eq!(record.display_name(), "post_0");
        record.label = None;
        assert_eq!(record.display_name(), record.handle.to_string());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut scene = scene();
        let mut ledger = Ledger::new();
        let err = ledger.delete(GenerationId(9), &mut scene, &mut ()).unwrap_err();
        assert!(matches!(err, Error::UnknownGeneration(GenerationId(9))));
    }
}
