//! Execution of a single generation run: planning, sequencing, and placement along a path.
use std::collections::{BTreeMap, HashMap, HashSet};

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::HostContext;
use crate::ledger::PlacementRecord;
use crate::params::{resolve_quantity, resolve_request, AssetId, AssetSpec};
use crate::path::Path;
use crate::placement::events::{EventSink, PlacementEvent};
pub use crate::placement::overlap::SkipReason;
use crate::placement::overlap::{advance, OverlapResolver};
use crate::placement::sequencer::{PlacementSequence, SequenceMode};
use crate::placement::{FirstPlacement, PlacementConfig};

/// Why a run stopped before every request was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    PathExhausted,
}

/// Lifecycle of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planning,
    Placing,
    Completed,
    Aborted(AbortReason),
}

/// Counts describing how a run went.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Terminal state of the run.
    pub state: RunState,
    /// Instances requested after quantity resolution, including dropped asset types.
    pub requested: usize,
    /// Instances committed to the scene.
    pub placed: usize,
    /// Instances attempted but not placed.
    pub skipped: usize,
    /// Distance reached along the path.
    pub final_distance: f64,
}

impl RunSummary {
    /// Requested instances that were never attempted (dropped types, early abort).
    pub fn not_attempted(&self) -> usize {
        self.requested
            .saturating_sub(self.placed)
            .saturating_sub(self.skipped)
    }
}

/// Result of running one generation.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Committed placements in spawn order.
    pub records: Vec<PlacementRecord>,
    /// Specs of the asset types that took part, keyed by id.
    pub specs: BTreeMap<AssetId, AssetSpec>,
    pub summary: RunSummary,
}

/// Asset type that survived planning.
struct PlannedAsset<'s> {
    spec: &'s AssetSpec,
    quantity: usize,
    radius: f64,
}

/// Resolves quantities and checks content, before any scene interaction.
fn plan<'s>(
    specs: &'s [AssetSpec],
    ctx: &HostContext<'_>,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> Result<(Vec<PlannedAsset<'s>>, usize)> {
    if specs.is_empty() {
        return Err(Error::InvalidConfig("asset list is empty".into()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = specs.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(Error::InvalidConfig(format!(
            "asset '{}' is listed more than once",
            dup.id
        )));
    }

    let mut with_quantity = Vec::with_capacity(specs.len());
    for spec in specs {
        let quantity = resolve_quantity(&spec.quantity, rng);
        if quantity <= 0 {
            debug!("Asset '{}' resolved to quantity {}; excluded.", spec.id, quantity);
            continue;
        }
        with_quantity.push((spec, quantity as usize));
    }
    if with_quantity.is_empty() {
        return Err(Error::InvalidConfig(
            "no asset has a quantity above zero".into(),
        ));
    }
    let requested = with_quantity.iter().map(|(_, q)| *q).sum();

    let mut planned = Vec::with_capacity(with_quantity.len());
    for (spec, quantity) in with_quantity {
        let extent = if ctx.content.exists(&spec.id) {
            ctx.content.half_extent(&spec.id)
        } else {
            Err(Error::Content {
                asset_id: spec.id.clone(),
                reason: "not found in content store".into(),
            })
        };
        match extent {
            Ok(half_extent) => planned.push(PlannedAsset {
                spec,
                quantity,
                radius: half_extent.abs().max_element(),
            }),
            Err(e) => {
                warn!("Skipping asset '{}' for this run: {}.", spec.id, e);
                sink.send(PlacementEvent::AssetSkipped {
                    asset_id: spec.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok((planned, requested))
}

/// Runs one generation: plans, orders, and places instances along `path`.
///
/// Returns an error only for configuration problems detected before the scene is
/// touched. Every later failure degrades to fewer placements, reported in
/// [`RunResult::summary`]. The result is not recorded anywhere; see
/// [`crate::placer::Placer::generate`] for the ledger-backed entry point.
pub fn run_generation(
    specs: &[AssetSpec],
    path: &Path,
    mode: SequenceMode,
    config: &PlacementConfig,
    ctx: &mut HostContext<'_>,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> Result<RunResult> {
    let (planned, requested) = plan(specs, ctx, rng, sink)?;

    let mut summary = RunSummary {
        state: RunState::Planning,
        requested,
        placed: 0,
        skipped: 0,
        final_distance: 0.0,
    };
    let specs_used: BTreeMap<AssetId, AssetSpec> = planned
        .iter()
        .map(|p| (p.spec.id.clone(), p.spec.clone()))
        .collect();
    let by_id: HashMap<&str, &PlannedAsset<'_>> =
        planned.iter().map(|p| (p.spec.id.as_str(), p)).collect();

    let order: Vec<(AssetId, usize)> = planned
        .iter()
        .map(|p| (p.spec.id.clone(), p.quantity))
        .collect();
    let sequence = PlacementSequence::new(order.clone(), mode, rng.next_u64());
    let total = sequence.len();

    info!(
        "Placement run | mode: {:?} | assets: {} | instances: {} | path length: {:.2}.",
        mode,
        planned.len(),
        total,
        path.total_length()
    );
    sink.send(PlacementEvent::RunStarted {
        mode,
        planned: order,
        path_length: path.total_length(),
    });

    summary.state = RunState::Placing;
    let mut resolver = OverlapResolver::new(config);
    let mut records: Vec<PlacementRecord> = Vec::new();
    let mut current = 0.0;

    for (index, asset_id) in sequence.enumerate() {
        let Some(asset) = by_id.get(asset_id.as_str()) else {
            continue;
        };
        let request = resolve_request(asset.spec, rng);

        let at_origin = index == 0 && config.first_placement == FirstPlacement::AtOrigin;
        if !at_origin {
            let prev_radius = resolver.last_radius().unwrap_or(0.0);
            let step = advance(prev_radius, asset.radius, request.spacing, config);
            current += step;
            debug!(
                "Advance +{:.2} (prev {:.2}, curr {:.2}, spacing {:.2}) -> {:.2}.",
                step, prev_radius, asset.radius, request.spacing, current
            );
        }

        if current > path.total_length() {
            info!(
                "Reached end of path at {:.2}; {} instance(s) not attempted.",
                current,
                total - index
            );
            summary.state = RunState::Aborted(AbortReason::PathExhausted);
            sink.send(PlacementEvent::PathExhausted {
                distance: current,
                unplaced: total - index,
            });
            break;
        }

        match resolver.place(&request, asset.radius, &mut current, path, ctx, rng, sink) {
            Ok(accepted) => {
                let record = PlacementRecord {
                    label: ctx.scene.label(accepted.handle),
                    asset_id,
                    handle: accepted.handle,
                    transform: accepted.transform,
                    distance: accepted.distance,
                };
                sink.send(PlacementEvent::InstanceCommitted {
                    index,
                    record: record.clone(),
                    trials: accepted.trials,
                });
                records.push(record);
            }
            Err(reason) => {
                summary.skipped += 1;
                let exhausted = reason == SkipReason::PathExhausted;
                match &reason {
                    SkipReason::TrialsExhausted { trials } => warn!(
                        "Could not find a non-overlapping spot for '{}' after {} trials; skipping.",
                        asset_id, trials
                    ),
                    SkipReason::Host(e) => warn!("Host rejected '{}': {}; skipping.", asset_id, e),
                    SkipReason::PathExhausted => {}
                }
                sink.send(PlacementEvent::InstanceSkipped {
                    index,
                    asset_id,
                    reason,
                });
                if exhausted {
                    let unplaced = total - index - 1;
                    info!(
                        "Reached end of path at {:.2}; {} instance(s) not attempted.",
                        current, unplaced
                    );
                    summary.state = RunState::Aborted(AbortReason::PathExhausted);
                    sink.send(PlacementEvent::PathExhausted {
                        distance: current,
                        unplaced,
                    });
                    break;
                }
            }
        }
    }

    if summary.state == RunState::Placing {
        summary.state = RunState::Completed;
    }
    summary.placed = records.len();
    summary.final_distance = current;

    info!(
        "Placement run finished | placed: {} / {} | skipped: {} | state: {:?}.",
        summary.placed, summary.requested, summary.skipped, summary.state
    );

    Ok(RunResult {
        records,
        specs: specs_used,
        summary,
    })
}
