//! Event types and sinks for observing placement runs and ledger changes.
//!
//! This module defines [`PlacementEvent`] and a set of sinks to emit, collect, or
//! forward events while executing [`crate::placer::Placer`] operations or
//! [`crate::placement::runner::run_generation`] directly.
use crate::ledger::{ApplySummary, DeleteSummary, GenerationId, PlacementRecord};
use crate::params::AssetId;
use crate::placement::runner::{RunSummary, SkipReason};
use crate::placement::sequencer::SequenceMode;

/// Describes events emitted by placement operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlacementEvent {
    /// Emitted once planning finished and placement starts.
    RunStarted {
        /// Ordering used for this run.
        mode: SequenceMode,
        /// Resolved instance count per asset, in authored order.
        planned: Vec<(AssetId, usize)>,
        /// Length of the path snapshot.
        path_length: f64,
    },

    /// Emitted when an asset type is dropped from a run before placement.
    AssetSkipped {
        /// The asset that was dropped.
        asset_id: AssetId,
        /// Human-readable reason.
        reason: String,
    },

    /// Emitted when an instance was committed to the scene.
    InstanceCommitted {
        /// Zero-based index of the request within the run.
        index: usize,
        /// The committed record.
        record: PlacementRecord,
        /// Trials needed to find a free spot.
        trials: usize,
    },

    /// Emitted when an instance could not be placed.
    InstanceSkipped {
        /// Zero-based index of the request within the run.
        index: usize,
        /// Asset of the skipped instance.
        asset_id: AssetId,
        /// Why it was skipped.
        reason: SkipReason,
    },

    /// Emitted when the run stopped because it ran past the end of the path.
    PathExhausted {
        /// Distance reached when the run stopped.
        distance: f64,
        /// Requests that were never attempted.
        unplaced: usize,
    },

    /// Emitted when the run finishes, whether or not it was recorded.
    RunFinished {
        /// Counts for the run.
        summary: RunSummary,
        /// Ledger entry created for the run, if any.
        generation: Option<GenerationId>,
    },

    /// Emitted after a generation was re-applied.
    GenerationApplied {
        id: GenerationId,
        summary: ApplySummary,
    },

    /// Emitted after a generation was deleted.
    GenerationDeleted {
        id: GenerationId,
        summary: DeleteSummary,
    },

    /// Non-fatal host failure that was recovered from; also logged with `warn!`.
    Warning {
        /// Where it happened: an asset id during a run, or `"<generation>: <object>"`.
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// A generic event sink that accepts [`PlacementEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlacementEvent);
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlacementEvent) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlacementEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlacementEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        self.events.push(event);
    }
}
