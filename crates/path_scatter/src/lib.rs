#![forbid(unsafe_code)]
//! path_scatter: non-overlapping placement of objects along curved paths.
//!
//! Modules:
//! - path: arc-length sampling of authored waypoints, tangent-aligned rotations
//! - params: asset specs with fixed or ranged fields and their per-run resolution
//! - placement: ordering, overlap-avoiding search, run execution, events
//! - ledger: recorded generations with apply and delete
//! - host: traits for the content store and scene host, plus in-memory implementations
//!
//! [`placer::Placer`] ties these together. See README for a walkthrough.
pub mod error;
pub mod host;
pub mod ledger;
pub mod params;
pub mod path;
pub mod placement;
pub mod placer;
mod random;

/// Convenient re-exports for common types. Import with `use path_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::host::{
        Bounds, ContentStore, HostContext, HostError, InMemoryContent, InMemoryScene,
        ObjectHandle, PathProvider, SceneHost, Transform,
    };
    pub use crate::ledger::{
        ApplySummary, DeleteSummary, Generation, GenerationId, Ledger, PlacementRecord,
    };
    pub use crate::params::{AssetId, AssetSpec, FieldRange, PlacementRequest};
    pub use crate::path::{Path, PathPoint, PathSample, Rotation};
    pub use crate::placement::events::{EventSink, FnSink, PlacementEvent, VecSink};
    pub use crate::placement::runner::{
        run_generation, AbortReason, RunResult, RunState, RunSummary, SkipReason,
    };
    pub use crate::placement::sequencer::{PlacementSequence, SequenceMode};
    pub use crate::placement::{FirstPlacement, PlacementConfig};
    pub use crate::placer::{GenerateOutcome, Placer};
}
