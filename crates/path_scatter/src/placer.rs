//! High-level entry point bundling configuration and the generation ledger.
use rand::RngCore;
use tracing::info;

use crate::error::Result;
use crate::host::{HostContext, PathProvider, SceneHost};
use crate::ledger::{ApplySummary, DeleteSummary, GenerationId, Ledger};
use crate::params::AssetSpec;
use crate::path::Path;
use crate::placement::events::{EventSink, PlacementEvent};
use crate::placement::runner::{run_generation, RunSummary};
use crate::placement::sequencer::SequenceMode;
use crate::placement::PlacementConfig;

/// What a generate call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// At least one instance was placed and the run was recorded.
    Committed { id: GenerationId, summary: RunSummary },
    /// Nothing was placed; the ledger is unchanged.
    NoOp { summary: RunSummary },
}

impl GenerateOutcome {
    pub fn generation(&self) -> Option<GenerationId> {
        match self {
            Self::Committed { id, .. } => Some(*id),
            Self::NoOp { .. } => None,
        }
    }

    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Committed { summary, .. } | Self::NoOp { summary } => summary,
        }
    }
}

/// Runs placements and keeps track of what they committed.
#[derive(Debug, Default)]
pub struct Placer {
    /// Configuration applied to every run and re-application.
    pub config: PlacementConfig,
    ledger: Ledger,
}

impl Placer {
    pub fn try_new(config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ledger: Ledger::new(),
        })
    }

    pub fn new(config: PlacementConfig) -> Self {
        debug_assert!(config.max_trials >= 1, "max_trials must be >= 1");
        debug_assert!(config.min_retry_step > 0.0, "min_retry_step must be > 0");

        Self {
            config,
            ledger: Ledger::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Places instances of `specs` along `path` and records the run if anything was placed.
    pub fn generate(
        &mut self,
        specs: &[AssetSpec],
        path: &Path,
        mode: SequenceMode,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
    ) -> Result<GenerateOutcome> {
        self.generate_with_events(specs, path, mode, ctx, rng, &mut ())
    }

    pub fn generate_with_events(
        &mut self,
        specs: &[AssetSpec],
        path: &Path,
        mode: SequenceMode,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<GenerateOutcome> {
        let result = run_generation(specs, path, mode, &self.config, ctx, rng, sink)?;
        let summary = result.summary;

        let outcome = if result.records.is_empty() {
            info!("Nothing was placed; no generation recorded.");
            GenerateOutcome::NoOp {
                summary: summary.clone(),
            }
        } else {
            let id = self
                .ledger
                .commit(result.records, path.clone(), result.specs)?;
            GenerateOutcome::Committed {
                id,
                summary: summary.clone(),
            }
        };

        sink.send(PlacementEvent::RunFinished {
            summary,
            generation: outcome.generation(),
        });
        Ok(outcome)
    }

    /// Like [`Placer::generate`], with the path taken from `provider` for `selection`.
    ///
    /// A selection without a path fails with [`crate::error::Error::MissingPath`]
    /// before the scene is touched or the ledger changes.
    pub fn generate_for_selection(
        &mut self,
        provider: &dyn PathProvider,
        selection: &str,
        specs: &[AssetSpec],
        mode: SequenceMode,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
    ) -> Result<GenerateOutcome> {
        self.generate_for_selection_with_events(provider, selection, specs, mode, ctx, rng, &mut ())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn generate_for_selection_with_events(
        &mut self,
        provider: &dyn PathProvider,
        selection: &str,
        specs: &[AssetSpec],
        mode: SequenceMode,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<GenerateOutcome> {
        let path = provider.path(selection)?;
        self.generate_with_events(specs, &path, mode, ctx, rng, sink)
    }

    /// Re-applies generation `id` with new specs and path; see [`Ledger::apply`].
    pub fn apply(
        &mut self,
        id: GenerationId,
        specs: &[AssetSpec],
        path: &Path,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
    ) -> Result<ApplySummary> {
        self.apply_with_events(id, specs, path, ctx, rng, &mut ())
    }

    pub fn apply_with_events(
        &mut self,
        id: GenerationId,
        specs: &[AssetSpec],
        path: &Path,
        ctx: &mut HostContext<'_>,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<ApplySummary> {
        let summary = self
            .ledger
            .apply(id, specs, path, &self.config, ctx, rng, sink)?;
        sink.send(PlacementEvent::GenerationApplied {
            id,
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Destroys every object of generation `id` and removes it from the ledger.
    pub fn delete(&mut self, id: GenerationId, scene: &mut dyn SceneHost) -> Result<DeleteSummary> {
        self.delete_with_events(id, scene, &mut ())
    }

    pub fn delete_with_events(
        &mut self,
        id: GenerationId,
        scene: &mut dyn SceneHost,
        sink: &mut dyn EventSink,
    ) -> Result<DeleteSummary> {
        let summary = self.ledger.delete(id, scene, sink)?;
        sink.send(PlacementEvent::GenerationDeleted {
            id,
            summary: summary.clone(),
        });
        Ok(summary)
    }
}
