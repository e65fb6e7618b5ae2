//! Overlap-avoiding search for a single instance along a path.
//!
//! Every object is approximated by a bounding sphere whose radius is the largest half
//! extent of its axis-aligned bounds. Neighbouring instances are spaced by the
//! [`advance`] rule; when a trial still collides with an already committed sphere of
//! the same run, the trial is destroyed and the search steps further along the path.
use glam::DVec3;
use rand::RngCore;
use tracing::warn;

use crate::host::{Bounds, HostContext, HostError, ObjectHandle, Transform};
use crate::params::{draw_scatter_offset, PlacementRequest};
use crate::path::{right_axis, rotation_aligned_to, Path};
use crate::placement::events::{EventSink, PlacementEvent};
use crate::placement::PlacementConfig;

/// Sphere proxy used for overlap tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether the spheres are closer than their radii plus `buffer`.
    pub fn overlaps(&self, other: &BoundingSphere, buffer: f64) -> bool {
        self.center.distance(other.center) < self.radius + other.radius + buffer
    }
}

impl From<Bounds> for BoundingSphere {
    fn from(bounds: Bounds) -> Self {
        Self::new(bounds.center, bounds.sphere_radius())
    }
}

/// Why a single instance was not placed.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Every trial overlapped an earlier placement.
    TrialsExhausted { trials: usize },
    /// The search ran past the end of the path.
    PathExhausted,
    /// The scene host refused the trial object.
    Host(HostError),
}

/// Arc length to advance before placing the next instance.
pub fn advance(prev_radius: f64, curr_radius: f64, spacing: f64, config: &PlacementConfig) -> f64 {
    prev_radius + curr_radius + spacing + config.advance_epsilon
}

/// Arc length to step after a rejected trial.
pub fn retry_step(spacing: f64, config: &PlacementConfig) -> f64 {
    (spacing * 0.5).max(config.min_retry_step)
}

/// Transform for `request` at `distance`: path position plus lateral scatter, with the
/// resolved rotation or one aligned to the path tangent.
pub fn candidate_transform(
    path: &Path,
    distance: f64,
    request: &PlacementRequest,
    rng: &mut dyn RngCore,
) -> Transform {
    let point = path.sample_at(distance);
    let rotation = request
        .rotation
        .unwrap_or_else(|| rotation_aligned_to(point.direction));
    let offset = draw_scatter_offset(request.scatter, rng);
    let translation = point.position + right_axis(point.direction) * offset;
    Transform::new(translation, rotation, request.scale)
}

/// A trial that passed the overlap test and stays in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedTrial {
    pub handle: ObjectHandle,
    pub transform: Transform,
    pub distance: f64,
    pub sphere: BoundingSphere,
    pub trials: usize,
}

/// Tracks committed spheres of one run and searches free spots for new instances.
pub struct OverlapResolver<'c> {
    config: &'c PlacementConfig,
    committed: Vec<BoundingSphere>,
}

impl<'c> OverlapResolver<'c> {
    pub fn new(config: &'c PlacementConfig) -> Self {
        Self {
            config,
            committed: Vec::new(),
        }
    }

    pub fn committed(&self) -> &[BoundingSphere] {
        &self.committed
    }

    /// Radius of the most recently committed object.
    pub fn last_radius(&self) -> Option<f64> {
        self.committed.last().map(|s| s.radius)
    }

    pub fn overlaps_any(&self, sphere: &BoundingSphere) -> bool {
        self.committed
            .iter()
            .any(|c| c.overlaps(sphere, self.config.overlap_buffer))
    }

    /// Searches for a free spot starting at `*distance`.
    ///
    /// `content_radius` is the unscaled bounding radius from the content store; it is
    /// only used when the host cannot report bounds for a trial. On return
    /// `*distance` holds the distance of the last trial (including retry steps).
    /// Recoverable host failures are logged and sent to `sink` as warnings.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        request: &PlacementRequest,
        content_radius: f64,
        distance: &mut f64,
        path: &Path,
        ctx: &mut HostContext<'_>,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<AcceptedTrial, SkipReason> {
        let max_trials = self.config.max_trials;
        for trial in 1..=max_trials {
            let transform = candidate_transform(path, *distance, request, rng);
            let handle = match ctx.scene.spawn(&request.asset_id, &transform) {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("Failed to spawn trial for '{}': {}.", request.asset_id, e);
                    return Err(SkipReason::Host(e));
                }
            };

            let sphere = match ctx.scene.query_bounds(handle) {
                Ok(bounds) => BoundingSphere::from(bounds),
                Err(e) => {
                    let message = format!("bounds query failed ({e}); using content bounds.");
                    warn!("{}: {}", request.asset_id, message);
                    sink.send(PlacementEvent::Warning {
                        context: request.asset_id.clone(),
                        message,
                    });
                    BoundingSphere::new(
                        transform.translation,
                        content_radius * request.scale.abs().max_element(),
                    )
                }
            };

            if !self.overlaps_any(&sphere) {
                self.committed.push(sphere);
                return Ok(AcceptedTrial {
                    handle,
                    transform,
                    distance: *distance,
                    sphere,
                    trials: trial,
                });
            }

            if let Err(e) = ctx.scene.destroy(handle) {
                let message = format!("failed to destroy rejected trial {handle}: {e}.");
                warn!("{}: {}", request.asset_id, message);
                sink.send(PlacementEvent::Warning {
                    context: request.asset_id.clone(),
                    message,
                });
            }
            if trial == max_trials {
                break;
            }
            *distance += retry_step(request.spacing, self.config);
            if *distance > path.total_length() {
                return Err(SkipReason::PathExhausted);
            }
        }

        Err(SkipReason::TrialsExhausted { trials: max_trials })
    }
}
