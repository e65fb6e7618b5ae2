//! Interfaces to the collaborators that live outside the placement core.
//!
//! - [`PathProvider`]: curve authoring, yields a [`Path`] snapshot for a selection.
//! - [`ContentStore`]: asset lookup and unscaled bounds.
//! - [`SceneHost`]: spawns, moves, queries, and destroys live objects.
//!
//! Every host call returns an explicit `Result`; the placement core decides how each
//! failure degrades (skip an instance, skip a record) instead of aborting the run.
//! In-memory implementations live in [`memory`].
use std::fmt;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::path::{Path, Rotation};

pub mod memory;

pub use memory::{InMemoryContent, InMemoryScene};

/// Opaque, stable identifier of a live object owned by the scene host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World transform of a placed object.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: DVec3,
    pub rotation: Rotation,
    pub scale: DVec3,
}

impl Transform {
    pub fn new(translation: DVec3, rotation: Rotation, scale: DVec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(translation, Rotation::IDENTITY, DVec3::ONE)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(DVec3::ZERO)
    }
}

/// Axis-aligned bounds reported by the scene host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: DVec3,
    pub half_extent: DVec3,
}

impl Bounds {
    pub fn new(center: DVec3, half_extent: DVec3) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Radius of the bounding-sphere proxy: the largest half extent.
    pub fn sphere_radius(&self) -> f64 {
        self.half_extent.abs().max_element()
    }
}

/// Failures reported by a [`SceneHost`].
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("unknown object handle {0}")]
    UnknownHandle(ObjectHandle),

    #[error("failed to spawn '{asset_id}': {reason}")]
    SpawnFailed { asset_id: String, reason: String },

    #[error("scene host error: {0}")]
    Other(String),
}

/// Source of path snapshots, keyed by an editor selection.
pub trait PathProvider {
    /// Returns the path for `selection`, or [`crate::error::Error::MissingPath`].
    fn path(&self, selection: &str) -> Result<Path>;
}

/// Asset catalogue consulted before spawning.
pub trait ContentStore {
    fn exists(&self, asset_id: &str) -> bool;

    /// Unscaled half extent of the asset's axis-aligned bounds.
    fn half_extent(&self, asset_id: &str) -> Result<DVec3>;
}

/// The scene that owns live objects.
pub trait SceneHost {
    fn spawn(
        &mut self,
        asset_id: &str,
        transform: &Transform,
    ) -> std::result::Result<ObjectHandle, HostError>;

    fn destroy(&mut self, handle: ObjectHandle) -> std::result::Result<(), HostError>;

    fn set_transform(
        &mut self,
        handle: ObjectHandle,
        transform: &Transform,
    ) -> std::result::Result<(), HostError>;

    fn query_bounds(&self, handle: ObjectHandle) -> std::result::Result<Bounds, HostError>;

    fn contains(&self, handle: ObjectHandle) -> bool;

    fn find_by_label(&self, label: &str) -> Option<ObjectHandle>;

    /// Display label assigned by the host, if it assigns one.
    fn label(&self, _handle: ObjectHandle) -> Option<String> {
        None
    }
}

/// The collaborators a placement operation talks to.
pub struct HostContext<'a> {
    pub content: &'a dyn ContentStore,
    pub scene: &'a mut dyn SceneHost,
}

impl<'a> HostContext<'a> {
    pub fn new(content: &'a dyn ContentStore, scene: &'a mut dyn SceneHost) -> Self {
        Self { content, scene }
    }

    /// Resolves a stored handle, falling back to a label lookup when the handle is stale.
    ///
    /// Only labels the host assigned itself are looked up; without one a stale handle
    /// resolves to `None`.
    pub fn resolve(&self, handle: ObjectHandle, label: Option<&str>) -> Option<ObjectHandle> {
        resolve_handle(&*self.scene, handle, label)
    }
}

/// Stored handle if still live, else the object carrying the host-assigned `label`.
pub(crate) fn resolve_handle(
    scene: &dyn SceneHost,
    handle: ObjectHandle,
    label: Option<&str>,
) -> Option<ObjectHandle> {
    if scene.contains(handle) {
        Some(handle)
    } else {
        label.and_then(|l| scene.find_by_label(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_radius_is_max_half_extent() {
        let b = Bounds::new(DVec3::ZERO, DVec3::new(3.0, -7.0, 5.0));
        assert_eq!(b.sphere_radius(), 7.0);
    }

    #[test]
    fn resolve_prefers_handle_then_label() {
        let content = InMemoryContent::new().with_asset("crate", [1.0, 1.0, 1.0]);
        let mut scene = InMemoryScene::from_content(&content);
        let handle = scene
            .spawn("crate", &Transform::default())
            .expect("spawn succeeds");
        let label = scene.label(handle).expect("labelled");

        let ctx = HostContext::new(&content, &mut scene);
        assert_eq!(ctx.resolve(handle, Some(&label)), Some(handle));
        assert_eq!(ctx.resolve(ObjectHandle(999), Some(&label)), Some(handle));
        assert_eq!(ctx.resolve(ObjectHandle(999), Some("nope")), None);
        assert_eq!(ctx.resolve(ObjectHandle(999), None), None);
    }
}
