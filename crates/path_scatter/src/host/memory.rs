//! In-memory implementations of the host traits.
//!
//! [`InMemoryScene`] models bounds as the asset's half extent scaled by the object's
//! transform (rotation is ignored, the sphere proxy only needs the largest axis).
//! Labels follow the `{asset}_{n}` convention, numbered per asset and never reused.
use std::collections::{BTreeMap, HashMap};

use glam::DVec3;

use crate::error::{Error, Result};
use crate::host::{Bounds, ContentStore, HostError, ObjectHandle, PathProvider, SceneHost, Transform};
use crate::params::AssetId;
use crate::path::Path;

/// Content store backed by a map of asset ids to unscaled half extents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    extents: HashMap<AssetId, DVec3>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self {
            extents: HashMap::new(),
        }
    }

    /// Registers an asset with the given half extent.
    pub fn with_asset(mut self, id: impl Into<AssetId>, half_extent: impl Into<DVec3>) -> Self {
        self.insert(id, half_extent);
        self
    }

    pub fn insert(&mut self, id: impl Into<AssetId>, half_extent: impl Into<DVec3>) {
        self.extents.insert(id.into(), half_extent.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<DVec3> {
        self.extents.remove(id)
    }

    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }
}

impl ContentStore for InMemoryContent {
    fn exists(&self, asset_id: &str) -> bool {
        self.extents.contains_key(asset_id)
    }

    fn half_extent(&self, asset_id: &str) -> Result<DVec3> {
        self.extents
            .get(asset_id)
            .copied()
            .ok_or_else(|| Error::Content {
                asset_id: asset_id.to_owned(),
                reason: "not registered".into(),
            })
    }
}

/// A live object in an [`InMemoryScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub asset_id: AssetId,
    pub label: String,
    pub transform: Transform,
    pub half_extent: DVec3,
}

/// Scene host that keeps objects in a map keyed by handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    extents: HashMap<AssetId, DVec3>,
    objects: BTreeMap<ObjectHandle, SceneObject>,
    label_counters: HashMap<AssetId, u64>,
    next_handle: u64,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scene that can spawn every asset registered in `content`.
    pub fn from_content(content: &InMemoryContent) -> Self {
        Self {
            extents: content.extents.clone(),
            ..Self::default()
        }
    }

    pub fn register_asset(&mut self, id: impl Into<AssetId>, half_extent: impl Into<DVec3>) {
        self.extents.insert(id.into(), half_extent.into());
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(&handle)
    }

    /// Live objects in spawn order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &SceneObject)> {
        self.objects.iter().map(|(h, o)| (*h, o))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SceneHost for InMemoryScene {
    fn spawn(
        &mut self,
        asset_id: &str,
        transform: &Transform,
    ) -> std::result::Result<ObjectHandle, HostError> {
        let half_extent = *self
            .extents
            .get(asset_id)
            .ok_or_else(|| HostError::SpawnFailed {
                asset_id: asset_id.to_owned(),
                reason: "asset not loaded in scene".into(),
            })?;

        let counter = self.label_counters.entry(asset_id.to_owned()).or_insert(0);
        let label = format!("{asset_id}_{counter}");
        *counter += 1;

        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(
            handle,
            SceneObject {
                asset_id: asset_id.to_owned(),
                label,
                transform: *transform,
                half_extent,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: ObjectHandle) -> std::result::Result<(), HostError> {
        self.objects
            .remove(&handle)
            .map(|_| ())
            .ok_or(HostError::UnknownHandle(handle))
    }

    fn set_transform(
        &mut self,
        handle: ObjectHandle,
        transform: &Transform,
    ) -> std::result::Result<(), HostError> {
        let object = self
            .objects
            .get_mut(&handle)
            .ok_or(HostError::UnknownHandle(handle))?;
        object.transform = *transform;
        Ok(())
    }

    fn query_bounds(&self, handle: ObjectHandle) -> std::result::Result<Bounds, HostError> {
        let object = self
            .objects
            .get(&handle)
            .ok_or(HostError::UnknownHandle(handle))?;
        Ok(Bounds::new(
            object.transform.translation,
            object.half_extent * object.transform.scale.abs(),
        ))
    }

    fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn find_by_label(&self, label: &str) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .find(|(_, o)| o.label == label)
            .map(|(h, _)| *h)
    }

    fn label(&self, handle: ObjectHandle) -> Option<String> {
        self.objects.get(&handle).map(|o| o.label.clone())
    }
}

impl PathProvider for HashMap<String, Path> {
    fn path(&self, selection: &str) -> Result<Path> {
        self.get(selection).cloned().ok_or_else(|| Error::MissingPath {
            selection: selection.to_owned(),
        })
    }
}
