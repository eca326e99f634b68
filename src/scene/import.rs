//! Turns asset identifiers into uniquely named registry members.

use super::{ObjectKey, RegistryError, SceneObject, SceneRegistry, Transform};
use crate::assets::{AssetCatalog, AssetError, ModelLoader};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("'{0}' is not in the asset catalog")]
    NotInCatalog(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Name and transform recorded in a scene document. Restoring trusts both.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPlacement {
    pub name: String,
    pub transform: Transform,
}

pub struct ModelImporter<L> {
    loader: L,
    asset_root: PathBuf,
}

impl<L: ModelLoader> ModelImporter<L> {
    pub fn new(loader: L, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            asset_root: asset_root.into(),
        }
    }

    /// Load `asset_id` and register it.
    ///
    /// Without `saved`, the asset must be in the catalog and gets the first
    /// free `base_NNN` name. With `saved`, the stored name and transform are
    /// used verbatim. Nothing is registered unless the load succeeds.
    pub fn import_asset(
        &self,
        registry: &mut SceneRegistry,
        catalog: &AssetCatalog,
        asset_id: &str,
        saved: Option<&SavedPlacement>,
    ) -> Result<ObjectKey, ImportError> {
        let (name, transform) = match saved {
            Some(placement) => (placement.name.clone(), placement.transform),
            None => {
                if !catalog.contains(asset_id) {
                    return Err(ImportError::NotInCatalog(asset_id.to_string()));
                }
                (unique_name(registry, &base_name(asset_id)), Transform::default())
            }
        };

        let model = self.loader.load(&self.asset_root.join(asset_id))?;
        let key = registry.add(SceneObject::placed(
            name,
            asset_id.to_string(),
            transform,
            model,
        ))?;
        Ok(key)
    }

    /// Bootstrap the fixed environment object. It is loaded relative to the
    /// working directory, keeps `name` as given and is neither selectable nor
    /// listable.
    pub fn import_environment(
        &self,
        registry: &mut SceneRegistry,
        path: &Path,
        name: &str,
    ) -> Result<ObjectKey, ImportError> {
        let model = self.loader.load(path)?;
        let key = registry.add(SceneObject::environment(name.to_string(), model))?;
        Ok(key)
    }
}

/// `props/chair_001.glb` -> `chair`: file name, minus extension, minus one
/// trailing three digit disambiguation suffix.
pub fn base_name(asset_id: &str) -> String {
    let file_name = Path::new(asset_id)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(asset_id);
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };
    match stem.rsplit_once('_') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() == 3
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base.to_string()
        }
        _ => stem.to_string(),
    }
}

/// First `base_NNN` (starting at 001) absent from the registry right now.
pub fn unique_name(registry: &SceneRegistry, base: &str) -> String {
    let mut counter: u32 = 1;
    loop {
        let candidate = format!("{}_{:03}", base, counter);
        if registry.find(&candidate).is_none() {
            return candidate;
        }
        counter += 1;
    }
}
