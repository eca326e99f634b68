pub mod catalog;
pub mod gltf_loader;

pub use catalog::{AssetCatalog, CatalogError};
pub use gltf_loader::GltfLoader;

use crate::scene::Model;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF at {path}: {source}")]
    ParseGltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF at {path} has no scene to instantiate")]
    NoScene { path: String },
    #[error("asset at {path} contains no triangle geometry")]
    NoGeometry { path: String },
}

/// Turns an asset file into a renderable node tree.
///
/// Failures are terminal for the one import attempt that triggered them;
/// there is no retry.
pub trait ModelLoader {
    fn load(&self, path: &Path) -> Result<Model, AssetError>;
}

impl<L: ModelLoader + ?Sized> ModelLoader for Box<L> {
    fn load(&self, path: &Path) -> Result<Model, AssetError> {
        (**self).load(path)
    }
}
