use std::path::Path;

/// On-disk manifest listing the importable assets: `{ "files": [...] }`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AssetManifest {
    pub files: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read asset manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse asset manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Asset identifiers the editor may import, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    files: Vec<String>,
}

impl AssetCatalog {
    pub fn new(files: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(files.len());
        for file in files {
            let file = file.trim().to_string();
            if !file.is_empty() && !unique.contains(&file) {
                unique.push(file);
            }
        }
        Self { files: unique }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(path: &str, json: &str) -> Result<Self, CatalogError> {
        let manifest: AssetManifest =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                path: path.to_string(),
                source,
            })?;
        Ok(Self::new(manifest.files))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &json)
    }

    /// Read the manifest once at startup. A missing or broken manifest leaves
    /// the editor usable with nothing to import.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                log::info!("Asset catalog: {} importable assets", catalog.len());
                catalog
            }
            Err(err) => {
                log::warn!("{}; continuing with an empty asset catalog", err);
                Self::empty()
            }
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(String::as_str)
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.files.iter().any(|file| file == asset_id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manifest_in_order_without_duplicates() {
        let catalog = AssetCatalog::from_json(
            "file-list.json",
            r#"{ "files": ["chair.glb", "table.gltf", "chair.glb", "  "] }"#,
        )
        .unwrap();
        assert_eq!(catalog.files(), ["chair.glb", "table.gltf"]);
        assert!(catalog.contains("table.gltf"));
        assert!(!catalog.contains("lamp.glb"));
    }

    #[test]
    fn malformed_manifest_is_a_parse_error() {
        let err = AssetCatalog::from_json("file-list.json", r#"{ "files": 3 }"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn missing_manifest_degrades_to_empty() {
        let mut path = std::env::temp_dir();
        path.push(format!("setdress_missing_manifest_{}.json", std::process::id()));
        let catalog = AssetCatalog::load_or_empty(&path);
        assert!(catalog.is_empty());
    }

    #[test]
    fn manifest_file_roundtrip() {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "setdress_manifest_{}_{}.json",
            std::process::id(),
            nonce
        ));
        let manifest = AssetManifest {
            files: vec!["sofa_001.glb".to_string()],
        };
        std::fs::write(&path, serde_json::to_string(&manifest).unwrap()).unwrap();

        let catalog = AssetCatalog::load(&path).unwrap();
        assert_eq!(catalog.get(0), Some("sofa_001.glb"));

        let _ = std::fs::remove_file(path);
    }
}
