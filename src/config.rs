use std::path::{Path, PathBuf};

/// Names the JSON file to read settings from.
pub const CONFIG_ENV: &str = "SETDRESS_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Imports load `<asset_root>/<asset id>`.
    pub asset_root: PathBuf,
    pub manifest_path: PathBuf,
    /// Loaded at startup as the fixed, unselectable environment.
    pub environment_asset: Option<PathBuf>,
    pub environment_name: String,
    pub viewport: [u32; 2],
    /// The on-screen preview renders at the window size divided by this.
    pub preview_divisor: u32,
    pub export_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("geo"),
            manifest_path: PathBuf::from("file-list.json"),
            environment_asset: Some(PathBuf::from("geoBase/environment.gltf")),
            environment_name: "environment".to_string(),
            viewport: [1280, 720],
            preview_divisor: 2,
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: display,
            source,
        })
    }

    /// Settings from the file named by `SETDRESS_CONFIG`, or the defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {}", Path::new(&path).display());
                config
            }
            Err(err) => {
                log::warn!("{}; using default config", err);
                Self::default()
            }
        }
    }
}
