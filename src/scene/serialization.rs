use super::{SavedPlacement, SceneRegistry, Transform};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene entry {index} is invalid: {reason}")]
    Invalid { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Persisted form of one placed object.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    #[serde(rename = "originalFile")]
    pub original_file: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl ObjectSnapshot {
    pub fn transform(&self) -> Transform {
        Transform::from_arrays(self.position, self.rotation, self.scale)
    }

    pub fn placement(&self) -> SavedPlacement {
        SavedPlacement {
            name: self.name.clone(),
            transform: self.transform(),
        }
    }
}

/// `{ "objects": [...] }`, in registry order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    pub objects: Vec<ObjectSnapshot>,
}

impl SceneDocument {
    /// Snapshot every selectable and listable object. The environment and
    /// anything else the user cannot pick stays out of the document.
    pub fn capture(registry: &SceneRegistry) -> Self {
        let objects = registry
            .list(|object| object.is_persistent())
            .filter_map(|(_, object)| {
                let original_file = object.source_asset.clone()?;
                Some(ObjectSnapshot {
                    name: object.name.clone(),
                    original_file,
                    position: object.transform.position.to_array(),
                    rotation: object.transform.rotation.to_array(),
                    scale: object.transform.scale.to_array(),
                })
            })
            .collect();
        Self { objects }
    }

    /// Check the whole document before anything in the live scene is touched.
    /// `retained` are names that survive a load (the non-listable objects);
    /// a document entry may not reuse them.
    pub fn validate<'a, I>(&self, retained: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let retained: HashSet<&str> = retained.into_iter().collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, entry) in self.objects.iter().enumerate() {
            let invalid = |reason: String| SerializationError::Invalid { index, reason };
            if entry.name.trim().is_empty() {
                return Err(invalid("empty name".to_string()));
            }
            if entry.original_file.trim().is_empty() {
                return Err(invalid(format!("'{}' has no originalFile", entry.name)));
            }
            let finite = entry
                .position
                .iter()
                .chain(&entry.rotation)
                .chain(&entry.scale)
                .all(|value| value.is_finite());
            if !finite {
                return Err(invalid(format!("'{}' has a non-finite transform", entry.name)));
            }
            if retained.contains(entry.name.as_str()) {
                return Err(invalid(format!(
                    "'{}' collides with a fixed scene object",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(invalid(format!("duplicate name '{}'", entry.name)));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn save_scene_to_file(document: &SceneDocument, path: &Path) -> Result<()> {
    std::fs::write(path, document.to_json()?)?;
    Ok(())
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneDocument> {
    let json = std::fs::read_to_string(path)?;
    SceneDocument::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Model, SceneObject};

    const NO_FIXED: [&str; 0] = [];

    fn snapshot(name: &str) -> ObjectSnapshot {
        ObjectSnapshot {
            name: name.to_string(),
            original_file: "chair.glb".to_string(),
            position: [1.0, 0.0, -2.5],
            rotation: [0.0, 1.25, 0.0],
            scale: [1.0, 2.0, 1.0],
        }
    }

    #[test]
    fn document_uses_external_field_names() {
        let document = SceneDocument {
            objects: vec![snapshot("chair_001")],
        };
        let json = document.to_json().unwrap();
        assert!(json.contains("\"originalFile\""));
        assert!(!json.contains("original_file"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["objects"][0]["name"], "chair_001");
        assert_eq!(value["objects"][0]["scale"][1], 2.0);
    }

    #[test]
    fn capture_skips_environment_and_keeps_order() {
        let mut registry = SceneRegistry::new();
        registry
            .add(SceneObject::environment("environment".to_string(), Model::new("env")))
            .unwrap();
        for name in ["lamp_001", "chair_001"] {
            let entry = snapshot(name);
            registry
                .add(SceneObject::placed(
                    name.to_string(),
                    entry.original_file.clone(),
                    entry.transform(),
                    Model::new(name),
                ))
                .unwrap();
        }

        let document = SceneDocument::capture(&registry);
        assert_eq!(
            document.objects,
            vec![snapshot("lamp_001"), snapshot("chair_001")]
        );
    }

    #[test]
    fn validate_rejects_broken_entries() {
        let mut document = SceneDocument {
            objects: vec![snapshot("a"), snapshot("a")],
        };
        assert!(matches!(
            document.validate(NO_FIXED),
            Err(SerializationError::Invalid { index: 1, .. })
        ));

        document.objects[1].name = "b".to_string();
        document.objects[1].position[0] = f32::NAN;
        assert!(document.validate(NO_FIXED).is_err());

        document.objects[1].position[0] = 0.0;
        document.objects[1].original_file.clear();
        assert!(document.validate(NO_FIXED).is_err());

        document.objects[1].original_file = "chair.glb".to_string();
        assert!(document.validate(NO_FIXED).is_ok());
        assert!(matches!(
            document.validate(["b"]),
            Err(SerializationError::Invalid { index: 1, .. })
        ));
    }

    #[test]
    fn missing_fields_are_a_json_error() {
        let err = SceneDocument::from_json(r#"{ "objects": [ { "name": "x" } ] }"#).unwrap_err();
        assert!(matches!(err, SerializationError::Json(_)));
    }

    #[test]
    fn save_load_stress_loop_via_file() {
        let mut document = SceneDocument {
            objects: vec![snapshot("chair_001"), snapshot("chair_002")],
        };

        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "setdress_scene_stress_{}_{}.json",
            std::process::id(),
            nonce
        ));

        let original = document.clone();
        for _ in 0..50 {
            save_scene_to_file(&document, &path).unwrap();
            document = load_scene_from_file(&path).unwrap();
            assert_eq!(document, original);
        }

        let _ = std::fs::remove_file(path);
    }
}
