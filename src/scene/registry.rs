//! The authoritative, ordered set of placed objects.

use super::{ObjectKey, SceneObject};
use slotmap::SlotMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("an object named '{0}' is already in the scene")]
    DuplicateName(String),
}

/// Objects keyed by [`ObjectKey`], iterated in insertion (import) order.
#[derive(Default)]
pub struct SceneRegistry {
    objects: SlotMap<ObjectKey, SceneObject>,
    order: Vec<ObjectKey>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Append `object`. Names are unique; callers resolve collisions first.
    pub fn add(&mut self, object: SceneObject) -> Result<ObjectKey, RegistryError> {
        if self.find(&object.name).is_some() {
            return Err(RegistryError::DuplicateName(object.name));
        }
        let key = self.objects.insert(object);
        self.order.push(key);
        Ok(key)
    }

    pub fn remove(&mut self, key: ObjectKey) -> Option<SceneObject> {
        let object = self.objects.remove(key)?;
        self.order.retain(|existing| *existing != key);
        Some(object)
    }

    pub fn find(&self, name: &str) -> Option<ObjectKey> {
        self.order
            .iter()
            .copied()
            .find(|key| self.objects[*key].name == name)
    }

    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.order.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> + Clone + '_ {
        self.order.iter().map(move |key| (*key, &self.objects[*key]))
    }

    /// Lazy view of the members matching `filter`, in registry order. The
    /// iterator is `Clone`, so a caller can walk it more than once.
    pub fn list<F>(&self, filter: F) -> impl Iterator<Item = (ObjectKey, &SceneObject)> + Clone + '_
    where
        F: Fn(&SceneObject) -> bool + Clone + 'static,
    {
        self.iter().filter(move |(_, object)| filter(object))
    }

    /// Remove every member matching `filter` and return them in registry order.
    pub fn remove_where<F>(&mut self, filter: F) -> Vec<SceneObject>
    where
        F: Fn(&SceneObject) -> bool,
    {
        let doomed: Vec<ObjectKey> = self
            .iter()
            .filter(|(_, object)| filter(object))
            .map(|(key, _)| key)
            .collect();
        doomed
            .into_iter()
            .filter_map(|key| self.remove(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Model, Transform};

    fn prop(name: &str) -> SceneObject {
        SceneObject::placed(
            name.to_string(),
            "chair.glb".to_string(),
            Transform::default(),
            Model::new(name),
        )
    }

    #[test]
    fn add_rejects_duplicate_names() {
        let mut registry = SceneRegistry::new();
        registry.add(prop("chair_001")).unwrap();
        assert_eq!(
            registry.add(prop("chair_001")),
            Err(RegistryError::DuplicateName("chair_001".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_keeps_insertion_order_and_invalidates_key() {
        let mut registry = SceneRegistry::new();
        let a = registry.add(prop("a")).unwrap();
        let b = registry.add(prop("b")).unwrap();
        let c = registry.add(prop("c")).unwrap();

        assert_eq!(registry.remove(b).map(|object| object.name), Some("b".to_string()));
        assert!(registry.get(b).is_none());
        assert!(registry.remove(b).is_none());
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec![a, c]);

        // A new object never revives the stale key.
        let d = registry.add(prop("b")).unwrap();
        assert_ne!(d, b);
        assert!(registry.get(b).is_none());
    }

    #[test]
    fn list_is_lazy_filtered_and_restartable() {
        let mut registry = SceneRegistry::new();
        registry
            .add(SceneObject::environment("environment".to_string(), Model::new("env")))
            .unwrap();
        registry.add(prop("lamp_001")).unwrap();
        registry.add(prop("lamp_002")).unwrap();

        let listable = registry.list(|object| object.listable);
        let first: Vec<_> = listable.clone().map(|(_, o)| o.name.clone()).collect();
        let second: Vec<_> = listable.map(|(_, o)| o.name.clone()).collect();
        assert_eq!(first, vec!["lamp_001", "lamp_002"]);
        assert_eq!(first, second);
    }

    #[test]
    fn remove_where_spares_non_matching_members() {
        let mut registry = SceneRegistry::new();
        registry
            .add(SceneObject::environment("environment".to_string(), Model::new("env")))
            .unwrap();
        registry.add(prop("a")).unwrap();
        registry.add(prop("b")).unwrap();

        let removed = registry.remove_where(SceneObject::is_persistent);
        assert_eq!(
            removed.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.find("environment").is_some());
    }
}
