use std::collections::BTreeMap;

use tableau_common::{InstanceId, ObjectId, Transform};

use crate::object::SceneObject;

/// The scene graph. Owns every renderable object; collaborators hold
/// `ObjectId`s and write into transform slots through `get_mut`.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Insert an object and return its id.
    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::new();
        tracing::debug!(name = %object.name, ?id, "scene insert");
        self.objects.insert(id, object);
        id
    }

    /// Remove an object, freeing its slot. Returns the object if present.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Deterministic iteration over all objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    /// The single transform of an object, if it is a `Single` node.
    pub fn transform(&self, id: ObjectId) -> Option<&Transform> {
        self.objects.get(&id).and_then(|o| o.node.transform())
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Option<&mut Transform> {
        self.objects.get_mut(&id).and_then(|o| o.node.transform_mut())
    }

    /// The transform of one instance slot, located by instance id.
    pub fn instance_transform(&self, id: ObjectId, instance: InstanceId) -> Option<&Transform> {
        self.objects.get(&id).and_then(|o| {
            o.node
                .instances()
                .iter()
                .find(|i| i.id == instance)
                .map(|i| &i.transform)
        })
    }
}
