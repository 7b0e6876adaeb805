use crate::prelude::*;

use std::collections::HashMap;

/// Emissive colours saved while an entity is highlighted. Keeps the
/// bookkeeping off the exhibit's own components.
#[derive(Resource, Debug, Default)]
pub struct HighlightTable {
    saved: HashMap<Entity, [f32; 3]>,
}

impl HighlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_highlighted(&self, entity: Entity) -> bool {
        self.saved.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Override the emissive colour. The original is only saved the first
    /// time, so repeated calls never save the highlight itself.
    pub fn highlight(&mut self, entity: Entity, material: &mut Material, color: [f32; 3]) {
        self.saved.entry(entity).or_insert(material.emissive);
        material.emissive = color;
    }

    /// Restore the saved emissive colour. Returns false if the entity was
    /// not highlighted.
    pub fn clear(&mut self, entity: Entity, material: &mut Material) -> bool {
        match self.saved.remove(&entity) {
            Some(emissive) => {
                material.emissive = emissive;
                true
            }
            None => false,
        }
    }

    /// Drop the saved colour of an entity whose material is gone
    pub fn forget(&mut self, entity: Entity) -> bool {
        self.saved.remove(&entity).is_some()
    }

    /// Restore every saved colour that still has a material to go back to
    pub fn restore_all(&mut self, world: &mut World) {
        for (entity, emissive) in self.saved.drain() {
            if let Some(mut material) = world.get_mut::<Material>(entity) {
                material.emissive = emissive;
            }
        }
    }
}
