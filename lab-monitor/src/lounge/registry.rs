//! Equipment registry - ordered list of lounge equipment
//!
//! Insertion order is display order. Only ids are unique; names may repeat.

use shared::models::{Equipment, EquipmentType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentRegistry {
    items: Vec<Equipment>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored list, repairing occupied flags that disagree
    /// with their sessions.
    pub fn from_stored(mut items: Vec<Equipment>) -> Self {
        for eq in &mut items {
            if eq.normalize() {
                tracing::warn!(equipment_id = %eq.id, name = %eq.name, "Repaired inconsistent occupied flag");
            }
        }
        Self { items }
    }

    /// Append new free equipment and return a copy of it
    pub fn add(&mut self, name: impl Into<String>, kind: EquipmentType) -> Equipment {
        let equipment = Equipment::new(name, kind);
        self.items.push(equipment.clone());
        equipment
    }

    /// Remove by id; unknown ids are a no-op
    pub fn remove(&mut self, id: &str) -> Option<Equipment> {
        let pos = self.items.iter().position(|eq| eq.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Apply `transform` to the matching equipment.
    ///
    /// Returns `None` (and leaves everything untouched) if `id` is unknown.
    pub fn update_by_id<R>(&mut self, id: &str, transform: impl FnOnce(&mut Equipment) -> R) -> Option<R> {
        self.items.iter_mut().find(|eq| eq.id == id).map(transform)
    }

    pub fn get(&self, id: &str) -> Option<&Equipment> {
        self.items.iter().find(|eq| eq.id == id)
    }

    /// Resolve an operator selector: 1-based display index, exact id, or
    /// case-insensitive name (first match).
    pub fn find(&self, selector: &str) -> Option<&Equipment> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>()
            && index >= 1
            && let Some(eq) = self.items.get(index - 1)
        {
            return Some(eq);
        }
        self.get(selector).or_else(|| {
            self.items
                .iter()
                .find(|eq| eq.name.eq_ignore_ascii_case(selector))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Equipment> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn occupied_count(&self) -> usize {
        self.items.iter().filter(|eq| eq.is_occupied()).count()
    }

    /// Cloned list for persistence and rendering
    pub fn snapshot(&self) -> Vec<Equipment> {
        self.items.clone()
    }

    pub fn as_slice(&self) -> &[Equipment] {
        &self.items
    }
}
