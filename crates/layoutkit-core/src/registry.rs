//! Name registries for placed shapes.
//!
//! Each shape variant has its own registry. The registry owns its shapes by
//! value, keyed by their unique name, and remembers insertion order so the
//! export lists shapes the way they were placed.

use crate::shapes::{ShapeId, ShapeKind, ShapeTrait};
use indexmap::IndexMap;
use serde::Serialize;

/// A shape that can live in a [`NameRegistry`].
pub trait Registered: ShapeTrait {
    /// Variant stored by registries of this type.
    const KIND: ShapeKind;

    /// Serializable projection written by the exporter.
    type Fields: Serialize + Clone + std::fmt::Debug;

    /// Overwrite the shape's own name field.
    fn set_name(&mut self, name: String);

    fn export_fields(&self) -> Self::Fields;
}

/// Name -> shape mapping with auto-naming.
#[derive(Debug, Clone)]
pub struct NameRegistry<T: Registered> {
    entries: IndexMap<String, T>,
    counter: u32,
}

impl<T: Registered> Default for NameRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Registered> NameRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            counter: 0,
        }
    }

    fn prefix() -> &'static str {
        T::KIND.name_prefix()
    }

    /// Register a shape and return the name it was stored under.
    ///
    /// Without a requested name the next `<Prefix><n>` is issued. A requested
    /// name that is already taken gets `_1`, `_2`, ... appended. Never fails.
    pub fn add(&mut self, mut object: T, requested: Option<&str>) -> String {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());

        let name = match requested {
            None => loop {
                let Some(next) = self.counter.checked_add(1) else {
                    // Numbering exhausted: disambiguate the last number instead.
                    break self.suffixed(&format!("{}{}", Self::prefix(), self.counter));
                };
                self.counter = next;
                let candidate = format!("{}{}", Self::prefix(), self.counter);
                if !self.entries.contains_key(&candidate) {
                    break candidate;
                }
            },
            Some(base) if !self.entries.contains_key(base) => base.to_string(),
            Some(base) => self.suffixed(base),
        };

        if let Some(n) = self.auto_number(&name) {
            self.counter = self.counter.max(n);
        }

        object.set_name(name.clone());
        self.entries.insert(name.clone(), object);
        name
    }

    /// First free `<base>_<n>` for n = 1, 2, ...
    fn suffixed(&self, base: &str) -> String {
        (1u64..)
            .map(|suffix| format!("{base}_{suffix}"))
            .find(|candidate| !self.entries.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Numeric suffix of names shaped like `<Prefix><digits>`. Numbers the
    /// counter could not advance past are ignored.
    fn auto_number(&self, name: &str) -> Option<u32> {
        let digits = name.strip_prefix(Self::prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|n| *n < u32::MAX)
    }

    /// Remove a shape by name. Missing names are ignored.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(name)
    }

    /// Re-key a shape in place under the trimmed `new_name`. Returns false
    /// without mutating anything when `old_name` is missing or `new_name` is
    /// blank or already present.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() || self.entries.contains_key(new_name) {
            return false;
        }
        let Some(index) = self.entries.get_index_of(old_name) else {
            return false;
        };
        let Some((_, mut object)) = self.entries.shift_remove_index(index) else {
            return false;
        };
        object.set_name(new_name.to_string());
        self.entries.shift_insert(index, new_name.to_string(), object);
        true
    }

    /// Empty the registry and reset the counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counter = 0;
    }

    /// Export projection of every entry, in registry order.
    pub fn snapshot(&self) -> IndexMap<String, T::Fields> {
        self.entries
            .iter()
            .map(|(name, object)| (name.clone(), object.export_fields()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(name)
    }

    pub fn find_by_id(&self, id: ShapeId) -> Option<&T> {
        self.entries.values().find(|object| object.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: ShapeId) -> Option<&mut T> {
        self.entries.values_mut().find(|object| object.id() == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, object)| (name.as_str(), object))
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (&str, &mut T)> {
        self.entries
            .iter_mut()
            .map(|(name, object)| (name.as_str(), object))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest auto-assigned number seen so far.
    pub fn counter(&self) -> u32 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BoxShape, LabelShape, Typography};
    use kurbo::{Point, Rect};

    fn a_box() -> BoxShape {
        BoxShape::new(Rect::new(0.0, 0.0, 50.0, 50.0), Typography::default())
    }

    fn a_label() -> LabelShape {
        LabelShape::new(Point::new(10.0, 10.0), Typography::default())
    }

    #[test]
    fn test_auto_names_are_distinct_and_increasing() {
        let mut registry = NameRegistry::new();
        let names: Vec<String> = (0..5).map(|_| registry.add(a_box(), None)).collect();
        assert_eq!(names, vec!["Box1", "Box2", "Box3", "Box4", "Box5"]);
        assert_eq!(registry.counter(), 5);
    }

    #[test]
    fn test_label_prefix() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.add(a_label(), None), "Label1");
    }

    #[test]
    fn test_explicit_numbered_name_advances_counter() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), None);
        registry.add(a_box(), None);
        assert_eq!(registry.counter(), 2);

        assert_eq!(registry.add(a_box(), Some("Box5")), "Box5");
        assert_eq!(registry.counter(), 5);
        assert_eq!(registry.add(a_box(), None), "Box6");
    }

    #[test]
    fn test_explicit_name_never_lowers_counter() {
        let mut registry = NameRegistry::new();
        for _ in 0..4 {
            registry.add(a_box(), None);
        }
        registry.add(a_box(), Some("Box2_x"));
        registry.add(a_box(), Some("Box0"));
        assert_eq!(registry.counter(), 4);
    }

    #[test]
    fn test_collision_appends_suffix() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.add(a_box(), Some("Title")), "Title");
        assert_eq!(registry.add(a_box(), Some("Title")), "Title_1");
        assert_eq!(registry.add(a_box(), Some("Title")), "Title_2");
        assert_eq!(registry.get("Title_1").map(|b| b.name()), Some("Title_1"));
    }

    #[test]
    fn test_auto_name_skips_renamed_entries() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), Some("Custom"));
        assert!(registry.rename("Custom", "Box1"));
        assert_eq!(registry.add(a_box(), None), "Box2");
    }

    #[test]
    fn test_counter_at_numbering_limit_does_not_overflow() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.add(a_box(), Some("Box4294967295")), "Box4294967295");
        assert_eq!(registry.counter(), 0);
        assert_eq!(registry.add(a_box(), None), "Box1");

        registry.add(a_box(), Some("Box4294967294"));
        assert_eq!(registry.counter(), u32::MAX - 1);
        assert_eq!(registry.add(a_box(), None), "Box4294967295_1");
        assert_eq!(registry.counter(), u32::MAX);
        assert_eq!(registry.add(a_box(), None), "Box4294967295_2");
        assert_eq!(registry.counter(), u32::MAX);
    }

    #[test]
    fn test_rename_trims_and_rejects_blank_names() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), None);
        registry.add(a_box(), None);

        assert!(registry.rename("Box1", " Title "));
        assert_eq!(registry.get("Title").map(|b| b.name()), Some("Title"));
        assert!(!registry.rename("Box2", ""));
        assert!(!registry.rename("Box2", "   "));
        assert!(!registry.rename("Box2", " Title"));
        assert_eq!(registry.names(), vec!["Title", "Box2"]);
    }

    #[test]
    fn test_blank_requested_name_is_auto() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.add(a_box(), Some("  ")), "Box1");
    }

    #[test]
    fn test_rename_round_trip_restores_mapping() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), None);
        registry.add(a_box(), None);
        registry.add(a_box(), None);
        let before = registry.names();
        let counter = registry.counter();

        assert!(registry.rename("Box2", "Header"));
        assert_eq!(registry.names(), vec!["Box1", "Header", "Box3"]);
        assert_eq!(registry.get("Header").map(|b| b.name()), Some("Header"));

        assert!(registry.rename("Header", "Box2"));
        assert_eq!(registry.names(), before);
        assert_eq!(registry.counter(), counter);
    }

    #[test]
    fn test_rename_conflicts_do_not_mutate() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), None);
        registry.add(a_box(), None);
        let before = registry.names();

        assert!(!registry.rename("Box1", "Box2"));
        assert!(!registry.rename("Box1", "Box1"));
        assert!(!registry.rename("Missing", "Other"));
        assert_eq!(registry.names(), before);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = NameRegistry::new();
        let name = registry.add(a_box(), None);
        registry.add(a_box(), None);

        assert!(registry.remove(&name).is_some());
        assert!(registry.remove(&name).is_none());
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.counter(), 0);
        assert_eq!(registry.add(a_box(), None), "Box1");
    }

    #[test]
    fn test_find_by_id_survives_rename() {
        let mut registry = NameRegistry::new();
        let shape = a_box();
        let id = shape.id();
        registry.add(shape, None);
        registry.rename("Box1", "Footer");
        assert_eq!(registry.find_by_id(id).map(|b| b.name()), Some("Footer"));
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let mut registry = NameRegistry::new();
        registry.add(a_box(), Some("Zeta"));
        registry.add(a_box(), Some("Alpha"));
        let snapshot = registry.snapshot();
        let keys: Vec<&String> = snapshot.keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }
}
