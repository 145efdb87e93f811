//! The entity contract.
//!
//! Every type stored in a [`SourceList`](super::SourceList) implements
//! [`Entity`]: it embeds an [`EntityBase`] (the list position plus the
//! property-change signal) and publishes a [`PropertyMap`] resolving property
//! names to typed accessors.
//!
//! # Example
//!
//! ```
//! use std::sync::OnceLock;
//! use proxylist::model::{Entity, EntityBase, PropertyMap};
//! use proxylist::Property;
//!
//! struct Task {
//!     base: EntityBase,
//!     title: Property<String>,
//! }
//!
//! impl Task {
//!     fn set_title(&self, title: &str) {
//!         self.base.set_property(&self.title, title.to_string(), "Title");
//!     }
//! }
//!
//! impl Entity for Task {
//!     fn base(&self) -> &EntityBase {
//!         &self.base
//!     }
//!
//!     fn property_map() -> &'static PropertyMap<Self> {
//!         static MAP: OnceLock<PropertyMap<Task>> = OnceLock::new();
//!         MAP.get_or_init(|| PropertyMap::new().with("Title", |t: &Task| t.title.get().into()))
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proxylist_core::{Property, Signal};

use super::value::Value;

/// Name of the natural-index property every entity type exposes.
///
/// This is the default sort key of a proxy list and the fallback used when a
/// requested sort key does not resolve.
pub const INDEX_PROPERTY: &str = "Index";

/// Shared state embedded in every entity.
///
/// The position is written only by the owning source list. The
/// `property_changed` signal carries the name of the property that changed.
pub struct EntityBase {
    index: AtomicUsize,
    property_changed: Signal<String>,
}

impl EntityBase {
    /// Creates a base for an entity not yet placed in any list.
    pub fn new() -> Self {
        Self {
            index: AtomicUsize::new(0),
            property_changed: Signal::new(),
        }
    }

    /// The entity's position in its source list.
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    pub(crate) fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Release);
    }

    /// Signal emitted with the property name whenever a named property changes.
    pub fn property_changed(&self) -> &Signal<String> {
        &self.property_changed
    }

    /// Announce that the named property changed.
    pub fn notify(&self, property: &str) {
        self.property_changed.emit(property.to_string());
    }

    /// Store `value` in `cell` and announce the change under `name`.
    ///
    /// Nothing is emitted when the new value equals the current one. Returns
    /// whether the value changed.
    pub fn set_property<V>(&self, cell: &Property<V>, value: V, name: &str) -> bool
    where
        V: Clone + PartialEq,
    {
        let changed = cell.set(value);
        if changed {
            self.notify(name);
        }
        changed
    }
}

impl Default for EntityBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBase")
            .field("index", &self.index())
            .field("subscribers", &self.property_changed.connection_count())
            .finish()
    }
}

/// Capability set required of items held by source and proxy lists.
///
/// Entities are shared as `Arc<Self>`; two handles denote the same entity
/// exactly when `Arc::ptr_eq` holds.
pub trait Entity: Send + Sync + 'static {
    /// The embedded position and change signal.
    fn base(&self) -> &EntityBase;

    /// The property map for this entity type, built once per type.
    fn property_map() -> &'static PropertyMap<Self>
    where
        Self: Sized;

    /// The entity's position in its source list.
    fn index(&self) -> usize {
        self.base().index()
    }
}

/// Typed accessor reading one named property of an entity.
pub type PropertyAccessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Mapping from property name to accessor for one entity type.
///
/// Every map resolves [`INDEX_PROPERTY`] to the entity's list position.
pub struct PropertyMap<T> {
    accessors: HashMap<&'static str, PropertyAccessor<T>>,
    names: Vec<&'static str>,
}

impl<T: Entity> PropertyMap<T> {
    /// Creates a map containing only the natural-index property.
    pub fn new() -> Self {
        let mut map = Self {
            accessors: HashMap::new(),
            names: Vec::new(),
        };
        map.insert(INDEX_PROPERTY, Arc::new(|entity: &T| Value::from(entity.index())));
        map
    }

    /// Registers a named property accessor.
    ///
    /// Registering a name twice replaces the earlier accessor.
    pub fn with<F>(mut self, name: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(accessor));
        self
    }

    fn insert(&mut self, name: &'static str, accessor: PropertyAccessor<T>) {
        if self.accessors.insert(name, accessor).is_none() {
            self.names.push(name);
        }
    }

    /// Resolves a property name to its accessor.
    pub fn get(&self, name: &str) -> Option<PropertyAccessor<T>> {
        self.accessors.get(name).cloned()
    }

    /// The accessor for [`INDEX_PROPERTY`].
    pub fn index_accessor(&self) -> PropertyAccessor<T> {
        match self.accessors.get(INDEX_PROPERTY) {
            Some(accessor) => accessor.clone(),
            None => Arc::new(|entity: &T| Value::from(entity.index())),
        }
    }

    /// Returns `true` if the name resolves to a property.
    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Property names in registration order, starting with [`INDEX_PROPERTY`].
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    /// Reads a property by name.
    pub fn value_of(&self, entity: &T, name: &str) -> Option<Value> {
        self.accessors.get(name).map(|accessor| accessor(entity))
    }
}

impl<T: Entity> Default for PropertyMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PropertyMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("names", &self.names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::Word;
    use parking_lot::Mutex;

    #[test]
    fn test_property_map_always_has_index() {
        let map = Word::property_map();
        assert!(map.contains(INDEX_PROPERTY));
        assert_eq!(map.names().next(), Some(INDEX_PROPERTY));
        assert!(map.contains("Text"));
        assert!(!map.contains("Colour"));
    }

    #[test]
    fn test_value_of() {
        let word = Word::new("apple", 3);
        let map = Word::property_map();
        assert_eq!(map.value_of(&word, "Text"), Some(Value::from("apple")));
        assert_eq!(map.value_of(&word, "Rank"), Some(Value::from(3i64)));
        assert_eq!(map.value_of(&word, "Index"), Some(Value::from(0usize)));
        assert_eq!(map.value_of(&word, "Colour"), None);
    }

    #[test]
    fn test_set_property_notifies_only_on_change() {
        let word = Word::new("apple", 3);
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        word.base().property_changed().connect(move |name| {
            received_clone.lock().push(name.clone());
        });

        word.set_text("apple");
        word.set_text("pear");
        word.set_rank(9);

        assert_eq!(*received.lock(), vec!["Text".to_string(), "Rank".to_string()]);
    }

    #[test]
    fn test_index_accessor_tracks_base() {
        let word = Word::new("apple", 3);
        word.base().set_index(4);
        let accessor = Word::property_map().index_accessor();
        assert_eq!(accessor(&word), Value::from(4usize));
        assert_eq!(word.index(), 4);
    }
}
