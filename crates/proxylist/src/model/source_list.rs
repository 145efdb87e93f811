//! The indexed source list.
//!
//! `SourceList<T>` owns an ordered collection of shared entities and keeps
//! every entity's `index` equal to its position. Structural edits and
//! property changes of contained entities are announced through
//! [`ListSignals`]; removals are additionally announced up front through the
//! dedicated [`entity_deleted`](SourceList::entity_deleted) signal.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use proxylist_core::logging::targets;
use proxylist_core::{list_trace, list_warn, ConnectionId, ListError, Result, Signal};

use super::entity::Entity;
use super::traits::{ListSignals, ObservableList};
use super::value::Value;

/// A contained entity together with its property-change subscription.
struct Entry<T> {
    entity: Arc<T>,
    connection: ConnectionId,
}

/// An ordered, mutable, change-notifying collection of entities.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use proxylist::model::{ListChange, SourceList};
///
/// let source = Arc::new(SourceList::new());
/// source.signals().list_changed.connect(|change| println!("{change:?}"));
///
/// source.add(Arc::new(Task::new("write docs")));
/// source.insert(0, Arc::new(Task::new("review")))?;
/// assert_eq!(source.get(1).unwrap().index(), 1);
/// ```
pub struct SourceList<T: Entity> {
    items: Arc<RwLock<Vec<Entry<T>>>>,
    signals: Arc<ListSignals>,
    entity_deleted: Signal<Arc<T>>,
}

impl<T: Entity> SourceList<T> {
    /// Creates an empty source list.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            signals: Arc::new(ListSignals::new()),
            entity_deleted: Signal::new(),
        }
    }

    /// Creates a source list holding `items` in order.
    pub fn with_items(items: impl IntoIterator<Item = Arc<T>>) -> Self {
        let list = Self::new();
        {
            let mut entries = list.items.write();
            for entity in items {
                entity.base().set_index(entries.len());
                let connection = list.watch(&entity);
                entries.push(Entry { entity, connection });
            }
        }
        list
    }

    /// Signal emitted with the entity about to be removed.
    ///
    /// Fires before any renumbering and before the generic
    /// `ItemRemoved` notification, whether or not any view shows the entity.
    pub fn entity_deleted(&self) -> &Signal<Arc<T>> {
        &self.entity_deleted
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the entity at `index`.
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        self.items.read().get(index).map(|entry| Arc::clone(&entry.entity))
    }

    /// Returns the position of `entity`, compared by identity.
    pub fn index_of(&self, entity: &Arc<T>) -> Option<usize> {
        let items = self.items.read();
        Self::locate(&items, entity)
    }

    /// Returns `true` if `entity` is in the list.
    pub fn contains(&self, entity: &Arc<T>) -> bool {
        self.index_of(entity).is_some()
    }

    /// Returns a snapshot of the entities in order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.items
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.entity))
            .collect()
    }

    /// Iterates over a snapshot of the entities in order.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<T>> {
        self.snapshot().into_iter()
    }

    /// Appends an entity, assigning it the next index.
    pub fn add(&self, entity: Arc<T>) {
        let index = {
            let mut items = self.items.write();
            debug_assert!(Self::locate(&items, &entity).is_none(), "entity added twice");
            let index = items.len();
            entity.base().set_index(index);
            let connection = self.watch(&entity);
            items.push(Entry { entity, connection });
            index
        };
        list_trace!(target: targets::SOURCE, index, "source item added");
        self.signals.emit_item_added(index);
    }

    /// Inserts an entity at `position`, shifting later entities up by one.
    ///
    /// Fails with [`ListError::OutOfRange`] if `position > len()`.
    pub fn insert(&self, position: usize, entity: Arc<T>) -> Result<()> {
        {
            let mut items = self.items.write();
            if position > items.len() {
                list_warn!(
                    target: targets::SOURCE,
                    position,
                    len = items.len(),
                    "insert position out of range"
                );
                return Err(ListError::out_of_range(position, items.len()));
            }
            debug_assert!(Self::locate(&items, &entity).is_none(), "entity added twice");
            for (offset, entry) in items[position..].iter().enumerate() {
                entry.entity.base().set_index(position + offset + 1);
            }
            entity.base().set_index(position);
            let connection = self.watch(&entity);
            items.insert(position, Entry { entity, connection });
        }
        list_trace!(target: targets::SOURCE, position, "source item inserted");
        self.signals.emit_item_added(position);
        Ok(())
    }

    /// Removes `entity` from the list.
    ///
    /// Emits the deletion event first, then renumbers the entities after the
    /// removed slot, removes it, and finally emits `ItemRemoved`. Returns
    /// `false` without side effects if the entity is not in the list.
    pub fn remove(&self, entity: &Arc<T>) -> bool {
        if !self.contains(entity) {
            return false;
        }

        self.entity_deleted.emit(Arc::clone(entity));

        let (position, removed) = {
            let mut items = self.items.write();
            let Some(position) = Self::locate(&items, entity) else {
                return false;
            };
            for (offset, entry) in items[position + 1..].iter().enumerate() {
                entry.entity.base().set_index(position + offset);
            }
            (position, items.remove(position))
        };
        removed
            .entity
            .base()
            .property_changed()
            .disconnect(removed.connection);

        list_trace!(target: targets::SOURCE, position, "source item removed");
        self.signals.emit_item_removed(position);
        true
    }

    /// Removes and returns the entity at `index`.
    pub fn remove_at(&self, index: usize) -> Option<Arc<T>> {
        let entity = self.get(index)?;
        self.remove(&entity).then_some(entity)
    }

    /// Removes every entity, emitting a single `Reset`.
    pub fn clear(&self) {
        self.reset(Vec::new());
    }

    /// Replaces the contents with `items`, emitting a single `Reset`.
    pub fn reset(&self, items: Vec<Arc<T>>) {
        let old = {
            let mut entries = self.items.write();
            let old = std::mem::take(&mut *entries);
            for entity in items {
                entity.base().set_index(entries.len());
                let connection = self.watch(&entity);
                entries.push(Entry { entity, connection });
            }
            old
        };
        for entry in old {
            entry.entity.base().property_changed().disconnect(entry.connection);
        }
        list_trace!(target: targets::SOURCE, len = self.len(), "source reset");
        self.signals.emit_reset();
    }

    /// Emits `Reset` without changing the contents.
    ///
    /// Forces every consumer to resynchronize in bulk.
    pub fn reset_bindings(&self) {
        self.signals.emit_reset();
    }

    /// Returns the first entity whose named property equals `value`.
    ///
    /// Fails with [`ListError::UnknownProperty`] if the entity type has no
    /// property called `name`.
    pub fn find_by_property(&self, name: &str, value: impl Into<Value>) -> Result<Option<Arc<T>>> {
        let accessor = T::property_map().get(name).ok_or_else(|| {
            tracing::debug!(target: targets::SOURCE, name, "unknown property in lookup");
            ListError::unknown_property(name)
        })?;
        let value = value.into();
        Ok(self
            .items
            .read()
            .iter()
            .find(|entry| accessor(entry.entity.as_ref()) == value)
            .map(|entry| Arc::clone(&entry.entity)))
    }

    /// Returns the change signals of this list.
    pub fn signals(&self) -> &ListSignals {
        &self.signals
    }

    /// Forwards property changes of `entity` as `ItemChanged` notifications.
    ///
    /// Nothing is forwarded once the entity has left the list, even when an
    /// earlier slot of the same emission removed it.
    fn watch(&self, entity: &Arc<T>) -> ConnectionId {
        let items: Weak<RwLock<Vec<Entry<T>>>> = Arc::downgrade(&self.items);
        let signals: Weak<ListSignals> = Arc::downgrade(&self.signals);
        let weak_entity: Weak<T> = Arc::downgrade(entity);
        entity.base().property_changed().connect(move |property| {
            let (Some(items), Some(signals), Some(entity)) =
                (items.upgrade(), signals.upgrade(), weak_entity.upgrade())
            else {
                return;
            };
            let index = entity.index();
            let held = items
                .read()
                .get(index)
                .is_some_and(|entry| Arc::ptr_eq(&entry.entity, &entity));
            if held {
                signals.emit_item_changed(index, property.as_str());
            }
        })
    }

    fn locate(items: &[Entry<T>], entity: &Arc<T>) -> Option<usize> {
        let hint = entity.index();
        if items
            .get(hint)
            .is_some_and(|entry| Arc::ptr_eq(&entry.entity, entity))
        {
            return Some(hint);
        }
        items.iter().position(|entry| Arc::ptr_eq(&entry.entity, entity))
    }
}

impl<T: Entity> Default for SourceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Drop for SourceList<T> {
    fn drop(&mut self) {
        let entries = std::mem::take(&mut *self.items.write());
        for entry in entries {
            entry.entity.base().property_changed().disconnect(entry.connection);
        }
    }
}

impl<T: Entity> FromIterator<Arc<T>> for SourceList<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self::with_items(iter)
    }
}

impl<T: Entity> ObservableList<T> for SourceList<T> {
    fn len(&self) -> usize {
        SourceList::len(self)
    }

    fn get(&self, index: usize) -> Option<Arc<T>> {
        SourceList::get(self, index)
    }

    fn index_of(&self, entity: &Arc<T>) -> Option<usize> {
        SourceList::index_of(self, entity)
    }

    fn signals(&self) -> &ListSignals {
        &self.signals
    }

    fn to_vec(&self) -> Vec<Arc<T>> {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{texts, Word};
    use crate::model::traits::ListChange;
    use parking_lot::Mutex;

    fn record(source: &SourceList<Word>) -> Arc<Mutex<Vec<ListChange>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        source.signals().list_changed.connect(move |change| {
            events_clone.lock().push(change.clone());
        });
        events
    }

    fn assert_dense(source: &SourceList<Word>) {
        for (position, entity) in source.iter().enumerate() {
            assert_eq!(entity.index(), position);
        }
    }

    #[test]
    fn test_add_assigns_index_and_notifies() {
        let source = SourceList::new();
        let events = record(&source);

        source.add(Word::shared("a", 0));
        source.add(Word::shared("b", 0));

        assert_eq!(source.len(), 2);
        assert_dense(&source);
        assert_eq!(
            *events.lock(),
            vec![ListChange::ItemAdded { index: 0 }, ListChange::ItemAdded { index: 1 }]
        );
    }

    #[test]
    fn test_insert_shifts_later_indices() {
        let source: SourceList<Word> =
            [Word::shared("a", 0), Word::shared("c", 0)].into_iter().collect();
        let events = record(&source);

        source.insert(1, Word::shared("b", 0)).unwrap();
        source.insert(0, Word::shared("z", 0)).unwrap();
        source.insert(4, Word::shared("end", 0)).unwrap();

        assert_eq!(texts(&source.snapshot()), vec!["z", "a", "b", "c", "end"]);
        assert_dense(&source);
        assert_eq!(events.lock()[0], ListChange::ItemAdded { index: 1 });
    }

    #[test]
    fn test_insert_out_of_range() {
        let source = SourceList::new();
        source.add(Word::shared("a", 0));

        let err = source.insert(3, Word::shared("b", 0)).unwrap_err();
        assert_eq!(err, ListError::out_of_range(3, 1));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_remove_order_of_notifications() {
        let b = Word::shared("b", 0);
        let source: SourceList<Word> =
            [Word::shared("a", 0), b.clone(), Word::shared("c", 0)].into_iter().collect();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        source.entity_deleted().connect(move |entity| {
            // Still at its old position when the deletion event fires.
            log_clone.lock().push(format!("deleted {} at {}", entity.text(), entity.index()));
        });
        let log_clone = log.clone();
        source.signals().list_changed.connect(move |change| {
            log_clone.lock().push(format!("{change:?}"));
        });

        assert!(source.remove(&b));
        assert_eq!(
            *log.lock(),
            vec!["deleted b at 1".to_string(), "ItemRemoved { index: 1 }".to_string()]
        );
        assert_eq!(texts(&source.snapshot()), vec!["a", "c"]);
        assert_dense(&source);
    }

    #[test]
    fn test_remove_absent_entity_is_noop() {
        let source: SourceList<Word> = [Word::shared("a", 0)].into_iter().collect();
        let deleted = Arc::new(Mutex::new(0));

        let deleted_clone = deleted.clone();
        source.entity_deleted().connect(move |_| *deleted_clone.lock() += 1);
        let events = record(&source);

        assert!(!source.remove(&Word::shared("stranger", 0)));
        assert_eq!(*deleted.lock(), 0);
        assert!(events.lock().is_empty());
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_remove_at() {
        let source: SourceList<Word> =
            [Word::shared("a", 0), Word::shared("b", 0)].into_iter().collect();
        let removed = source.remove_at(0).unwrap();
        assert_eq!(removed.text(), "a");
        assert!(source.remove_at(5).is_none());
        assert_dense(&source);
    }

    #[test]
    fn test_property_change_forwarded_with_current_index() {
        let b = Word::shared("b", 0);
        let source: SourceList<Word> = [Word::shared("a", 0), b.clone()].into_iter().collect();
        let events = record(&source);

        b.set_rank(5);
        source.insert(0, Word::shared("first", 0)).unwrap();
        b.set_text("bee");

        let events = events.lock();
        assert_eq!(
            events[0],
            ListChange::ItemChanged {
                index: 1,
                property: "Rank".to_string()
            }
        );
        assert_eq!(
            events[2],
            ListChange::ItemChanged {
                index: 2,
                property: "Text".to_string()
            }
        );
    }

    #[test]
    fn test_change_not_forwarded_when_earlier_slot_removes_entity() {
        let source: Arc<SourceList<Word>> = Arc::new(SourceList::new());
        let b = Word::shared("b", 0);

        // Connected before the list watches `b`, so it runs first.
        let weak_source = Arc::downgrade(&source);
        let weak_b = Arc::downgrade(&b);
        b.base().property_changed().connect(move |_| {
            if let (Some(source), Some(b)) = (weak_source.upgrade(), weak_b.upgrade()) {
                source.remove(&b);
            }
        });

        source.add(Word::shared("a", 0));
        source.add(b.clone());
        source.add(Word::shared("c", 0));
        let events = record(&source);

        b.set_text("bee");

        assert_eq!(*events.lock(), vec![ListChange::ItemRemoved { index: 1 }]);
        assert_eq!(texts(&source.snapshot()), vec!["a", "c"]);
        assert_dense(&source);
    }

    #[test]
    fn test_removed_entity_no_longer_forwards_changes() {
        let a = Word::shared("a", 0);
        let source: SourceList<Word> = [a.clone()].into_iter().collect();
        assert_eq!(a.base().property_changed().connection_count(), 1);

        source.remove(&a);
        let events = record(&source);
        a.set_text("changed");

        assert!(events.lock().is_empty());
        assert_eq!(a.base().property_changed().connection_count(), 0);
    }

    #[test]
    fn test_clear_emits_single_reset() {
        let a = Word::shared("a", 0);
        let source: SourceList<Word> = [a.clone(), Word::shared("b", 0)].into_iter().collect();
        let events = record(&source);

        source.clear();

        assert!(source.is_empty());
        assert_eq!(*events.lock(), vec![ListChange::Reset]);
        assert_eq!(a.base().property_changed().connection_count(), 0);
    }

    #[test]
    fn test_reset_replaces_contents() {
        let source: SourceList<Word> = [Word::shared("old", 0)].into_iter().collect();
        let events = record(&source);

        source.reset(vec![Word::shared("x", 0), Word::shared("y", 0)]);

        assert_eq!(texts(&source.snapshot()), vec!["x", "y"]);
        assert_dense(&source);
        assert_eq!(*events.lock(), vec![ListChange::Reset]);
    }

    #[test]
    fn test_find_by_property() {
        let source: SourceList<Word> =
            [Word::shared("a", 1), Word::shared("b", 2), Word::shared("c", 2)]
                .into_iter()
                .collect();

        let found = source.find_by_property("Rank", 2i64).unwrap().unwrap();
        assert_eq!(found.text(), "b");

        assert!(source.find_by_property("Text", "zzz").unwrap().is_none());

        let found = source.find_by_property("Index", 2usize).unwrap().unwrap();
        assert_eq!(found.text(), "c");
    }

    #[test]
    fn test_find_by_unknown_property_fails() {
        let source: SourceList<Word> = [Word::shared("a", 1)].into_iter().collect();
        let err = source.find_by_property("Colour", "red").unwrap_err();
        assert_eq!(err, ListError::unknown_property("Colour"));
    }

    #[test]
    fn test_drop_disconnects_entities() {
        let a = Word::shared("a", 0);
        {
            let _source: SourceList<Word> = [a.clone()].into_iter().collect();
            assert_eq!(a.base().property_changed().connection_count(), 1);
        }
        assert_eq!(a.base().property_changed().connection_count(), 0);
    }
}
