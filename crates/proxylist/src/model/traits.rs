//! Core traits and notifications shared by source and proxy lists.

use std::sync::Arc;

use proxylist_core::Signal;

/// A change notification emitted by an observable list.
///
/// Positions are those of the emitting list: a source list reports source
/// positions, a proxy list reports positions within its sorted buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// An item was inserted at `index`.
    ItemAdded {
        /// Position of the new item.
        index: usize,
    },
    /// The named property of the item at `index` changed.
    ItemChanged {
        /// Current position of the changed item.
        index: usize,
        /// Name of the changed property.
        property: String,
    },
    /// The item formerly at `index` was removed.
    ItemRemoved {
        /// Position the item occupied before removal.
        index: usize,
    },
    /// The list changed wholesale; consumers should resynchronize.
    Reset,
}

impl ListChange {
    /// The affected position, if the change concerns a single item.
    pub fn index(&self) -> Option<usize> {
        match self {
            ListChange::ItemAdded { index }
            | ListChange::ItemChanged { index, .. }
            | ListChange::ItemRemoved { index } => Some(*index),
            ListChange::Reset => None,
        }
    }
}

/// Signals emitted by observable lists.
///
/// Consumers connect to `list_changed` to stay synchronized with the list.
pub struct ListSignals {
    /// Emitted after every structural or item-level change.
    pub list_changed: Signal<ListChange>,
}

impl Default for ListSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ListSignals {
    /// Creates a new set of list signals.
    pub fn new() -> Self {
        Self {
            list_changed: Signal::new(),
        }
    }

    /// Emits an item-added notification.
    pub fn emit_item_added(&self, index: usize) {
        self.list_changed.emit(ListChange::ItemAdded { index });
    }

    /// Emits an item-changed notification.
    pub fn emit_item_changed(&self, index: usize, property: impl Into<String>) {
        self.list_changed.emit(ListChange::ItemChanged {
            index,
            property: property.into(),
        });
    }

    /// Emits an item-removed notification.
    pub fn emit_item_removed(&self, index: usize) {
        self.list_changed.emit(ListChange::ItemRemoved { index });
    }

    /// Emits a reset notification.
    pub fn emit_reset(&self) {
        self.list_changed.emit(ListChange::Reset);
    }
}

/// An ordered, indexable, change-notifying sequence of shared entities.
///
/// This is the surface a display layer consumes. Both
/// [`SourceList`](super::SourceList) and [`ProxyList`](super::ProxyList)
/// implement it.
pub trait ObservableList<T>: Send + Sync {
    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Returns the item at `index`.
    fn get(&self, index: usize) -> Option<Arc<T>>;

    /// Returns the position of `entity` (by identity).
    fn index_of(&self, entity: &Arc<T>) -> Option<usize>;

    /// Returns the change signals of this list.
    fn signals(&self) -> &ListSignals;

    /// Returns a snapshot of the items in list order.
    fn to_vec(&self) -> Vec<Arc<T>>;

    /// Returns `true` if the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `entity` is in the list.
    fn contains(&self, entity: &Arc<T>) -> bool {
        self.index_of(entity).is_some()
    }
}
