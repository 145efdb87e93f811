//! Filtered and sorted proxy view over a source list.
//!
//! A [`ProxyList`] keeps its own buffer of the source's entities that pass a
//! filter predicate, ordered by one named property. The buffer is built once
//! and then maintained incrementally from the source's notifications:
//!
//! - an added entity is binary-inserted if it passes the filter;
//! - a changed entity is removed, reinserted, or left in place depending on
//!   the changed property and the filter;
//! - a deleted entity is dropped from the buffer;
//! - a source reset rebuilds the buffer from scratch.
//!
//! The view is read-only from the outside. Consumers observe it through
//! [`ListSignals`], with positions relative to the sorted buffer.
//!
//! # Example
//!
//! ```ignore
//! use proxylist::model::{ProxyListBuilder, SortDirection};
//!
//! let view = ProxyListBuilder::new(source.clone())
//!     .filter(|word: &Word| word.text().contains('e'))
//!     .sort_by("Text", SortDirection::Descending)
//!     .build();
//!
//! for word in view.iter() {
//!     println!("{}", word.text());
//! }
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use proxylist_core::logging::{span_names, targets};
use proxylist_core::{list_debug, list_warn, ConnectionId, ListError, PerfSpan, Result};

use super::entity::{Entity, PropertyAccessor, INDEX_PROPERTY};
use super::source_list::SourceList;
use super::traits::{ListChange, ListSignals, ObservableList};
use super::value::Value;

/// Filter predicate deciding which entities are visible in a view.
pub type FilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest key first.
    #[default]
    Ascending,
    /// Largest key first.
    Descending,
}

impl SortDirection {
    /// Orients an ascending comparison result for this direction.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// What a consumer may do with a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCapabilities {
    /// New items may be created through the list.
    pub allow_new: bool,
    /// Items may be edited through the list.
    pub allow_edit: bool,
    /// Items may be removed through the list.
    pub allow_remove: bool,
    /// The list can be sorted.
    pub supports_sorting: bool,
    /// The list can be searched by property value.
    pub supports_searching: bool,
    /// The list raises change notifications.
    pub supports_change_notification: bool,
    /// The list is currently sorted.
    pub is_sorted: bool,
}

impl ListCapabilities {
    /// Capabilities of a proxy view.
    pub const READ_ONLY_SORTED: Self = Self {
        allow_new: false,
        allow_edit: false,
        allow_remove: false,
        supports_sorting: true,
        supports_searching: true,
        supports_change_notification: true,
        is_sorted: true,
    };
}

struct SortConfig<T> {
    key: String,
    accessor: PropertyAccessor<T>,
    direction: SortDirection,
    filter: FilterFn<T>,
}

impl<T> Clone for SortConfig<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            accessor: Arc::clone(&self.accessor),
            direction: self.direction,
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<T> SortConfig<T> {
    /// Position in `buffer` at which `entity` keeps the buffer sorted.
    ///
    /// Stops at the first probe that compares equal, so entities with equal
    /// keys end up adjacent in no particular order.
    fn insertion_point(&self, buffer: &[Arc<T>], entity: &T) -> usize {
        let key = (self.accessor)(entity);
        let mut low = 0;
        let mut high = buffer.len();
        while low < high {
            let middle = low + (high - low) / 2;
            let probe = (self.accessor)(buffer[middle].as_ref());
            match self.direction.apply(key.compare(&probe)) {
                Ordering::Less => high = middle,
                Ordering::Greater => low = middle + 1,
                Ordering::Equal => return middle,
            }
        }
        low
    }
}

/// State shared between a view and the slots it registers on its source.
struct ProxyState<T: Entity> {
    source: Arc<SourceList<T>>,
    buffer: RwLock<Vec<Arc<T>>>,
    config: RwLock<SortConfig<T>>,
    signals: ListSignals,
}

impl<T: Entity> ProxyState<T> {
    fn config(&self) -> SortConfig<T> {
        self.config.read().clone()
    }

    fn position_of(&self, entity: &Arc<T>) -> Option<usize> {
        self.buffer
            .read()
            .iter()
            .position(|item| Arc::ptr_eq(item, entity))
    }

    fn binary_insert(&self, entity: Arc<T>, config: &SortConfig<T>) -> usize {
        let mut buffer = self.buffer.write();
        let position = config.insertion_point(&buffer, &entity);
        buffer.insert(position, entity);
        position
    }

    fn remove_entity(&self, entity: &Arc<T>) -> Option<usize> {
        let mut buffer = self.buffer.write();
        let position = buffer.iter().position(|item| Arc::ptr_eq(item, entity))?;
        buffer.remove(position);
        Some(position)
    }

    /// Rebuilds the buffer from the source and emits a single `Reset`.
    fn rebuild(&self) {
        let _perf = PerfSpan::new(span_names::REBUILD);
        let config = self.config();

        let mut fresh: Vec<Arc<T>> = Vec::new();
        for entity in self.source.iter() {
            if (config.filter)(entity.as_ref()) {
                let position = config.insertion_point(&fresh, &entity);
                fresh.insert(position, entity);
            }
        }

        let len = fresh.len();
        *self.buffer.write() = fresh;
        list_debug!(target: targets::PROXY, len, key = %config.key, "proxy rebuilt");
        self.signals.emit_reset();
    }

    fn on_source_changed(&self, change: &ListChange) {
        let _span = tracing::trace_span!(
            target: targets::PROXY,
            "react",
            operation = span_names::REACT,
            change = ?change
        )
        .entered();

        match change {
            ListChange::ItemAdded { index } => {
                if let Some(entity) = self.source.get(*index) {
                    self.on_item_added(entity);
                }
            }
            ListChange::ItemChanged { index, property } => {
                if let Some(entity) = self.source.get(*index) {
                    self.on_item_changed(entity, property);
                }
            }
            // Deletions arrive through the source's deletion event.
            ListChange::ItemRemoved { .. } => {}
            ListChange::Reset => self.rebuild(),
        }
    }

    fn on_item_added(&self, entity: Arc<T>) {
        let config = self.config();
        if !(config.filter)(entity.as_ref()) || self.position_of(&entity).is_some() {
            return;
        }
        let position = self.binary_insert(entity, &config);
        self.signals.emit_item_added(position);
    }

    fn on_item_changed(&self, entity: Arc<T>, property: &str) {
        let config = self.config();
        let current = self.position_of(&entity);
        let passes = (config.filter)(entity.as_ref());

        if property == config.key {
            let removed = current.and_then(|_| self.remove_entity(&entity));
            match (removed, passes) {
                (Some(old), true) => {
                    let new = self.binary_insert(entity, &config);
                    if old == new {
                        self.signals.emit_item_changed(new, property);
                    } else {
                        self.signals.emit_item_removed(old);
                        self.signals.emit_item_added(new);
                    }
                }
                (None, true) => {
                    let new = self.binary_insert(entity, &config);
                    self.signals.emit_item_added(new);
                }
                (Some(old), false) => self.signals.emit_item_removed(old),
                (None, false) => {}
            }
            return;
        }

        match (current, passes) {
            (Some(_), false) => {
                if let Some(old) = self.remove_entity(&entity) {
                    self.signals.emit_item_removed(old);
                }
            }
            (None, true) => {
                let new = self.binary_insert(entity, &config);
                self.signals.emit_item_added(new);
            }
            (Some(position), true) => self.signals.emit_item_changed(position, property),
            (None, false) => {}
        }
    }

    fn on_entity_deleted(&self, entity: &Arc<T>) {
        if let Some(position) = self.remove_entity(entity) {
            self.signals.emit_item_removed(position);
        }
    }
}

struct Subscription {
    list_changed: ConnectionId,
    entity_deleted: ConnectionId,
}

/// A read-only, filtered and sorted view of a [`SourceList`].
///
/// Dropping the view disconnects it from the source.
pub struct ProxyList<T: Entity> {
    state: Arc<ProxyState<T>>,
    subscription: Mutex<Option<Subscription>>,
    sort_key_substituted: bool,
}

impl<T: Entity> ProxyList<T> {
    /// Creates a synchronized view showing every entity in source order.
    pub fn new(source: Arc<SourceList<T>>) -> Self {
        ProxyListBuilder::new(source).build()
    }

    /// Connects to or disconnects from the source.
    ///
    /// While disconnected the buffer is frozen. Reconnecting always rebuilds
    /// the buffer from the current source contents. Setting the current
    /// state again does nothing.
    pub fn set_synchronized(&self, synchronized: bool) {
        let mut subscription = self.subscription.lock();
        match (synchronized, subscription.take()) {
            (true, None) => {
                *subscription = Some(self.subscribe());
                drop(subscription);
                tracing::debug!(target: targets::PROXY, "proxy synchronized");
                self.state.rebuild();
            }
            (false, Some(active)) => {
                self.unsubscribe(active);
                tracing::debug!(target: targets::PROXY, "proxy desynchronized");
            }
            (_, current) => *subscription = current,
        }
    }

    /// Returns `true` while the view follows its source.
    pub fn is_synchronized(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Sorts the view by `key` in `direction`.
    ///
    /// Returns `false` and keeps the current sort if `key` does not name a
    /// property of `T`. Otherwise the buffer is rebuilt.
    pub fn change_sort(&self, key: &str, direction: SortDirection) -> bool {
        let Some(accessor) = T::property_map().get(key) else {
            tracing::debug!(target: targets::PROXY, key, "unknown sort key, keeping current sort");
            return false;
        };
        {
            let mut config = self.state.config.write();
            config.key = key.to_string();
            config.accessor = accessor;
            config.direction = direction;
        }
        tracing::debug!(target: targets::PROXY, key, ?direction, "sort changed");
        self.state.rebuild();
        true
    }

    /// The active sort key.
    pub fn sort_key(&self) -> String {
        self.state.config.read().key.clone()
    }

    /// The active sort direction.
    pub fn sort_direction(&self) -> SortDirection {
        self.state.config.read().direction
    }

    /// Returns `true` if the key requested at construction did not resolve
    /// and [`INDEX_PROPERTY`] was used instead.
    pub fn sort_key_substituted(&self) -> bool {
        self.sort_key_substituted
    }

    /// Returns the number of visible entities.
    pub fn len(&self) -> usize {
        self.state.buffer.read().len()
    }

    /// Returns `true` if no entity is visible.
    pub fn is_empty(&self) -> bool {
        self.state.buffer.read().is_empty()
    }

    /// Returns the entity at sorted position `index`.
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        self.state.buffer.read().get(index).cloned()
    }

    /// Returns the sorted position of `entity`.
    pub fn index_of(&self, entity: &Arc<T>) -> Option<usize> {
        self.state.position_of(entity)
    }

    /// Returns `true` if `entity` is visible.
    pub fn contains(&self, entity: &Arc<T>) -> bool {
        self.index_of(entity).is_some()
    }

    /// Returns the visible entities in sorted order.
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.state.buffer.read().clone()
    }

    /// Iterates over a snapshot of the visible entities in sorted order.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<T>> {
        self.to_vec().into_iter()
    }

    /// Returns the sorted position of the first visible entity whose named
    /// property equals `value`.
    pub fn find(&self, name: &str, value: impl Into<Value>) -> Result<Option<usize>> {
        let accessor = T::property_map()
            .get(name)
            .ok_or_else(|| ListError::unknown_property(name))?;
        let value = value.into();
        Ok(self
            .state
            .buffer
            .read()
            .iter()
            .position(|entity| accessor(entity.as_ref()) == value))
    }

    /// What consumers may do with this view.
    pub fn capabilities(&self) -> ListCapabilities {
        ListCapabilities::READ_ONLY_SORTED
    }

    /// The source this view projects.
    pub fn source(&self) -> &Arc<SourceList<T>> {
        &self.state.source
    }

    /// Returns the change signals of this view.
    pub fn signals(&self) -> &ListSignals {
        &self.state.signals
    }

    /// Always fails: the view cannot be mutated directly.
    pub fn add(&self, _entity: Arc<T>) -> Result<()> {
        Err(Self::reject("add"))
    }

    /// Always fails: the view cannot be mutated directly.
    pub fn insert(&self, _position: usize, _entity: Arc<T>) -> Result<()> {
        Err(Self::reject("insert"))
    }

    /// Always fails: the view cannot be mutated directly.
    pub fn remove_at(&self, _index: usize) -> Result<Arc<T>> {
        Err(Self::reject("remove_at"))
    }

    /// Always fails: the view cannot be mutated directly.
    pub fn clear(&self) -> Result<()> {
        Err(Self::reject("clear"))
    }

    fn reject(operation: &'static str) -> ListError {
        list_warn!(
            target: targets::PROXY,
            operation,
            "structural mutation of a proxy list rejected"
        );
        ListError::not_supported(operation)
    }

    fn subscribe(&self) -> Subscription {
        let source = &self.state.source;

        let state = Arc::downgrade(&self.state);
        let list_changed = source.signals().list_changed.connect(move |change| {
            if let Some(state) = state.upgrade() {
                state.on_source_changed(change);
            }
        });

        let state = Arc::downgrade(&self.state);
        let entity_deleted = source.entity_deleted().connect(move |entity| {
            if let Some(state) = state.upgrade() {
                state.on_entity_deleted(entity);
            }
        });

        Subscription {
            list_changed,
            entity_deleted,
        }
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let source = &self.state.source;
        source.signals().list_changed.disconnect(subscription.list_changed);
        source.entity_deleted().disconnect(subscription.entity_deleted);
    }
}

impl<T: Entity> Drop for ProxyList<T> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            self.unsubscribe(subscription);
        }
    }
}

impl<T: Entity> fmt::Debug for ProxyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.state.config.read();
        f.debug_struct("ProxyList")
            .field("sort_key", &config.key)
            .field("direction", &config.direction)
            .field("len", &self.state.buffer.read().len())
            .field("synchronized", &self.subscription.lock().is_some())
            .finish()
    }
}

impl<T: Entity> ObservableList<T> for ProxyList<T> {
    fn len(&self) -> usize {
        ProxyList::len(self)
    }

    fn get(&self, index: usize) -> Option<Arc<T>> {
        ProxyList::get(self, index)
    }

    fn index_of(&self, entity: &Arc<T>) -> Option<usize> {
        ProxyList::index_of(self, entity)
    }

    fn signals(&self) -> &ListSignals {
        &self.state.signals
    }

    fn to_vec(&self) -> Vec<Arc<T>> {
        ProxyList::to_vec(self)
    }
}

fn accept_all<T: Entity>() -> FilterFn<T> {
    Arc::new(|_: &T| true)
}

/// Builder for [`ProxyList`].
///
/// Defaults: accept every entity, sort ascending by [`INDEX_PROPERTY`],
/// synchronized with the source.
pub struct ProxyListBuilder<T: Entity> {
    source: Arc<SourceList<T>>,
    filter: Option<FilterFn<T>>,
    sort_key: String,
    direction: SortDirection,
    synchronized: bool,
}

impl<T: Entity> ProxyListBuilder<T> {
    /// Creates a builder over the given source.
    pub fn new(source: Arc<SourceList<T>>) -> Self {
        Self {
            source,
            filter: None,
            sort_key: INDEX_PROPERTY.to_string(),
            direction: SortDirection::Ascending,
            synchronized: true,
        }
    }

    /// Sets the filter predicate.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    /// Sets the sort key and direction.
    ///
    /// A key that does not name a property of `T` is replaced by
    /// [`INDEX_PROPERTY`] when the view is built.
    pub fn sort_by(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_key = key.into();
        self.direction = direction;
        self
    }

    /// Sets whether the view starts connected to the source.
    pub fn synchronized(mut self, synchronized: bool) -> Self {
        self.synchronized = synchronized;
        self
    }

    /// Builds the view and populates its buffer.
    pub fn build(self) -> ProxyList<T> {
        let map = T::property_map();
        let (key, accessor, substituted) = match map.get(&self.sort_key) {
            Some(accessor) => (self.sort_key, accessor, false),
            None => {
                tracing::debug!(
                    target: targets::PROXY,
                    requested = %self.sort_key,
                    fallback = INDEX_PROPERTY,
                    "unknown sort key, falling back to natural index"
                );
                (INDEX_PROPERTY.to_string(), map.index_accessor(), true)
            }
        };

        let state = Arc::new(ProxyState {
            source: self.source,
            buffer: RwLock::new(Vec::new()),
            config: RwLock::new(SortConfig {
                key,
                accessor,
                direction: self.direction,
                filter: self.filter.unwrap_or_else(accept_all),
            }),
            signals: ListSignals::new(),
        });

        let proxy = ProxyList {
            state,
            subscription: Mutex::new(None),
            sort_key_substituted: substituted,
        };
        if self.synchronized {
            proxy.set_synchronized(true);
        } else {
            proxy.state.rebuild();
        }
        proxy
    }
}
