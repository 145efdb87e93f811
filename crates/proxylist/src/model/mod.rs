//! Observable source lists and the filtered, sorted views built on them.
//!
//! # Core Types
//!
//! - `Entity`: The contract every list item implements
//! - `PropertyMap`: Name-to-accessor lookup, built once per entity type
//! - `Value`: Type-erased property value used for sorting and lookups
//! - `ListChange`: Change notification emitted by every list
//! - `ObservableList`: The read surface shared by source lists and views
//!
//! # List Implementations
//!
//! - `SourceList`: Owns its entities and keeps their indices dense
//! - `ProxyList`: Read-only view that filters and sorts a `SourceList`
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  list_changed   ┌─────────────┐  list_changed   ┌─────────────┐
//! │ SourceList  │───────────────>│  ProxyList  │───────────────>│  Consumer   │
//! │  (entities) │  entity_deleted │  (buffer)   │                 │             │
//! └─────────────┘───────────────>└─────────────┘                 └─────────────┘
//!       ^
//!       │ property_changed
//! ┌─────────────┐
//! │   Entity    │
//! └─────────────┘
//! ```
//!
//! The source holds only opaque slots; a view owns the connections it made
//! and releases them when dropped or desynchronized.

mod entity;
mod proxy_list;
mod source_list;
mod traits;
mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use entity::{Entity, EntityBase, PropertyAccessor, PropertyMap, INDEX_PROPERTY};
pub use proxy_list::{FilterFn, ListCapabilities, ProxyList, ProxyListBuilder, SortDirection};
pub use source_list::SourceList;
pub use traits::{ListChange, ListSignals, ObservableList};
pub use value::Value;
