//! Prelude module for proxylist.
//!
//! ```ignore
//! use proxylist::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use crate::{ConnectionId, Property, Signal};

// ============================================================================
// Errors
// ============================================================================

pub use crate::{ListError, Result};

// ============================================================================
// Lists
// ============================================================================

pub use crate::model::{
    Entity, EntityBase, ListChange, ListSignals, ObservableList, PropertyMap, ProxyList,
    ProxyListBuilder, SortDirection, SourceList, Value, INDEX_PROPERTY,
};
