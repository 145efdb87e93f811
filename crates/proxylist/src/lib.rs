//! proxylist - Filtered and sorted views over observable lists.
//!
//! This is the umbrella crate: it re-exports the core building blocks from
//! `proxylist-core` and provides the list types in [`model`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use proxylist::prelude::*;
//!
//! let source = Arc::new(SourceList::with_items(words));
//! let view = ProxyListBuilder::new(source.clone())
//!     .filter(|word: &Word| word.text().contains('e'))
//!     .sort_by("Text", SortDirection::Descending)
//!     .build();
//!
//! view.signals().list_changed.connect(|change| println!("{change:?}"));
//! source.add(Arc::new(Word::new("seven")));
//! ```

pub use proxylist_core::*;

pub mod model;
pub mod prelude;
