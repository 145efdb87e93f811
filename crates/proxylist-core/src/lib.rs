//! Core systems for proxylist.
//!
//! This crate provides the building blocks the list crate is made of:
//!
//! - **Signal/Slot System**: Synchronous, reentrant observer registration
//! - **Property System**: Interior-mutable cells with change detection
//! - **Errors**: The [`ListError`] taxonomy and [`Result`] alias
//! - **Logging**: `tracing` targets, span names and helper macros
//!
//! # Signal/Slot Example
//!
//! ```
//! use proxylist_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::{ListError, Result};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
