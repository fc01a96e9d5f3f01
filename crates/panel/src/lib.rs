//! # Eventlab Panel Crate
//!
//! This crate owns the indexed daily panel: the read-only table every query
//! in the system runs against. It is the columnar analogue of a repository
//! layer, hiding source formats behind one handle.
//!
//! ## Architectural Principles
//!
//! - **Explicit context:** A `DataContext` is constructed once at startup
//!   (or per session) and passed by reference into every query function.
//!   There is no process-wide shared dataset.
//! - **Read-only after construction:** Loading, normalization, and
//!   trading-day indexing all happen before the handle exists; afterwards
//!   the panel never mutates, so contexts can be shared across requests.
//!
//! ## Public API
//!
//! - `DataContext`: the indexed panel handle plus its choice/bounds helpers.
//! - `index_panel`: the trading-day indexer, exposed for callers that manage
//!   their own frames.
//! - `PanelError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod context;
pub mod error;
pub mod indexer;

// Re-export the key components to create a clean, public-facing API.
pub use context::DataContext;
pub use error::PanelError;
pub use indexer::index_panel;
