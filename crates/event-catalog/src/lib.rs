//! # Eventlab Event Catalog
//!
//! Normalizes the panel's heterogeneous event signals (a labeled filing
//! form plus two independent split flags) into one canonical long table,
//! and provides the caller-supplied predicates applied to it before window
//! alignment.

// Declare the modules that make up this crate.
pub mod builder;
pub mod error;
pub mod filter;

// Re-export the core types to provide a clean public API.
pub use builder::{build_event_catalog, catalog_to_records, event_type_choices};
pub use error::CatalogError;
pub use filter::EventFilter;
