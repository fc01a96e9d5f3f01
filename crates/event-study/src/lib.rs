//! # Eventlab Study Engine
//!
//! This crate aligns event dates to ticker-local trading-day coordinates,
//! expands them into ±k windows, and aggregates the result into per-offset
//! statistics and a cumulative abnormal return series.
//!
//! ## Architectural Principles
//!
//! - **Set-oriented:** window construction is joins and cross products over
//!   whole batches, never per-event loops; event count × (2k+1) rows stay
//!   cheap at panel scale.
//! - **Stateless Calculation:** a run borrows a read-only `DataContext` and
//!   a pre-built catalog, and returns everything it computed. Nothing is
//!   cached between requests.
//! - **Loss made visible:** events dropped at anchor resolution and rows
//!   clipped at data boundaries are reported in the run summary instead of
//!   being silently absorbed.
//!
//! ## Public API
//!
//! - `StudySession` / `StudyEngine`: the entry points for running a study.
//! - `StudyRequest`: catalog predicates plus the window and policy knobs.
//! - `StudyReport`: summary counts, per-offset statistics, CAR series.
//! - `StudyError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod aligner;
pub mod engine;
pub mod error;
pub mod query;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aligner::AlignedWindows;
pub use engine::{StudyEngine, StudyOutput, StudySession};
pub use error::StudyError;
pub use query::StudyRequest;
pub use report::{CarPoint, OffsetStats, StudyReport, StudySummary};
