use core_types::{AnchorPolicy, ConfidencePolicy};
use event_catalog::EventFilter;
use serde::{Deserialize, Serialize};

/// One event-study run: catalog predicates plus the window and policy knobs.
///
/// The UI bounds the window radius to 1–20 trading days; the engine accepts
/// any positive value and rejects only zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyRequest {
    pub filter: EventFilter,
    /// Window radius k: the study covers trading-day offsets -k..=+k.
    pub window: u32,
    #[serde(default)]
    pub anchor: AnchorPolicy,
    #[serde(default)]
    pub confidence: ConfidencePolicy,
}

impl StudyRequest {
    pub fn new(filter: EventFilter, window: u32) -> Self {
        Self {
            filter,
            window,
            anchor: AnchorPolicy::default(),
            confidence: ConfidencePolicy::default(),
        }
    }
}
