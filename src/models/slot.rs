use serde::{Deserialize, Serialize};

/// A bookable half-hour interval on a given date. Ephemeral: regenerated per
/// query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}
