//! Progression view envelopes

use gamesales_engine::RankedEntry;
use serde::{Deserialize, Serialize};

/// Rankings page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsResponse {
    /// Top entries, rank 1 first
    pub entries: Vec<RankedEntry>,
    /// Approved users ranked, including those beyond the shown entries
    pub total_ranked: usize,
    /// The caller's 1-based position
    pub my_position: Option<usize>,
}
