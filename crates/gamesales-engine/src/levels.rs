//! # Level Table & XP Progress
//!
//! A fixed lookup from level to the cumulative experience required, plus the
//! progress calculator shared by every surface that shows a level bar.
//!
//! Index `n` of the table stores the experience needed to *reach* level
//! `n + 1`, so a user at level `L` sits between `threshold_for(L - 1)` and
//! `threshold_for(L)`. Indices past the table continue from a fixed ceiling
//! in equal steps, which keeps every level's span positive.
//!
//! ## Example
//!
//! ```
//! use gamesales_engine::levels::LevelTable;
//!
//! let table = LevelTable::default();
//! let progress = table.xp_progress(180, 2);
//! assert_eq!(progress.current_xp, 80);
//! assert_eq!(progress.xp_needed_for_next_level, 150);
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Cumulative experience stored at each index of the default table
pub const DEFAULT_THRESHOLDS: &[i64] = &[0, 100, 250, 500, 900, 1400, 2000, 2800, 3700, 4800];

/// Threshold used for the first index past the default table
pub const DEFAULT_CEILING: i64 = 5000;

/// Experience added per level once past the ceiling
pub const DEFAULT_CEILING_STEP: i64 = 1000;

// ============================================================================
// Level Table
// ============================================================================

/// Serializable level table settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    /// Strictly increasing cumulative thresholds, starting at 0
    pub thresholds: Vec<i64>,
    /// Threshold of the first index past `thresholds`
    pub ceiling: i64,
    /// Increment for each further index
    pub ceiling_step: i64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            ceiling: DEFAULT_CEILING,
            ceiling_step: DEFAULT_CEILING_STEP,
        }
    }
}

/// Immutable level lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    thresholds: Vec<i64>,
    ceiling: i64,
    ceiling_step: i64,
}

impl LevelTable {
    /// Build a table, rejecting thresholds that would make a level span zero
    pub fn new(thresholds: Vec<i64>, ceiling: i64, ceiling_step: i64) -> Result<Self, EngineError> {
        if thresholds.first() != Some(&0) {
            return Err(EngineError::InvalidLevelTable(
                "first threshold must be 0".to_string(),
            ));
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[1] <= w[0]) {
            return Err(EngineError::InvalidLevelTable(format!(
                "thresholds must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }
        let last = *thresholds.last().unwrap_or(&0);
        if ceiling <= last {
            return Err(EngineError::InvalidLevelTable(format!(
                "ceiling {} must exceed the last threshold {}",
                ceiling, last
            )));
        }
        if ceiling_step <= 0 {
            return Err(EngineError::InvalidLevelTable(
                "ceiling step must be positive".to_string(),
            ));
        }

        Ok(Self {
            thresholds,
            ceiling,
            ceiling_step,
        })
    }

    /// Build from settings
    pub fn from_settings(settings: &LevelSettings) -> Result<Self, EngineError> {
        Self::new(
            settings.thresholds.clone(),
            settings.ceiling,
            settings.ceiling_step,
        )
    }

    /// Cumulative experience stored at `index`; negative indices map to the floor
    pub fn threshold_for(&self, index: i64) -> i64 {
        if index < 0 {
            return self.thresholds[0];
        }
        let len = self.thresholds.len() as i64;
        if index < len {
            self.thresholds[index as usize]
        } else {
            self.ceiling.saturating_add((index - len).saturating_mul(self.ceiling_step))
        }
    }

    /// Level implied by a total experience value (always >= 1)
    pub fn level_for(&self, total_experience: i64) -> i32 {
        let xp = total_experience.max(0);
        if xp >= self.ceiling {
            let len = self.thresholds.len() as i64;
            let beyond = (xp - self.ceiling) / self.ceiling_step;
            return i32::try_from(len + 1 + beyond).unwrap_or(i32::MAX);
        }
        self.thresholds.iter().take_while(|&&t| t <= xp).count() as i32
    }

    /// Progress within `level` for `total_experience`.
    ///
    /// The level is taken as given: a stale level is not corrected, so
    /// `current_xp` may be negative or exceed the span. Levels below 1 are
    /// treated as level 1.
    pub fn xp_progress(&self, total_experience: i64, level: i32) -> XpProgress {
        let level = level.max(1);
        let floor = self.threshold_for(level as i64 - 1);
        let next = self.threshold_for(level as i64);
        let span = next - floor;
        let current_xp = total_experience - floor;

        XpProgress {
            level,
            current_xp,
            xp_needed_for_next_level: span,
            level_floor_xp: floor,
            next_level_xp: next,
        }
    }

    /// Number of explicitly defined thresholds
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            ceiling: DEFAULT_CEILING,
            ceiling_step: DEFAULT_CEILING_STEP,
        }
    }
}

// ============================================================================
// XP Progress
// ============================================================================

/// Progress inside one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpProgress {
    /// Level the progress was computed for
    pub level: i32,
    /// Experience earned since the level floor (signed)
    pub current_xp: i64,
    /// Span of the level; always > 0
    pub xp_needed_for_next_level: i64,
    /// Cumulative experience at the level floor
    pub level_floor_xp: i64,
    /// Cumulative experience at which the next level starts
    pub next_level_xp: i64,
}

impl XpProgress {
    /// Progress percentage, unclamped, rounded to two places
    pub fn percent(&self) -> Decimal {
        if self.xp_needed_for_next_level <= 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.current_xp) * dec!(100) / Decimal::from(self.xp_needed_for_next_level))
            .round_dp(2)
    }

    /// Whether `current_xp` falls outside `[0, max]`, i.e. the level is stale
    pub fn is_out_of_range(&self) -> bool {
        self.current_xp < 0 || self.current_xp > self.xp_needed_for_next_level
    }
}
