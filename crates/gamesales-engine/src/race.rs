//! # Race Position Mapper
//!
//! Places each seller on the monthly race track. Revenue is normalised
//! against the month's leader and mapped linearly into the `[10, 80]` band
//! of the track, leaving margins at both ends. Markers that would land too
//! close to one already placed are pushed into the next lane.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use gamesales_types::{date_window, Profile, Sale, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// Track geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Position of a seller with no revenue (percent of track)
    pub track_start: Decimal,
    /// Distance from start to the leader's position
    pub track_span: Decimal,
    /// Markers closer than this (percentage points) share a spot
    pub proximity_threshold: Decimal,
    /// Vertical offset per lane, in pixels
    pub lane_offset: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track_start: dec!(10),
            track_span: dec!(70),
            proximity_threshold: dec!(8),
            lane_offset: 48,
        }
    }
}

impl RaceConfig {
    /// Position along the track for `revenue` given the cohort maximum
    pub fn position(&self, revenue: Decimal, max_revenue: Decimal) -> Decimal {
        let ratio = if max_revenue > Decimal::ZERO {
            (revenue / max_revenue).clamp(Decimal::ZERO, Decimal::ONE)
        } else {
            Decimal::ZERO
        };
        self.track_start + ratio * self.track_span
    }

    /// Right edge of the band
    pub fn track_end(&self) -> Decimal {
        self.track_start + self.track_span
    }
}

/// Position along the default track: 10 for no revenue, 80 for the leader
pub fn race_position(revenue: Decimal, max_revenue: Decimal) -> Decimal {
    RaceConfig::default().position(revenue, max_revenue)
}

// ============================================================================
// Participants
// ============================================================================

/// A seller in this month's race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceParticipant {
    pub user_id: UserId,
    pub display_name: String,
    pub monthly_revenue: Decimal,
    pub avatar_ref: Option<String>,
}

/// Half-open UTC window covering the calendar month of `now`
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    date_window(first, last)
}

/// First day of the month of `now`
pub fn month_start(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today.with_day(1).unwrap_or(today)
}

/// Sum approved sales per seller, highest revenue first.
///
/// Sales from sellers missing in `profiles` are skipped. Sellers with equal
/// revenue keep the order in which their first sale appears.
pub fn aggregate_participants(
    sales: &[Sale],
    profiles: &HashMap<UserId, Profile>,
) -> Vec<RaceParticipant> {
    let mut order: Vec<UserId> = Vec::new();
    let mut totals: HashMap<UserId, Decimal> = HashMap::new();

    for sale in sales.iter().filter(|s| s.status.is_approved()) {
        if !profiles.contains_key(&sale.seller_id) {
            continue;
        }
        let total = totals.entry(sale.seller_id).or_insert_with(|| {
            order.push(sale.seller_id);
            Decimal::ZERO
        });
        *total = total.saturating_add(sale.amount);
    }

    let mut participants: Vec<RaceParticipant> = order
        .into_iter()
        .filter_map(|user_id| {
            let profile = profiles.get(&user_id)?;
            Some(RaceParticipant {
                user_id,
                display_name: profile.display_name.clone(),
                monthly_revenue: totals.get(&user_id).copied().unwrap_or_default(),
                avatar_ref: profile.avatar_url.clone(),
            })
        })
        .collect();

    participants.sort_by(|a, b| b.monthly_revenue.cmp(&a.monthly_revenue));
    participants
}

// ============================================================================
// Track Layout
// ============================================================================

/// A placed marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceMarker {
    pub participant: RaceParticipant,
    /// 1-based place by revenue
    pub place: usize,
    /// Percent along the track
    pub position: Decimal,
    /// Collision lane (0 = on the track line)
    pub lane: u32,
    /// `lane * lane_offset`
    pub vertical_offset: u32,
    /// First place
    pub leader: bool,
}

/// The race as rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RaceView {
    /// Nobody has an approved sale this month
    Empty,
    /// Markers in place order
    Track {
        max_revenue: Decimal,
        markers: Vec<RaceMarker>,
    },
}

impl RaceView {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn markers(&self) -> &[RaceMarker] {
        match self {
            Self::Empty => &[],
            Self::Track { markers, .. } => markers,
        }
    }
}

/// Lay out participants already sorted by revenue descending
pub fn build_race(participants: Vec<RaceParticipant>, config: &RaceConfig) -> RaceView {
    let Some(first) = participants.first() else {
        return RaceView::Empty;
    };
    let max_revenue = first.monthly_revenue;
    if max_revenue <= Decimal::ZERO {
        debug!(participants = participants.len(), "All race participants at zero revenue");
    }

    let mut placed: Vec<Decimal> = Vec::with_capacity(participants.len());
    let markers = participants
        .into_iter()
        .enumerate()
        .map(|(i, participant)| {
            let position = config.position(participant.monthly_revenue, max_revenue);
            let lane = placed
                .iter()
                .filter(|&&p| (p - position).abs() < config.proximity_threshold)
                .count() as u32;
            placed.push(position);

            RaceMarker {
                participant,
                place: i + 1,
                position,
                lane,
                vertical_offset: lane * config.lane_offset,
                leader: i == 0,
            }
        })
        .collect();

    RaceView::Track {
        max_revenue,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gamesales_types::{SaleId, SaleKind, SaleStatus};

    fn participant(name: &str, revenue: Decimal) -> RaceParticipant {
        RaceParticipant {
            user_id: UserId::new(),
            display_name: name.to_string(),
            monthly_revenue: revenue,
            avatar_ref: None,
        }
    }

    fn sale(seller: UserId, amount: Decimal, status: SaleStatus) -> Sale {
        Sale {
            id: SaleId::new(),
            seller_id: seller,
            amount,
            customer: "Cliente".to_string(),
            kind: SaleKind::New,
            status,
            sold_at: Utc::now(),
            notes: None,
            base_points: 0,
            bonus_points: 0,
            total_points: 0,
        }
    }

    #[test]
    fn test_position_band_edges() {
        assert_eq!(race_position(dec!(0), dec!(0)), dec!(10));
        assert_eq!(race_position(dec!(5000), dec!(5000)), dec!(80));
        assert_eq!(race_position(dec!(2500), dec!(5000)), dec!(45));
    }

    #[test]
    fn test_position_clamped_to_band() {
        assert_eq!(race_position(dec!(-10), dec!(100)), dec!(10));
        assert_eq!(race_position(dec!(150), dec!(100)), dec!(80));
    }

    #[test]
    fn test_empty_race() {
        let view = build_race(Vec::new(), &RaceConfig::default());
        assert!(view.is_empty());
        assert!(view.markers().is_empty());
    }

    #[test]
    fn test_all_zero_revenue_stacks_at_start() {
        let view = build_race(
            vec![participant("a", dec!(0)), participant("b", dec!(0)), participant("c", dec!(0))],
            &RaceConfig::default(),
        );
        let markers = view.markers();
        assert!(markers.iter().all(|m| m.position == dec!(10)));
        let lanes: Vec<u32> = markers.iter().map(|m| m.lane).collect();
        assert_eq!(lanes, vec![0, 1, 2]);
        assert_eq!(markers[2].vertical_offset, 96);
    }

    #[test]
    fn test_lanes_only_for_close_markers() {
        let view = build_race(
            vec![
                participant("leader", dec!(1000)),
                participant("close", dec!(950)),
                participant("far", dec!(500)),
            ],
            &RaceConfig::default(),
        );
        let markers = view.markers();
        assert!(markers[0].leader);
        assert_eq!(markers[0].position, dec!(80));
        assert_eq!(markers[1].position, dec!(76.5));
        assert_eq!(markers[1].lane, 1);
        assert_eq!(markers[2].position, dec!(45));
        assert_eq!(markers[2].lane, 0);
        assert_eq!(markers[2].place, 3);
    }

    #[test]
    fn test_aggregate_participants() {
        let ana = Profile::new(UserId::new(), "Ana").approved();
        let bruno = Profile::new(UserId::new(), "Bruno").approved();
        let profiles: HashMap<UserId, Profile> =
            [(ana.id, ana.clone()), (bruno.id, bruno.clone())].into_iter().collect();

        let sales = vec![
            sale(ana.id, dec!(300), SaleStatus::Approved),
            sale(bruno.id, dec!(500), SaleStatus::Approved),
            sale(ana.id, dec!(400), SaleStatus::Approved),
            sale(bruno.id, dec!(900), SaleStatus::Rejected),
            sale(UserId::new(), dec!(10000), SaleStatus::Approved),
        ];

        let participants = aggregate_participants(&sales, &profiles);
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].display_name, "Ana");
        assert_eq!(participants[0].monthly_revenue, dec!(700));
        assert_eq!(participants[1].monthly_revenue, dec!(500));
    }

    #[test]
    fn test_month_window() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 15, 30, 0).unwrap();
        let (start, end) = month_window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(month_start(now), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }
}
