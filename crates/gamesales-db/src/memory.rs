//! In-process store
//!
//! Mirrors the Postgres store's behaviour over `parking_lot` locked vectors.
//! Used by the API tests and by the server's `--in-memory` demo mode.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use parking_lot::RwLock;
use rust_decimal_macros::dec;

use gamesales_types::{
    date_window, Achievement, AchievementId, AchievementUnlock, ChangeKind, GoalDefinition,
    Mission, MissionCriterion, MissionId, MissionKind, NewBonusTier, NewGoal, NewSale, PeriodKind,
    Profile, Rarity, Role, Sale, SaleId, SaleStatus, SaleUpdate, SignupRequest, SignupRequestId,
    SignupStatus, TeamId, UserId,
};

use crate::feed::ChangeFeed;
use crate::store::{HealthStatus, SalesStore};
use crate::{DbError, DbResult};

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion order stands in for query order on ties
    profiles: Vec<Profile>,
    teams_requiring_approval: HashSet<TeamId>,
    sales: Vec<Sale>,
    goals: Vec<GoalDefinition>,
    achievements: Vec<Achievement>,
    unlocks: Vec<AchievementUnlock>,
    missions: Vec<Mission>,
    signups: Vec<SignupRequest>,
}

/// In-memory [`SalesStore`]
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    feed: ChangeFeed,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            feed: ChangeFeed::default(),
        }
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    pub fn insert_profile(&self, profile: Profile) {
        self.state.write().profiles.push(profile);
        self.feed.publish(ChangeKind::Profiles);
    }

    /// Sales of this team's members start PENDING
    pub fn require_approval_for(&self, team_id: TeamId) {
        self.state.write().teams_requiring_approval.insert(team_id);
    }

    /// Insert a sale as-is, without crediting points
    pub fn insert_sale(&self, sale: Sale) {
        self.state.write().sales.push(sale);
        self.feed.publish(ChangeKind::Sales);
    }

    pub fn insert_achievement(&self, achievement: Achievement) {
        self.state.write().achievements.push(achievement);
        self.feed.publish(ChangeKind::Achievements);
    }

    pub fn insert_unlock(&self, unlock: AchievementUnlock) {
        self.state.write().unlocks.push(unlock);
        self.feed.publish(ChangeKind::Achievements);
    }

    pub fn insert_mission(&self, mission: Mission) {
        self.state.write().missions.push(mission);
        self.feed.publish(ChangeKind::Missions);
    }

    /// Open a pending signup request for an existing profile
    pub fn open_signup(&self, user_id: UserId) -> DbResult<SignupRequest> {
        let mut state = self.state.write();
        let display_name = state
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .map(|p| p.display_name.clone())
            .ok_or_else(|| DbError::not_found("Profile", user_id))?;

        let request = SignupRequest {
            id: SignupRequestId::new(),
            user_id,
            display_name,
            status: SignupStatus::Pending,
            reviewed_by: None,
            rejection_reason: None,
            created_at: Utc::now(),
        };
        state.signups.push(request.clone());
        drop(state);

        self.feed.publish(ChangeKind::Signups);
        Ok(request)
    }

    /// A small team with a goal, achievements and some sales this month
    pub fn demo() -> Self {
        let store = Self::new();
        let now = Utc::now();

        let master = Profile::new(UserId::new(), "Marina Master")
            .with_role(Role::Master)
            .approved();
        let manager = Profile::new(UserId::new(), "Gustavo Gestor")
            .with_role(Role::Manager)
            .approved();
        store.insert_profile(master);
        store.insert_profile(manager);

        let sellers = [
            ("Ana Souza", 1450, 1450, 6),
            ("Bruno Lima", 820, 820, 4),
            ("Carla Dias", 820, 820, 4),
            ("Diego Alves", 90, 90, 1),
        ];
        let mut seller_ids = Vec::new();
        for (name, points, xp, level) in sellers {
            let profile = Profile::new(UserId::new(), name)
                .approved()
                .with_progress(points, xp, level);
            seller_ids.push(profile.id);
            store.insert_profile(profile);
        }

        let newcomer = Profile::new(UserId::new(), "Eva Nova");
        store.insert_profile(newcomer.clone());
        let _ = store.open_signup(newcomer.id);

        let amounts = [dec!(4200), dec!(2600), dec!(2450), dec!(0)];
        for (seller, amount) in seller_ids.iter().zip(amounts) {
            if amount.is_zero() {
                continue;
            }
            store.insert_sale(Sale {
                id: SaleId::new(),
                seller_id: *seller,
                amount,
                customer: "Cliente".to_string(),
                kind: Default::default(),
                status: SaleStatus::Approved,
                sold_at: now,
                notes: None,
                base_points: gamesales_types::points_for_amount(amount),
                bonus_points: 0,
                total_points: gamesales_types::points_for_amount(amount),
            });
        }

        let today = now.date_naive();
        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = month_start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(month_start);
        let _ = store.create_goal_sync(NewGoal {
            period_kind: PeriodKind::Monthly,
            target_amount: dec!(30000),
            period_start: month_start,
            period_end: month_end,
            tiers: vec![
                NewBonusTier {
                    unlock_percent: 33,
                    title: "Team breakfast".to_string(),
                    description: None,
                },
                NewBonusTier {
                    unlock_percent: 66,
                    title: "Friday off".to_string(),
                    description: None,
                },
                NewBonusTier {
                    unlock_percent: 100,
                    title: "Team trip".to_string(),
                    description: Some("Weekend trip for the whole team".to_string()),
                },
            ],
        });

        let first_sale = Achievement {
            id: AchievementId::new(),
            code: "PRIMEIRA_VENDA".to_string(),
            name: "First Sale".to_string(),
            description: "Record your first sale".to_string(),
            icon: "trophy".to_string(),
            rarity: Rarity::Common,
        };
        store.insert_achievement(first_sale.clone());
        store.insert_achievement(Achievement {
            id: AchievementId::new(),
            code: "VENDEDOR_LENDARIO".to_string(),
            name: "Legend".to_string(),
            description: "Reach level 10".to_string(),
            icon: "crown".to_string(),
            rarity: Rarity::Legendary,
        });
        for seller in seller_ids.iter().take(3) {
            store.insert_unlock(AchievementUnlock {
                achievement_id: first_sale.id,
                user_id: *seller,
                unlocked_at: now,
            });
        }

        let (week_start, week_end) = date_window(now.date_naive(), now.date_naive() + Duration::days(6));
        store.insert_mission(Mission {
            id: MissionId::new(),
            name: "Three deals this week".to_string(),
            description: None,
            kind: MissionKind::Weekly,
            criterion: MissionCriterion::SaleCount,
            target_value: dec!(3),
            reward_points: 50,
            starts_at: week_start,
            ends_at: week_end,
            active: true,
            team_id: None,
            user_id: None,
        });

        store
    }

    fn create_goal_sync(&self, goal: NewGoal) -> DbResult<GoalDefinition> {
        goal.validate()?;
        let mut state = self.state.write();
        for existing in state
            .goals
            .iter_mut()
            .filter(|g| g.active && g.period_kind == goal.period_kind)
        {
            existing.active = false;
        }
        let created = goal.into_definition(Utc::now());
        state.goals.push(created.clone());
        drop(state);

        self.feed.publish(ChangeKind::Goals);
        Ok(created)
    }

    fn find_sale_mut<'a>(state: &'a mut MemoryState, id: SaleId) -> DbResult<&'a mut Sale> {
        state
            .sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    fn pending_signup_mut<'a>(state: &'a mut MemoryState, id: SignupRequestId) -> DbResult<&'a mut SignupRequest> {
        state
            .signups
            .iter_mut()
            .find(|s| s.id == id && s.is_pending())
            .ok_or_else(|| DbError::not_found("Pending signup", id))
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn approved_profiles(&self) -> DbResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .state
            .read()
            .profiles
            .iter()
            .filter(|p| p.approved)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        Ok(profiles)
    }

    async fn profile(&self, user_id: UserId) -> DbResult<Option<Profile>> {
        Ok(self.state.read().profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn approved_seller_count(&self) -> DbResult<u64> {
        Ok(self
            .state
            .read()
            .profiles
            .iter()
            .filter(|p| p.approved && p.role == Role::Seller)
            .count() as u64)
    }

    async fn approved_sales_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .state
            .read()
            .sales
            .iter()
            .filter(|s| s.counts_between(start, end))
            .cloned()
            .collect();
        sales.sort_by_key(|s| s.sold_at);
        Ok(sales)
    }

    async fn seller_sales_between(
        &self,
        seller_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let mut sales = self.approved_sales_between(start, end).await?;
        sales.retain(|s| s.seller_id == seller_id);
        Ok(sales)
    }

    async fn active_goals(&self) -> DbResult<Vec<GoalDefinition>> {
        Ok(self
            .state
            .read()
            .goals
            .iter()
            .rev()
            .filter(|g| g.active)
            .cloned()
            .collect())
    }

    async fn achievements(&self) -> DbResult<Vec<Achievement>> {
        Ok(self.state.read().achievements.clone())
    }

    async fn unlocks_for(&self, user_id: UserId) -> DbResult<Vec<AchievementUnlock>> {
        Ok(self
            .state
            .read()
            .unlocks
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn active_missions_for(&self, user_id: UserId, team_id: Option<TeamId>) -> DbResult<Vec<Mission>> {
        let mut missions: Vec<Mission> = self
            .state
            .read()
            .missions
            .iter()
            .filter(|m| m.applies_to(user_id, team_id))
            .cloned()
            .collect();
        missions.sort_by_key(|m| m.ends_at);
        Ok(missions)
    }

    async fn pending_signups(&self) -> DbResult<Vec<SignupRequest>> {
        Ok(self
            .state
            .read()
            .signups
            .iter()
            .filter(|s| s.is_pending())
            .cloned()
            .collect())
    }

    async fn sales(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let mut sales = self.state.read().sales.clone();
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        sales.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(sales)
    }

    async fn record_sale(&self, sale: NewSale) -> DbResult<Sale> {
        sale.validate()?;
        let mut state = self.state.write();

        let team_id = state
            .profiles
            .iter()
            .find(|p| p.id == sale.seller_id)
            .map(|p| p.team_id)
            .ok_or_else(|| DbError::not_found("Seller", sale.seller_id))?;
        let requires_approval = team_id.map_or(false, |t| state.teams_requiring_approval.contains(&t));

        let points = sale.points();
        let recorded = Sale {
            id: SaleId::new(),
            seller_id: sale.seller_id,
            amount: sale.total(),
            customer: sale.customer_or_default(),
            kind: sale.kind,
            status: if requires_approval {
                SaleStatus::Pending
            } else {
                SaleStatus::Approved
            },
            sold_at: sale.sold_at.unwrap_or_else(Utc::now),
            notes: sale.notes.clone(),
            base_points: points,
            bonus_points: 0,
            total_points: points,
        };
        state.sales.push(recorded.clone());

        if recorded.status.is_approved() {
            if let Some(profile) = state.profiles.iter_mut().find(|p| p.id == sale.seller_id) {
                profile.total_points = profile.total_points.saturating_add(points);
                profile.total_experience = profile.total_experience.saturating_add(points);
            }
        }
        drop(state);

        self.feed.publish(ChangeKind::Sales);
        if recorded.status.is_approved() {
            self.feed.publish(ChangeKind::Profiles);
        }
        Ok(recorded)
    }

    async fn update_sale(&self, id: SaleId, update: SaleUpdate) -> DbResult<Sale> {
        update.validate()?;
        let updated = {
            let mut state = self.state.write();
            let sale = Self::find_sale_mut(&mut state, id)?;
            update.apply_to(sale);
            sale.clone()
        };

        self.feed.publish(ChangeKind::Sales);
        Ok(updated)
    }

    async fn cancel_sale(&self, id: SaleId) -> DbResult<Sale> {
        let cancelled = {
            let mut state = self.state.write();
            let sale = Self::find_sale_mut(&mut state, id)?;
            sale.status = SaleStatus::Rejected;
            sale.clone()
        };

        self.feed.publish(ChangeKind::Sales);
        Ok(cancelled)
    }

    async fn set_level(&self, user_id: UserId, level: i32) -> DbResult<()> {
        {
            let mut state = self.state.write();
            let profile = state
                .profiles
                .iter_mut()
                .find(|p| p.id == user_id)
                .ok_or_else(|| DbError::not_found("Profile", user_id))?;
            profile.current_level = level;
        }

        self.feed.publish(ChangeKind::Profiles);
        Ok(())
    }

    async fn create_goal(&self, goal: NewGoal) -> DbResult<GoalDefinition> {
        self.create_goal_sync(goal)
    }

    async fn approve_signup(&self, id: SignupRequestId, reviewer: UserId) -> DbResult<SignupRequest> {
        let approved = {
            let mut state = self.state.write();
            let request = Self::pending_signup_mut(&mut state, id)?;
            request.status = SignupStatus::Approved;
            request.reviewed_by = Some(reviewer);
            let request = request.clone();

            if let Some(profile) = state.profiles.iter_mut().find(|p| p.id == request.user_id) {
                profile.approved = true;
            }
            request
        };

        self.feed.publish(ChangeKind::Signups);
        self.feed.publish(ChangeKind::Profiles);
        Ok(approved)
    }

    async fn reject_signup(
        &self,
        id: SignupRequestId,
        reviewer: UserId,
        reason: Option<String>,
    ) -> DbResult<SignupRequest> {
        let rejected = {
            let mut state = self.state.write();
            let request = Self::pending_signup_mut(&mut state, id)?;
            request.status = SignupStatus::Rejected;
            request.reviewed_by = Some(reviewer);
            request.rejection_reason = reason;
            request.clone()
        };

        self.feed.publish(ChangeKind::Signups);
        Ok(rejected)
    }

    async fn health_check(&self) -> DbResult<HealthStatus> {
        Ok(HealthStatus {
            backend: "memory".to_string(),
            healthy: true,
        })
    }

    fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn seller(store: &MemoryStore, name: &str) -> Profile {
        let profile = Profile::new(UserId::new(), name).approved();
        store.insert_profile(profile.clone());
        profile
    }

    #[tokio::test]
    async fn test_record_sale_credits_points() {
        let store = MemoryStore::new();
        let ana = seller(&store, "Ana");

        let sale = store
            .record_sale(NewSale::new(ana.id, dec!(1200), dec!(300)))
            .await
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Approved);
        assert_eq!(sale.amount, dec!(1500));
        assert_eq!(sale.total_points, 150);
        assert_eq!(sale.customer, "Cliente");

        let profile = store.profile(ana.id).await.unwrap().unwrap();
        assert_eq!(profile.total_points, 150);
        assert_eq!(profile.total_experience, 150);
    }

    #[tokio::test]
    async fn test_record_sale_rejects_oversized_amounts() {
        let store = MemoryStore::new();
        let ana = seller(&store, "Ana");

        for (production, setup) in [(Decimal::MAX, dec!(0)), (Decimal::MAX, dec!(1))] {
            let err = store
                .record_sale(NewSale::new(ana.id, production, setup))
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::InvalidInput(_)));
        }

        let profile = store.profile(ana.id).await.unwrap().unwrap();
        assert_eq!(profile.total_points, 0);
        assert!(store.sales(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_team_approval_leaves_sale_pending() {
        let store = MemoryStore::new();
        let team = TeamId::new();
        let mut profile = Profile::new(UserId::new(), "Bia").approved();
        profile.team_id = Some(team);
        store.insert_profile(profile.clone());
        store.require_approval_for(team);

        let sale = store
            .record_sale(NewSale::new(profile.id, dec!(100), dec!(0)))
            .await
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
        assert_eq!(store.profile(profile.id).await.unwrap().unwrap().total_points, 0);
    }

    #[tokio::test]
    async fn test_record_sale_unknown_seller() {
        let store = MemoryStore::new();
        let err = store
            .record_sale(NewSale::new(UserId::new(), dec!(100), dec!(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_removes_sale_from_totals() {
        let store = MemoryStore::new();
        let ana = seller(&store, "Ana");
        let sale = store
            .record_sale(NewSale::new(ana.id, dec!(500), dec!(0)))
            .await
            .unwrap();

        let start = Utc::now() - Duration::days(1);
        let end = Utc::now() + Duration::days(1);
        assert_eq!(store.approved_sales_between(start, end).await.unwrap().len(), 1);

        let cancelled = store.cancel_sale(sale.id).await.unwrap();
        assert_eq!(cancelled.status, SaleStatus::Rejected);
        assert!(store.approved_sales_between(start, end).await.unwrap().is_empty());
        assert_eq!(store.sales(50).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_goal_supersedes_same_kind() {
        let store = MemoryStore::new();
        let goal = |target| NewGoal {
            period_kind: PeriodKind::Monthly,
            target_amount: target,
            period_start: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
            tiers: Vec::new(),
        };
        let weekly = NewGoal {
            period_kind: PeriodKind::Weekly,
            ..goal(dec!(5000))
        };

        store.create_goal(goal(dec!(10000))).await.unwrap();
        store.create_goal(weekly).await.unwrap();
        let latest = store.create_goal(goal(dec!(20000))).await.unwrap();

        let active = store.active_goals().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, latest.id);
        assert_eq!(active[1].period_kind, PeriodKind::Weekly);
    }

    #[tokio::test]
    async fn test_signup_review() {
        let store = MemoryStore::new();
        let master = seller(&store, "Marina");
        let pending = Profile::new(UserId::new(), "Eva");
        store.insert_profile(pending.clone());
        let request = store.open_signup(pending.id).unwrap();

        assert_eq!(store.pending_signups().await.unwrap().len(), 1);
        let approved = store.approve_signup(request.id, master.id).await.unwrap();
        assert_eq!(approved.status, SignupStatus::Approved);
        assert_eq!(approved.reviewed_by, Some(master.id));
        assert!(store.profile(pending.id).await.unwrap().unwrap().approved);
        assert!(store.pending_signups().await.unwrap().is_empty());

        let again = store.reject_signup(request.id, master.id, None).await;
        assert!(matches!(again, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_commands_publish_changes() {
        let store = MemoryStore::new();
        let ana = seller(&store, "Ana");
        let mut sub = store.feed().subscribe();

        store
            .record_sale(NewSale::new(ana.id, dec!(100), dec!(0)))
            .await
            .unwrap();

        let first = sub.next().await.unwrap();
        assert!(first.touches(ChangeKind::Sales));
        let second = sub.next().await.unwrap();
        assert!(second.touches(ChangeKind::Profiles));
    }

    #[tokio::test]
    async fn test_demo_data_is_consistent() {
        let store = MemoryStore::demo();
        let profiles = store.approved_profiles().await.unwrap();
        assert_eq!(profiles.len(), 6);
        assert_eq!(store.approved_seller_count().await.unwrap(), 4);
        assert_eq!(store.active_goals().await.unwrap()[0].tiers.len(), 3);
        assert_eq!(store.pending_signups().await.unwrap().len(), 1);
    }
}
