//! The store abstraction consumed by the API
//!
//! [`SalesStore`] covers the queries the derived views need and the write
//! paths managers use. [`PgStore`] talks to the backend's Postgres schema;
//! [`crate::MemoryStore`] keeps everything in process.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use gamesales_types::{
    Achievement, AchievementUnlock, BonusTier, ChangeKind, GoalDefinition, Mission, NewGoal,
    NewSale, Profile, Sale, SaleId, SaleStatus, SaleUpdate, SignupRequest, SignupRequestId,
    TeamId, UserId,
};

use crate::feed::{spawn_pg_listener, ChangeFeed};
use crate::models::convert_all;
use crate::{
    AchievementRepo, DatabaseConfig, DbError, DbResult, GoalRepo, MissionRepo, ProfileRepo,
    SaleRepo, SignupRepo,
};

/// Store health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "postgres" or "memory"
    pub backend: String,
    pub healthy: bool,
}

/// Queries and commands over the sales backend
#[async_trait]
pub trait SalesStore: Send + Sync {
    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Approved profiles, highest points first
    async fn approved_profiles(&self) -> DbResult<Vec<Profile>>;

    async fn profile(&self, user_id: UserId) -> DbResult<Option<Profile>>;

    /// Approved users with the seller role
    async fn approved_seller_count(&self) -> DbResult<u64>;

    /// Approved sales in `[start, end)`
    async fn approved_sales_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>>;

    /// Approved sales of one seller in `[start, end)`
    async fn seller_sales_between(
        &self,
        seller_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>>;

    /// Active goals with their tiers, newest first
    async fn active_goals(&self) -> DbResult<Vec<GoalDefinition>>;

    async fn achievements(&self) -> DbResult<Vec<Achievement>>;

    async fn unlocks_for(&self, user_id: UserId) -> DbResult<Vec<AchievementUnlock>>;

    async fn active_missions_for(&self, user_id: UserId, team_id: Option<TeamId>) -> DbResult<Vec<Mission>>;

    async fn pending_signups(&self) -> DbResult<Vec<SignupRequest>>;

    /// All sales, newest first
    async fn sales(&self, limit: i64) -> DbResult<Vec<Sale>>;

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Record a sale, crediting points and experience when approved
    async fn record_sale(&self, sale: NewSale) -> DbResult<Sale>;

    async fn update_sale(&self, id: SaleId, update: SaleUpdate) -> DbResult<Sale>;

    /// Mark a sale rejected; sales are never deleted
    async fn cancel_sale(&self, id: SaleId) -> DbResult<Sale>;

    /// Write a recomputed level to the profile
    async fn set_level(&self, user_id: UserId, level: i32) -> DbResult<()>;

    /// Create a goal, deactivating the active goal of the same period kind
    async fn create_goal(&self, goal: NewGoal) -> DbResult<GoalDefinition>;

    async fn approve_signup(&self, id: SignupRequestId, reviewer: UserId) -> DbResult<SignupRequest>;

    async fn reject_signup(
        &self,
        id: SignupRequestId,
        reviewer: UserId,
        reason: Option<String>,
    ) -> DbResult<SignupRequest>;

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn health_check(&self) -> DbResult<HealthStatus>;

    /// Change notifications for this store
    fn feed(&self) -> &ChangeFeed;
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// Postgres-backed store
pub struct PgStore {
    /// PostgreSQL connection pool
    pub pg: PgPool,
    feed: ChangeFeed,
}

impl PgStore {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self::from_pool(pg, ChangeFeed::new(config.feed_capacity)))
    }

    pub fn from_pool(pg: PgPool, feed: ChangeFeed) -> Self {
        Self { pg, feed }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Start forwarding backend notifications into the feed
    pub fn start_listener(&self) -> JoinHandle<()> {
        spawn_pg_listener(self.pg.clone(), self.feed.clone())
    }

    /// Create repository instances
    pub fn profile_repo(&self) -> ProfileRepo {
        ProfileRepo::new(self.pg.clone())
    }

    pub fn sale_repo(&self) -> SaleRepo {
        SaleRepo::new(self.pg.clone())
    }

    pub fn goal_repo(&self) -> GoalRepo {
        GoalRepo::new(self.pg.clone())
    }

    pub fn achievement_repo(&self) -> AchievementRepo {
        AchievementRepo::new(self.pg.clone())
    }

    pub fn mission_repo(&self) -> MissionRepo {
        MissionRepo::new(self.pg.clone())
    }

    pub fn signup_repo(&self) -> SignupRepo {
        SignupRepo::new(self.pg.clone())
    }
}

#[async_trait]
impl SalesStore for PgStore {
    async fn approved_profiles(&self) -> DbResult<Vec<Profile>> {
        convert_all(self.profile_repo().approved_by_points().await?)
    }

    async fn profile(&self, user_id: UserId) -> DbResult<Option<Profile>> {
        self.profile_repo()
            .find_by_id(user_id.0)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    async fn approved_seller_count(&self) -> DbResult<u64> {
        self.profile_repo().approved_seller_count().await
    }

    async fn approved_sales_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        convert_all(self.sale_repo().approved_between(start, end).await?)
    }

    async fn seller_sales_between(
        &self,
        seller_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        convert_all(self.sale_repo().approved_for_seller(seller_id.0, start, end).await?)
    }

    async fn active_goals(&self) -> DbResult<Vec<GoalDefinition>> {
        let repo = self.goal_repo();
        let goals = repo.active().await?;
        if goals.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = goals.iter().map(|g| g.id).collect();
        let mut tiers_by_goal: HashMap<Uuid, Vec<BonusTier>> = HashMap::new();
        for tier in repo.tiers_for(&ids).await? {
            tiers_by_goal.entry(tier.meta_id).or_default().push(tier.into());
        }

        goals
            .into_iter()
            .map(|goal| {
                let tiers = tiers_by_goal.remove(&goal.id).unwrap_or_default();
                goal.into_definition(tiers)
            })
            .collect()
    }

    async fn achievements(&self) -> DbResult<Vec<Achievement>> {
        convert_all(self.achievement_repo().catalog().await?)
    }

    async fn unlocks_for(&self, user_id: UserId) -> DbResult<Vec<AchievementUnlock>> {
        Ok(self
            .achievement_repo()
            .unlocks_for(user_id.0)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn active_missions_for(&self, user_id: UserId, team_id: Option<TeamId>) -> DbResult<Vec<Mission>> {
        convert_all(self.mission_repo().active_for(user_id.0, team_id.map(|t| t.0)).await?)
    }

    async fn pending_signups(&self) -> DbResult<Vec<SignupRequest>> {
        convert_all(self.signup_repo().pending().await?)
    }

    async fn sales(&self, limit: i64) -> DbResult<Vec<Sale>> {
        convert_all(self.sale_repo().recent(limit).await?)
    }

    async fn record_sale(&self, sale: NewSale) -> DbResult<Sale> {
        sale.validate()?;
        let recorded = Sale::try_from(self.sale_repo().record(&sale).await?)?;
        info!(sale_id = %recorded.id, seller = %recorded.seller_id, status = ?recorded.status, "Sale recorded");

        self.feed.publish(ChangeKind::Sales);
        if recorded.status.is_approved() {
            self.feed.publish(ChangeKind::Profiles);
        }
        Ok(recorded)
    }

    async fn update_sale(&self, id: SaleId, update: SaleUpdate) -> DbResult<Sale> {
        update.validate()?;
        let row = self
            .sale_repo()
            .update(id.0, &update)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        self.feed.publish(ChangeKind::Sales);
        Sale::try_from(row)
    }

    async fn cancel_sale(&self, id: SaleId) -> DbResult<Sale> {
        let row = self
            .sale_repo()
            .set_status(id.0, SaleStatus::Rejected)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        info!(sale_id = %id, "Sale cancelled");
        self.feed.publish(ChangeKind::Sales);
        Sale::try_from(row)
    }

    async fn set_level(&self, user_id: UserId, level: i32) -> DbResult<()> {
        if !self.profile_repo().set_level(user_id.0, level).await? {
            return Err(DbError::not_found("Profile", user_id));
        }
        self.feed.publish(ChangeKind::Profiles);
        Ok(())
    }

    async fn create_goal(&self, goal: NewGoal) -> DbResult<GoalDefinition> {
        goal.validate()?;
        let (row, tiers) = self.goal_repo().create(&goal).await?;
        let created = row.into_definition(tiers.into_iter().map(Into::into).collect())?;

        info!(goal_id = %created.id, period = created.period_kind.as_db_str(), "Goal created");
        self.feed.publish(ChangeKind::Goals);
        Ok(created)
    }

    async fn approve_signup(&self, id: SignupRequestId, reviewer: UserId) -> DbResult<SignupRequest> {
        let request = SignupRequest::try_from(self.signup_repo().approve(id.0, reviewer.0).await?)?;

        info!(request_id = %id, user = %request.user_id, "Signup approved");
        self.feed.publish(ChangeKind::Signups);
        self.feed.publish(ChangeKind::Profiles);
        Ok(request)
    }

    async fn reject_signup(
        &self,
        id: SignupRequestId,
        reviewer: UserId,
        reason: Option<String>,
    ) -> DbResult<SignupRequest> {
        let row = self.signup_repo().reject(id.0, reviewer.0, reason.as_deref()).await?;

        info!(request_id = %id, "Signup rejected");
        self.feed.publish(ChangeKind::Signups);
        SignupRequest::try_from(row)
    }

    async fn health_check(&self) -> DbResult<HealthStatus> {
        let healthy = sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok();

        Ok(HealthStatus {
            backend: "postgres".to_string(),
            healthy,
        })
    }

    fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}
