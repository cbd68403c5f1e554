//! Profit Allocator
//!
//! Splits the gross profit of a sale by user type. Owners and clients keep
//! everything; team members deduct a percentage into the shared team pool.
//! Each split is checked before it is written, and the split, the pool
//! increment and the contribution row commit together.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{prelude::*, profit_splits, team_pool, team_pool_contributions};
use crate::error::{AutomationError, AutomationResult};
use crate::models::profit::{
    LedgerResponse, PoolContribution, ProfitSplit, ProfitSplitRecord, RecordSaleRequest,
    TeamPoolSummary, UserContext, UserType,
};
use crate::services::price_utils::{percentage_of, round_cents};

/// The team pool is a single row
pub const TEAM_POOL_ID: i32 = 1;

const RECENT_CONTRIBUTIONS: u64 = 20;

/// Where a split came from, carried into the ledger row
#[derive(Debug, Clone, Copy)]
pub struct SaleOrigin<'a> {
    pub product_name: &'a str,
    pub platform: &'a str,
    pub order_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ProfitAllocator {
    default_team_share: Decimal,
}

impl ProfitAllocator {
    pub fn new(default_team_share: Decimal) -> Self {
        Self { default_team_share }
    }

    pub fn default_team_share(&self) -> Decimal {
        self.default_team_share
    }

    /// Compute the split for one sale. Pure; nothing is written.
    ///
    /// Losses are never pooled: a non-positive gross profit gives a zero
    /// team share and the user carries the full amount.
    pub fn allocate(
        &self,
        user: &UserContext,
        sale_price: Decimal,
        cost: Decimal,
    ) -> AutomationResult<ProfitSplit> {
        let percentage = match user {
            UserContext::Owner { .. } | UserContext::Client { .. } => Decimal::ZERO,
            UserContext::Team {
                profit_share_percentage,
                ..
            } => profit_share_percentage.unwrap_or(self.default_team_share),
        };

        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(AutomationError::InvalidInput(format!(
                "profit share percentage must be between 0 and 100, got {}",
                percentage
            )));
        }

        let gross_profit = sale_price - cost;
        let team_share = if gross_profit > Decimal::ZERO {
            round_cents(percentage_of(gross_profit, percentage))
        } else {
            Decimal::ZERO
        };

        Ok(ProfitSplit {
            user_type: user.user_type(),
            user_id: user.user_id().to_string(),
            sale_price,
            cost,
            gross_profit,
            team_share,
            user_profit: gross_profit - team_share,
            profit_share_percentage: percentage,
            retained_percentage: Decimal::ONE_HUNDRED - percentage,
        })
    }

    /// Write a split, and for team splits the pool increment and contribution.
    ///
    /// Runs on whatever connection it is given; callers wrap it in a
    /// transaction together with their own writes.
    pub async fn persist<C: ConnectionTrait>(
        &self,
        conn: &C,
        split: &ProfitSplit,
        origin: SaleOrigin<'_>,
    ) -> AutomationResult<profit_splits::Model> {
        verify_split(split)?;

        let now = Utc::now().naive_utc();
        let saved = profit_splits::ActiveModel {
            user_type: Set(split.user_type.as_str().to_string()),
            user_id: Set(split.user_id.clone()),
            order_id: Set(origin.order_id.map(str::to_string)),
            product_name: Set(origin.product_name.to_string()),
            platform: Set(origin.platform.to_string()),
            sale_price: Set(split.sale_price),
            cost: Set(split.cost),
            gross_profit: Set(split.gross_profit),
            team_share: Set(split.team_share),
            user_profit: Set(split.user_profit),
            profit_share_percentage: Set(split.profit_share_percentage),
            retained_percentage: Set(split.retained_percentage),
            recorded_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        if split.user_type == UserType::Team && split.team_share > Decimal::ZERO {
            contribute_to_pool(conn, &split.user_id, saved.id, split.team_share).await?;
        }

        Ok(saved)
    }

    /// Validate, split and persist a manually recorded sale
    pub async fn record_sale(
        &self,
        db: &DatabaseConnection,
        request: &RecordSaleRequest,
    ) -> AutomationResult<ProfitSplitRecord> {
        request.validate().map_err(AutomationError::InvalidInput)?;

        let split = self.allocate(&request.user_type, request.sale_price, request.cost)?;

        let txn = db.begin().await?;
        let saved = self
            .persist(
                &txn,
                &split,
                SaleOrigin {
                    product_name: request.product_name.trim(),
                    platform: request.platform.trim(),
                    order_id: None,
                },
            )
            .await?;
        txn.commit().await?;

        info!(
            user_type = split.user_type.as_str(),
            user_id = %split.user_id,
            gross_profit = %split.gross_profit,
            team_share = %split.team_share,
            "Recorded sale"
        );

        to_record(saved)
    }

    /// All splits for one user, newest first, with totals
    pub async fn ledger(
        &self,
        db: &DatabaseConnection,
        user_type: UserType,
        user_id: &str,
    ) -> AutomationResult<LedgerResponse> {
        let rows = ProfitSplits::find()
            .filter(profit_splits::Column::UserType.eq(user_type.as_str()))
            .filter(profit_splits::Column::UserId.eq(user_id))
            .order_by_desc(profit_splits::Column::RecordedAt)
            .order_by_desc(profit_splits::Column::Id)
            .all(db)
            .await?;

        let sales = rows
            .into_iter()
            .map(to_record)
            .collect::<AutomationResult<Vec<_>>>()?;

        let total_user_profit = round_cents(sales.iter().map(|s| s.user_profit).sum());
        let total_team_share = round_cents(sales.iter().map(|s| s.team_share).sum());

        Ok(LedgerResponse {
            user_type,
            user_id: user_id.to_string(),
            sales,
            total_user_profit,
            total_team_share,
        })
    }

    pub async fn team_pool_summary(
        &self,
        db: &DatabaseConnection,
    ) -> AutomationResult<TeamPoolSummary> {
        let pool = TeamPool::find_by_id(TEAM_POOL_ID).one(db).await?;

        let recent_contributions = TeamPoolContributions::find()
            .order_by_desc(team_pool_contributions::Column::ContributedAt)
            .order_by_desc(team_pool_contributions::Column::Id)
            .limit(RECENT_CONTRIBUTIONS)
            .all(db)
            .await?
            .into_iter()
            .map(PoolContribution::from)
            .collect();

        Ok(TeamPoolSummary {
            pool_total: pool
                .as_ref()
                .map(|p| round_cents(p.pool_total))
                .unwrap_or_default(),
            contribution_count: pool.as_ref().map(|p| p.contribution_count).unwrap_or(0),
            recent_contributions,
        })
    }
}

/// `user_profit + team_share == gross_profit == sale_price - cost`
pub fn verify_split(split: &ProfitSplit) -> AutomationResult<()> {
    if split.gross_profit != split.sale_price - split.cost {
        return Err(AutomationError::InvariantViolation(format!(
            "gross profit {} != sale price {} - cost {}",
            split.gross_profit, split.sale_price, split.cost
        )));
    }
    if split.user_profit + split.team_share != split.gross_profit {
        return Err(AutomationError::InvariantViolation(format!(
            "user profit {} + team share {} != gross profit {}",
            split.user_profit, split.team_share, split.gross_profit
        )));
    }
    if split.team_share < Decimal::ZERO {
        return Err(AutomationError::InvariantViolation(format!(
            "negative team share {}",
            split.team_share
        )));
    }
    if split.user_type != UserType::Team && !split.team_share.is_zero() {
        return Err(AutomationError::InvariantViolation(format!(
            "{} split carries a team share of {}",
            split.user_type.as_str(),
            split.team_share
        )));
    }
    Ok(())
}

fn to_record(model: profit_splits::Model) -> AutomationResult<ProfitSplitRecord> {
    let user_type = model.user_type.clone();
    ProfitSplitRecord::from_model(model).ok_or_else(|| {
        AutomationError::InvariantViolation(format!("unknown user type '{}' in ledger", user_type))
    })
}

async fn contribute_to_pool<C: ConnectionTrait>(
    conn: &C,
    contributor_id: &str,
    split_id: i32,
    amount: Decimal,
) -> AutomationResult<()> {
    let now = Utc::now().naive_utc();

    TeamPool::insert(team_pool::ActiveModel {
        id: Set(TEAM_POOL_ID),
        pool_total: Set(Decimal::ZERO),
        contribution_count: Set(0),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(team_pool::Column::Id)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    TeamPool::update_many()
        .col_expr(
            team_pool::Column::PoolTotal,
            Expr::col(team_pool::Column::PoolTotal).add(amount),
        )
        .col_expr(
            team_pool::Column::ContributionCount,
            Expr::col(team_pool::Column::ContributionCount).add(1),
        )
        .col_expr(team_pool::Column::UpdatedAt, Expr::value(now))
        .filter(team_pool::Column::Id.eq(TEAM_POOL_ID))
        .exec(conn)
        .await?;

    team_pool_contributions::ActiveModel {
        contributor_id: Set(contributor_id.to_string()),
        split_id: Set(split_id),
        amount: Set(amount),
        contributed_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    debug!(contributor = contributor_id, amount = %amount, "Team pool contribution");
    Ok(())
}
