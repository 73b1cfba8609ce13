//! Energy summary business logic.
//!
//! Keeps the denormalized `energy_data` row of each user in sync with the normalized
//! monthly consumption records. Totals are always recomputed from the full record set
//! and the admin-controlled production figure, never adjusted incrementally.

use crate::{
    core::{
        locks::UserLocks,
        metrics::{self, calculate_metrics},
        user::ensure_user_exists,
    },
    entities::{EnergyData, MonthlyConsumption, energy_data, monthly_consumption},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

/// Fresh totals written by [`recalculate_totals`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedTotals {
    /// Sum of all monthly consumption records
    pub total_consumed: f64,
    /// Net energy saved
    pub total_saved: f64,
    /// Money saved
    pub money_saved: f64,
    /// Trees saved
    pub trees_saved: f64,
}

/// The six summary figures of an `energy_data` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergySummary {
    /// Number of panels installed
    pub panels_installed: i32,
    /// Total energy produced in kWh
    pub total_produced: f64,
    /// Total energy consumed in kWh
    pub total_consumed: f64,
    /// Net energy saved in kWh
    pub total_saved: f64,
    /// Money saved
    pub money_saved: f64,
    /// Trees saved
    pub trees_saved: f64,
}

impl From<&energy_data::Model> for EnergySummary {
    fn from(row: &energy_data::Model) -> Self {
        Self {
            panels_installed: row.panels_installed,
            total_produced: row.total_produced,
            total_consumed: row.total_consumed,
            total_saved: row.total_saved,
            money_saved: row.money_saved,
            trees_saved: row.trees_saved,
        }
    }
}

/// Energy summary of a user together with the monthly records behind it.
///
/// When the user has no `energy_data` row the summary is all zeros and `id`/`updated_at`
/// are omitted from the JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyOverview {
    /// Summary row ID, if the row exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Owning user
    pub user_id: i64,
    /// Summary figures
    #[serde(flatten)]
    pub summary: EnergySummary,
    /// When the summary was last written, if the row exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    /// Monthly records in chronological order
    pub monthly_records: Vec<monthly_consumption::Model>,
}

/// Inserts the zeroed summary row every new user starts with.
pub async fn create_zeroed_energy_data<C>(conn: &C, user_id: i64) -> Result<energy_data::Model>
where
    C: ConnectionTrait,
{
    let row = energy_data::ActiveModel {
        user_id: Set(user_id),
        panels_installed: Set(0),
        total_produced: Set(0.0),
        total_consumed: Set(0.0),
        total_saved: Set(0.0),
        money_saved: Set(0.0),
        trees_saved: Set(0.0),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    Ok(row.insert(conn).await?)
}

/// Recomputes a user's totals from all of their monthly records, in one transaction.
///
/// 1. Sums `monthly_consumption` over every record of the user (empty set sums to 0)
/// 2. Reads `total_produced` from the user's `energy_data` row
/// 3. Derives savings with [`calculate_metrics`]
/// 4. Writes consumption and savings back with a single UPDATE
///
/// # Errors
/// * [`Error::MissingBaseData`] - the user has no `energy_data` row
/// * [`Error::UpdateNoOp`] - the UPDATE matched no row
#[instrument(skip(db))]
pub async fn recalculate_totals(db: &DatabaseConnection, user_id: i64) -> Result<UpdatedTotals> {
    let txn = db.begin().await?;
    let totals = recalculate_totals_in(&txn, user_id).await?;
    txn.commit().await?;
    Ok(totals)
}

/// Same as [`recalculate_totals`] on a caller-provided connection or transaction.
pub async fn recalculate_totals_in<C>(conn: &C, user_id: i64) -> Result<UpdatedTotals>
where
    C: ConnectionTrait,
{
    let records = MonthlyConsumption::find()
        .filter(monthly_consumption::Column::UserId.eq(user_id))
        .all(conn)
        .await?;
    let total_consumed: f64 = records
        .iter()
        .map(|record| metrics::finite_or_zero(record.monthly_consumption))
        .sum();

    let Some(base) = EnergyData::find()
        .filter(energy_data::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    else {
        error!(user_id, "No energy_data row while recalculating totals");
        return Err(Error::MissingBaseData { user_id });
    };

    let metrics = calculate_metrics(base.total_produced, total_consumed);

    let result = EnergyData::update_many()
        .col_expr(energy_data::Column::TotalConsumed, Expr::value(total_consumed))
        .col_expr(energy_data::Column::TotalSaved, Expr::value(metrics.energy_saved))
        .col_expr(energy_data::Column::MoneySaved, Expr::value(metrics.money_saved))
        .col_expr(energy_data::Column::TreesSaved, Expr::value(metrics.trees_saved))
        .col_expr(
            energy_data::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(energy_data::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        error!(user_id, "Totals update affected no rows");
        return Err(Error::UpdateNoOp { user_id });
    }

    info!(
        user_id,
        records = records.len(),
        total_consumed,
        "Totals recalculated"
    );
    Ok(UpdatedTotals {
        total_consumed,
        total_saved: metrics.energy_saved,
        money_saved: metrics.money_saved,
        trees_saved: metrics.trees_saved,
    })
}

/// Admin operation: seeds a user's summary from a panel count and a consumption estimate.
///
/// Production is estimated as `panels_installed` times
/// [`AVG_PRODUCTION_PER_PANEL`](metrics::AVG_PRODUCTION_PER_PANEL). The row is inserted
/// if missing, otherwise overwritten. The stored `total_consumed` is the baseline value
/// until the next monthly registration recomputes it from the records.
///
/// # Errors
/// * [`Error::Validation`] - a negative or non-finite input, or a consumption above
///   [`MAX_MONTHLY_CONSUMPTION`](metrics::MAX_MONTHLY_CONSUMPTION)
/// * [`Error::UserNotFound`] - no such user
#[instrument(skip(db, locks))]
pub async fn set_energy_baseline(
    db: &DatabaseConnection,
    locks: &UserLocks,
    user_id: i64,
    panels_installed: i32,
    monthly_consumption_base: f64,
) -> Result<EnergySummary> {
    if panels_installed < 0 {
        return Err(Error::validation("panelsInstalled must be zero or greater"));
    }
    if !monthly_consumption_base.is_finite() || monthly_consumption_base < 0.0 {
        return Err(Error::validation(
            "monthlyConsumptionBase must be a number zero or greater",
        ));
    }
    if monthly_consumption_base > metrics::MAX_MONTHLY_CONSUMPTION {
        return Err(Error::validation(format!(
            "monthlyConsumptionBase cannot exceed {} kWh",
            metrics::MAX_MONTHLY_CONSUMPTION
        )));
    }

    ensure_user_exists(db, user_id).await?;

    let total_produced = metrics::estimated_production(panels_installed);
    let metrics = calculate_metrics(total_produced, monthly_consumption_base);
    let summary = EnergySummary {
        panels_installed,
        total_produced,
        total_consumed: monthly_consumption_base,
        total_saved: metrics.energy_saved,
        money_saved: metrics.money_saved,
        trees_saved: metrics.trees_saved,
    };

    let _guard = locks.acquire(user_id).await;
    let txn = db.begin().await?;
    let existing = EnergyData::find()
        .filter(energy_data::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let mut row: energy_data::ActiveModel = match existing {
        Some(model) => model.into(),
        None => energy_data::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        },
    };
    row.panels_installed = Set(summary.panels_installed);
    row.total_produced = Set(summary.total_produced);
    row.total_consumed = Set(summary.total_consumed);
    row.total_saved = Set(summary.total_saved);
    row.money_saved = Set(summary.money_saved);
    row.trees_saved = Set(summary.trees_saved);
    row.updated_at = Set(Utc::now().naive_utc());
    row.save(&txn).await?;
    txn.commit().await?;

    info!(user_id, panels_installed, "Energy baseline saved");
    Ok(summary)
}

/// Reads a user's summary and monthly records.
///
/// A missing `energy_data` row is not an error: the overview comes back zeroed.
pub async fn get_energy_overview(db: &DatabaseConnection, user_id: i64) -> Result<EnergyOverview> {
    let row = EnergyData::find()
        .filter(energy_data::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    let monthly_records = MonthlyConsumption::find()
        .filter(monthly_consumption::Column::UserId.eq(user_id))
        .order_by_asc(monthly_consumption::Column::Year)
        .order_by_asc(monthly_consumption::Column::Month)
        .all(db)
        .await?;

    debug!(
        user_id,
        has_summary = row.is_some(),
        records = monthly_records.len(),
        "Loaded energy overview"
    );
    Ok(EnergyOverview {
        id: row.as_ref().map(|r| r.id),
        user_id,
        summary: row.as_ref().map(EnergySummary::from).unwrap_or_default(),
        updated_at: row.map(|r| r.updated_at),
        monthly_records,
    })
}
