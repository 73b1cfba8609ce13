//! Monthly consumption business logic.
//!
//! A record is keyed by `(user_id, month, year)`. Submitting the same period again
//! overwrites the value in place, and every submission is followed by a full totals
//! recalculation for the user.

use crate::{
    core::{
        energy::{UpdatedTotals, recalculate_totals},
        locks::UserLocks,
        metrics::MAX_MONTHLY_CONSUMPTION,
        user::ensure_user_exists,
    },
    entities::{MonthlyConsumption, monthly_consumption},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// One month of consumption for one user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionEntry {
    /// Owning user
    pub user_id: i64,
    /// Calendar month, 1 to 12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Consumption in kWh
    pub monthly_consumption: f64,
}

impl ConsumptionEntry {
    /// Checks the period and the consumption value.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a month outside 1..=12, a year below 1, or a
    /// consumption that is negative, non-finite or above [`MAX_MONTHLY_CONSUMPTION`].
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(Error::validation("month must be between 1 and 12"));
        }
        if self.year < 1 {
            return Err(Error::validation("year must be a positive number"));
        }
        if !self.monthly_consumption.is_finite() || self.monthly_consumption < 0.0 {
            return Err(Error::validation(
                "monthlyConsumption must be a number zero or greater",
            ));
        }
        if self.monthly_consumption > MAX_MONTHLY_CONSUMPTION {
            return Err(Error::validation(format!(
                "monthlyConsumption cannot exceed {MAX_MONTHLY_CONSUMPTION} kWh"
            )));
        }
        Ok(())
    }
}

/// Result of [`register_consumption`].
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// Record saved and totals recalculated.
    Completed {
        /// The inserted or overwritten record
        record: monthly_consumption::Model,
        /// Totals written back to the summary row
        totals: UpdatedTotals,
    },
    /// Record saved, but the recalculation failed and the summary is out of date.
    TotalsStale {
        /// The inserted or overwritten record
        record: monthly_consumption::Model,
        /// Why the recalculation failed
        error: Error,
    },
}

impl RegistrationOutcome {
    /// The persisted record, whichever way the recalculation went.
    #[must_use]
    pub const fn record(&self) -> &monthly_consumption::Model {
        match self {
            Self::Completed { record, .. } | Self::TotalsStale { record, .. } => record,
        }
    }
}

/// Saves a month of consumption, then recalculates the user's totals.
///
/// The upsert commits before the recalculation starts, so a recalculation failure does
/// not undo the record. Both steps run under the user's lock.
///
/// # Errors
/// * [`Error::Validation`] - see [`ConsumptionEntry::validate`]
/// * [`Error::UserNotFound`] - no such user
/// * [`Error::Database`] - the upsert itself failed
#[instrument(skip(db, locks))]
pub async fn register_consumption(
    db: &DatabaseConnection,
    locks: &UserLocks,
    entry: ConsumptionEntry,
) -> Result<RegistrationOutcome> {
    entry.validate()?;
    ensure_user_exists(db, entry.user_id).await?;

    let _guard = locks.acquire(entry.user_id).await;
    let record = upsert_record(db, &entry).await?;

    match recalculate_totals(db, entry.user_id).await {
        Ok(totals) => Ok(RegistrationOutcome::Completed { record, totals }),
        Err(error) => {
            warn!(
                user_id = entry.user_id,
                record_id = record.id,
                %error,
                "Consumption saved but totals are stale"
            );
            Ok(RegistrationOutcome::TotalsStale { record, error })
        }
    }
}

async fn upsert_record(
    db: &DatabaseConnection,
    entry: &ConsumptionEntry,
) -> Result<monthly_consumption::Model> {
    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let existing = MonthlyConsumption::find()
        .filter(monthly_consumption::Column::UserId.eq(entry.user_id))
        .filter(monthly_consumption::Column::Month.eq(entry.month))
        .filter(monthly_consumption::Column::Year.eq(entry.year))
        .one(&txn)
        .await?;

    let record = if let Some(model) = existing {
        let mut active: monthly_consumption::ActiveModel = model.into();
        active.monthly_consumption = Set(entry.monthly_consumption);
        active.updated_at = Set(now);
        active.update(&txn).await?
    } else {
        monthly_consumption::ActiveModel {
            user_id: Set(entry.user_id),
            month: Set(entry.month),
            year: Set(entry.year),
            monthly_consumption: Set(entry.monthly_consumption),
            recorded_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };
    txn.commit().await?;

    info!(
        user_id = entry.user_id,
        month = entry.month,
        year = entry.year,
        monthly_consumption = entry.monthly_consumption,
        "Consumption recorded"
    );
    Ok(record)
}

/// Lists a user's records, newest period first.
///
/// # Errors
/// * [`Error::UserNotFound`] - no such user
pub async fn list_records(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<monthly_consumption::Model>> {
    ensure_user_exists(db, user_id).await?;
    Ok(MonthlyConsumption::find()
        .filter(monthly_consumption::Column::UserId.eq(user_id))
        .order_by_desc(monthly_consumption::Column::Year)
        .order_by_desc(monthly_consumption::Column::Month)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::energy::get_energy_overview;
    use crate::entities::{EnergyData, energy_data};
    use crate::test_utils::*;

    fn entry(user_id: i64, month: i32, year: i32, monthly_consumption: f64) -> ConsumptionEntry {
        ConsumptionEntry {
            user_id,
            month,
            year,
            monthly_consumption,
        }
    }

    fn expect_completed(outcome: RegistrationOutcome) -> (monthly_consumption::Model, UpdatedTotals) {
        match outcome {
            RegistrationOutcome::Completed { record, totals } => (record, totals),
            RegistrationOutcome::TotalsStale { error, .. } => {
                panic!("expected completed registration, got stale totals: {error}")
            }
        }
    }

    #[tokio::test]
    async fn test_two_months_recompute_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;
        set_produced(&db, user.id, 300.0).await?;

        register_consumption(&db, &locks, entry(user.id, 1, 2024, 100.0)).await?;
        let (record, totals) =
            expect_completed(register_consumption(&db, &locks, entry(user.id, 2, 2024, 150.0)).await?);

        assert_eq!(record.month, 2);
        assert_eq!(totals.total_consumed, 250.0);
        assert_eq!(totals.total_saved, 50.0);
        assert_eq!(totals.money_saved, 37.5);
        assert_eq!(totals.trees_saved, 6.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_resubmission_overwrites_in_place() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;

        let (first, _) =
            expect_completed(register_consumption(&db, &locks, entry(user.id, 5, 2024, 150.0)).await?);
        let (second, totals) =
            expect_completed(register_consumption(&db, &locks, entry(user.id, 5, 2024, 200.0)).await?);

        assert_eq!(first.id, second.id);
        assert_eq!(first.recorded_at, second.recorded_at);
        assert_eq!(second.monthly_consumption, 200.0);
        assert_eq!(totals.total_consumed, 200.0);

        let records = list_records(&db, user.id).await?;
        assert_eq!(records.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_registration_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;
        set_produced(&db, user.id, 120.0).await?;

        let (_, once) =
            expect_completed(register_consumption(&db, &locks, entry(user.id, 3, 2024, 40.0)).await?);
        let (_, twice) =
            expect_completed(register_consumption(&db, &locks, entry(user.id, 3, 2024, 40.0)).await?);

        assert_eq!(once, twice);
        assert_eq!(list_records(&db, user.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_total_matches_sum_of_records() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;

        for (month, value) in [(1, 10.5), (2, 20.25), (3, 0.0), (4, 33.0), (2, 7.0)] {
            register_consumption(&db, &locks, entry(user.id, month, 2024, value)).await?;
        }

        let overview = get_energy_overview(&db, user.id).await?;
        let sum: f64 = overview
            .monthly_records
            .iter()
            .map(|r| r.monthly_consumption)
            .sum();
        assert_eq!(overview.monthly_records.len(), 4);
        assert_eq!(overview.summary.total_consumed, sum);
        assert_eq!(sum, 10.5 + 7.0 + 0.0 + 33.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_summary_row_leaves_totals_stale() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;
        EnergyData::delete_many()
            .filter(energy_data::Column::UserId.eq(user.id))
            .exec(&db)
            .await?;

        let outcome = register_consumption(&db, &locks, entry(user.id, 6, 2024, 90.0)).await?;
        assert_eq!(outcome.record().monthly_consumption, 90.0);
        assert!(matches!(
            outcome,
            RegistrationOutcome::TotalsStale {
                error: Error::MissingBaseData { .. },
                ..
            }
        ));
        assert_eq!(list_records(&db, user.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_invalid_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;

        for bad in [
            entry(user.id, 0, 2024, 1.0),
            entry(user.id, 13, 2024, 1.0),
            entry(user.id, 1, 0, 1.0),
            entry(user.id, 1, 2024, -1.0),
            entry(user.id, 1, 2024, f64::INFINITY),
        ] {
            let result = register_consumption(&db, &locks, bad).await;
            assert!(matches!(result, Err(Error::Validation { .. })), "{bad:?}");
        }
        assert!(list_records(&db, user.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_huge_consumption_never_turns_into_savings() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;
        set_produced(&db, user.id, 300.0).await?;

        for month in [1, 2] {
            let result = register_consumption(&db, &locks, entry(user.id, month, 2024, 1e308)).await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
        assert!(list_records(&db, user.id).await?.is_empty());

        for month in [1, 2] {
            register_consumption(
                &db,
                &locks,
                entry(user.id, month, 2024, MAX_MONTHLY_CONSUMPTION),
            )
            .await?;
        }
        let overview = get_energy_overview(&db, user.id).await?;
        assert_eq!(overview.summary.total_consumed, 2.0 * MAX_MONTHLY_CONSUMPTION);
        assert_eq!(overview.summary.total_saved, 0.0);
        assert_eq!(overview.summary.money_saved, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();

        let result = register_consumption(&db, &locks, entry(31, 1, 2024, 1.0)).await;
        assert!(matches!(result, Err(Error::UserNotFound { user_id: 31 })));

        let result = list_records(&db, 31).await;
        assert!(matches!(result, Err(Error::UserNotFound { user_id: 31 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_records_listed_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;

        register_consumption(&db, &locks, entry(user.id, 11, 2023, 1.0)).await?;
        register_consumption(&db, &locks, entry(user.id, 2, 2024, 2.0)).await?;
        register_consumption(&db, &locks, entry(user.id, 1, 2024, 3.0)).await?;

        let periods: Vec<(i32, i32)> = list_records(&db, user.id)
            .await?
            .iter()
            .map(|r| (r.year, r.month))
            .collect();
        assert_eq!(periods, vec![(2024, 2), (2024, 1), (2023, 11)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_registrations_keep_sum_consistent() -> Result<()> {
        let db = setup_test_db().await?;
        let locks = UserLocks::new();
        let user = create_test_user(&db, "alice").await?;

        let mut tasks = Vec::new();
        for month in 1..=12 {
            let db = db.clone();
            let locks = locks.clone();
            let user_id = user.id;
            tasks.push(tokio::spawn(async move {
                register_consumption(&db, &locks, entry(user_id, month, 2024, 10.0)).await
            }));
        }
        for task in tasks {
            expect_completed(task.await.unwrap()?);
        }

        let overview = get_energy_overview(&db, user.id).await?;
        assert_eq!(overview.monthly_records.len(), 12);
        assert_eq!(overview.summary.total_consumed, 120.0);

        Ok(())
    }
}
