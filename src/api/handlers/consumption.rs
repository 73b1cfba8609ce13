//! Monthly consumption handlers.

use crate::{
    api::{
        AppState,
        extract::{Json, Path},
        input::{NumericInput, required_f64, required_i32, required_id},
        response::{ApiResponse, ApiResult},
    },
    core::{
        consumption::{self, ConsumptionEntry, RegistrationOutcome},
        energy::UpdatedTotals,
    },
    entities::MonthlyConsumptionModel,
};
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/consumption`. Every field is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRequest {
    /// Owning user
    pub user_id: Option<NumericInput>,
    /// Calendar month, 1 to 12
    pub month: Option<NumericInput>,
    /// Calendar year
    pub year: Option<NumericInput>,
    /// Consumption in kWh
    pub monthly_consumption: Option<NumericInput>,
}

impl ConsumptionRequest {
    fn into_entry(self) -> crate::errors::Result<ConsumptionEntry> {
        Ok(ConsumptionEntry {
            user_id: required_id("userId", self.user_id.as_ref())?,
            month: required_i32("month", self.month.as_ref())?,
            year: required_i32("year", self.year.as_ref())?,
            monthly_consumption: required_f64(
                "monthlyConsumption",
                self.monthly_consumption.as_ref(),
            )?,
        })
    }
}

/// Response of a consumption registration.
#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum RegistrationResponse {
    /// Sent with 201
    Completed {
        /// Human-readable outcome
        message: &'static str,
        /// The saved record
        record: MonthlyConsumptionModel,
        /// Totals after recalculation
        updated_totals: UpdatedTotals,
    },
    /// Sent with 202
    TotalsStale {
        /// Human-readable outcome
        message: &'static str,
        /// The saved record
        record: MonthlyConsumptionModel,
        /// Always `true`
        record_saved: bool,
        /// Always `false`
        totals_updated: bool,
        /// Why the recalculation failed
        error: String,
    },
}

/// POST /api/consumption
///
/// 201 when the totals were recalculated, 202 when only the record was saved.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<ConsumptionRequest>,
) -> ApiResult<RegistrationResponse> {
    let entry = req.into_entry()?;
    let outcome = consumption::register_consumption(&state.db, &state.locks, entry).await?;

    Ok(match outcome {
        RegistrationOutcome::Completed { record, totals } => {
            ApiResponse::Created(RegistrationResponse::Completed {
                message: "Consumption recorded and totals updated",
                record,
                updated_totals: totals,
            })
        }
        RegistrationOutcome::TotalsStale { record, error } => {
            let message = if error.is_consistency_violation() {
                "Consumption recorded, but the energy summary is missing"
            } else {
                "Consumption recorded, but updating totals failed"
            };
            ApiResponse::Accepted(RegistrationResponse::TotalsStale {
                message,
                record,
                record_saved: true,
                totals_updated: false,
                error: error.to_string(),
            })
        }
    })
}

/// GET /api/consumption/{userId}
pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<MonthlyConsumptionModel>> {
    Ok(ApiResponse::Ok(
        consumption::list_records(&state.db, user_id).await?,
    ))
}
