//! Energy summary handlers.

use crate::{
    api::{
        AppState,
        extract::{Json, Path},
        input::{NumericInput, required_f64, required_i32},
        response::{ApiResponse, ApiResult},
    },
    core::energy::{self, EnergyOverview, EnergySummary},
};
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Body of `PUT /api/energy/{userId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRequest {
    /// Panel count, fractional input truncated
    pub panels_installed: Option<NumericInput>,
    /// Estimated monthly consumption in kWh
    pub monthly_consumption_base: Option<NumericInput>,
}

/// Response of a saved baseline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineResponse {
    /// Human-readable outcome
    pub message: &'static str,
    /// The six figures written to the summary row
    pub saved_data: EnergySummary,
}

/// GET /api/energy/{userId}
pub async fn overview(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<EnergyOverview> {
    Ok(ApiResponse::Ok(
        energy::get_energy_overview(&state.db, user_id).await?,
    ))
}

/// PUT /api/energy/{userId}
pub async fn set_baseline(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<BaselineRequest>,
) -> ApiResult<BaselineResponse> {
    let panels_installed = required_i32("panelsInstalled", req.panels_installed.as_ref())?;
    let monthly_consumption_base = required_f64(
        "monthlyConsumptionBase",
        req.monthly_consumption_base.as_ref(),
    )?;

    let saved_data = energy::set_energy_baseline(
        &state.db,
        &state.locks,
        user_id,
        panels_installed,
        monthly_consumption_base,
    )
    .await?;
    Ok(ApiResponse::Ok(BaselineResponse {
        message: "Energy data saved",
        saved_data,
    }))
}
