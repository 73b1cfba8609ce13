//! Solar system estimate handler.

use crate::{
    api::{
        extract::Json,
        input::{NumericInput, required_f64},
        response::{ApiResponse, ApiResult},
    },
    core::estimator::{self, SystemEstimate},
};
use serde::Deserialize;

/// Body of `POST /api/calculator`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    /// House area in m²
    pub house_size: Option<NumericInput>,
    /// Monthly consumption in kWh
    pub monthly_consumption: Option<NumericInput>,
}

/// POST /api/calculator
pub async fn estimate(Json(req): Json<EstimateRequest>) -> ApiResult<SystemEstimate> {
    let house_size = required_f64("houseSize", req.house_size.as_ref())?;
    let monthly_consumption =
        required_f64("monthlyConsumption", req.monthly_consumption.as_ref())?;
    Ok(ApiResponse::Ok(estimator::estimate_system(
        house_size,
        monthly_consumption,
    )?))
}
