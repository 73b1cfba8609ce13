//! Solar metrics calculation.
//!
//! Pure functions mapping production and consumption totals to savings figures.
//! Rounding is applied only to the outputs; callers must always pass raw stored totals,
//! never previously rounded results, so that rounding never compounds.

use serde::Serialize;

/// Price of one kWh from the grid.
pub const KWH_PRICE: f64 = 0.75;

/// Trees saved per kWh produced.
pub const TREES_SAVED_FACTOR: f64 = 0.02;

/// Average production of one panel per month in kWh.
pub const AVG_PRODUCTION_PER_PANEL: f64 = 30.0;

/// Largest accepted consumption for a single month or baseline, in kWh.
pub const MAX_MONTHLY_CONSUMPTION: f64 = 1.0e9;

/// Savings derived from a production/consumption pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarMetrics {
    /// Net energy saved in kWh, never negative, 2 decimals
    pub energy_saved: f64,
    /// Money saved from the net energy, 2 decimals
    pub money_saved: f64,
    /// Trees saved from production, 1 decimal
    pub trees_saved: f64,
}

/// Computes savings for the given totals.
///
/// NaN counts as zero, as does a non-finite production. Infinite consumption exceeds any
/// production. Consumption above production yields zero savings, while trees saved
/// depend on production alone.
#[must_use]
pub fn calculate_metrics(total_produced: f64, total_consumed: f64) -> SolarMetrics {
    let produced = finite_or_zero(total_produced);
    let consumed = if total_consumed.is_nan()
        || (total_consumed.is_infinite() && total_consumed.is_sign_negative())
    {
        0.0
    } else {
        total_consumed
    };

    let energy_saved = (produced - consumed).max(0.0);
    let money_saved = energy_saved * KWH_PRICE;
    let trees_saved = produced * TREES_SAVED_FACTOR;

    SolarMetrics {
        energy_saved: round_to(energy_saved, 2),
        money_saved: round_to(money_saved, 2),
        trees_saved: round_to(trees_saved, 1),
    }
}

/// Production estimate used by the admin baseline.
#[must_use]
pub fn estimated_production(panels_installed: i32) -> f64 {
    f64::from(panels_installed) * AVG_PRODUCTION_PER_PANEL
}

/// Maps NaN and infinities to zero.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
