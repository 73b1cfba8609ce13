//! Solar system sizing estimate for prospective customers.

use crate::errors::{Error, Result};
use serde::Serialize;

/// Rated power of one panel in kW.
pub const PANEL_POWER_KW: f64 = 0.4;
/// Roof area taken by one panel in m².
pub const PANEL_AREA_M2: f64 = 2.0;
/// Average daily sun hours.
pub const SUN_HOURS_PER_DAY: f64 = 5.0;
/// Installed cost of one panel.
pub const PANEL_COST: f64 = 3800.0;
/// Price of one kWh from the grid.
pub const ENERGY_PRICE: f64 = 0.75;
/// Share of the house area usable for panels.
pub const USABLE_ROOF_FRACTION: f64 = 0.7;

const DAYS_PER_MONTH: f64 = 30.0;

/// Sizing and payback figures for a house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEstimate {
    /// Panels needed to cover the consumption
    pub panels: u32,
    /// Roof area the panels take, in m²
    pub required_area: f64,
    /// Usable share of the house area, in m²
    pub available_area: f64,
    /// Whether `required_area` fits in `available_area`
    pub fits_on_roof: bool,
    /// Installed cost of all panels
    pub total_cost: f64,
    /// Expected production in kWh per month
    pub monthly_production: f64,
    /// Grid cost avoided per month
    pub monthly_savings: f64,
    /// Grid cost avoided per year
    pub annual_savings: f64,
    /// Absent when the system saves nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_years: Option<f64>,
}

/// Sizes a system covering `monthly_consumption` kWh on a house of `house_size` m².
///
/// # Errors
/// Returns [`Error::Validation`] unless both inputs are finite and positive.
pub fn estimate_system(house_size: f64, monthly_consumption: f64) -> Result<SystemEstimate> {
    if !house_size.is_finite() || house_size <= 0.0 {
        return Err(Error::validation("houseSize must be a positive number"));
    }
    if !monthly_consumption.is_finite() || monthly_consumption <= 0.0 {
        return Err(Error::validation(
            "monthlyConsumption must be a positive number",
        ));
    }

    let daily_consumption = monthly_consumption / DAYS_PER_MONTH;
    let panel_count = (daily_consumption / SUN_HOURS_PER_DAY / PANEL_POWER_KW).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let panels = panel_count as u32;

    let required_area = panel_count * PANEL_AREA_M2;
    let available_area = house_size * USABLE_ROOF_FRACTION;
    let total_cost = panel_count * PANEL_COST;
    let monthly_production = panel_count * PANEL_POWER_KW * SUN_HOURS_PER_DAY * DAYS_PER_MONTH;
    let monthly_savings = monthly_production * ENERGY_PRICE;
    let annual_savings = monthly_savings * 12.0;
    let payback_years = (annual_savings > 0.0).then(|| total_cost / annual_savings);

    Ok(SystemEstimate {
        panels,
        required_area,
        available_area,
        fits_on_roof: required_area <= available_area,
        total_cost,
        monthly_production,
        monthly_savings,
        annual_savings,
        payback_years,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_typical_house() -> Result<()> {
        // 300 kWh/month -> 10 kWh/day -> 2 kW -> 5 panels
        let estimate = estimate_system(100.0, 300.0)?;
        assert_eq!(estimate.panels, 5);
        assert_eq!(estimate.required_area, 10.0);
        assert_eq!(estimate.available_area, 70.0);
        assert!(estimate.fits_on_roof);
        assert_eq!(estimate.total_cost, 19_000.0);
        assert_eq!(estimate.monthly_production, 300.0);
        assert_eq!(estimate.monthly_savings, 225.0);
        assert_eq!(estimate.annual_savings, 2700.0);
        assert_eq!(estimate.payback_years, Some(19_000.0 / 2700.0));
        Ok(())
    }

    #[test]
    fn test_panel_count_rounds_up() -> Result<()> {
        let estimate = estimate_system(100.0, 301.0)?;
        assert_eq!(estimate.panels, 6);
        Ok(())
    }

    #[test]
    fn test_small_roof_does_not_fit() -> Result<()> {
        let estimate = estimate_system(10.0, 1200.0)?;
        assert_eq!(estimate.panels, 20);
        assert_eq!(estimate.required_area, 40.0);
        assert!(!estimate.fits_on_roof);
        Ok(())
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        for (house, consumption) in [(0.0, 100.0), (-5.0, 100.0), (50.0, 0.0), (f64::NAN, 1.0)] {
            assert!(matches!(
                estimate_system(house, consumption),
                Err(Error::Validation { .. })
            ));
        }
    }
}
