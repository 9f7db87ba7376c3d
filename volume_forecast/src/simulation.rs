//! Synthetic daily sales for demos and tests

use crate::data::{SalesData, SalesRecord};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::f64::consts::PI;

/// Simulated daily unit sales for a set of products
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSales {
    dates: Vec<NaiveDate>,
    /// One series per product, all of length `dates.len()`
    series: Vec<Vec<f64>>,
}

impl SimulatedSales {
    /// Seasonal pattern whose amplitude grows linearly over time:
    /// `round(max(amplitude * sin(2π(t + phase_shift) / period), 0) * t / 100)`
    pub fn seasonal(
        num_products: usize,
        num_days: usize,
        period: f64,
        amplitude: f64,
        phase_shift: f64,
    ) -> Result<Self> {
        if period <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Period must be positive".to_string(),
            ));
        }

        let values: Vec<f64> = (0..num_days)
            .map(|t| {
                let t = t as f64;
                let wave = (amplitude * (2.0 * PI * (t + phase_shift) / period).sin()).max(0.0);
                (wave * t / 100.0).round()
            })
            .collect();

        Self::build(num_products, values)
    }

    /// Capped sine wave: `round(max(sin(x), 0) * 100)` for `x` spanning six periods
    pub fn periodic(num_products: usize, num_days: usize) -> Result<Self> {
        let end = 12.0 * PI;
        let step = if num_days > 1 {
            end / (num_days - 1) as f64
        } else {
            0.0
        };

        let values: Vec<f64> = (0..num_days)
            .map(|i| (((i as f64) * step).sin().max(0.0) * 100.0).round())
            .collect();

        Self::build(num_products, values)
    }

    fn build(num_products: usize, values: Vec<f64>) -> Result<Self> {
        if num_products == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one product is required".to_string(),
            ));
        }

        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .ok_or_else(|| ForecastError::DataError("Invalid start date".to_string()))?;
        let dates = (0..values.len())
            .map(|d| start + Duration::days(d as i64))
            .collect();

        Ok(Self {
            dates,
            series: vec![values; num_products],
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn num_products(&self) -> usize {
        self.series.len()
    }

    pub fn num_days(&self) -> usize {
        self.dates.len()
    }

    /// Daily sales of one product
    pub fn product(&self, product_id: usize) -> Option<&[f64]> {
        self.series.get(product_id).map(Vec::as_slice)
    }

    /// Convert to sales rows for a single customer `"0"`, one row per day and product
    pub fn to_sales_data(&self) -> SalesData {
        let records = self
            .series
            .iter()
            .enumerate()
            .flat_map(|(product_id, values)| {
                self.dates.iter().zip(values).map(move |(date, units)| SalesRecord {
                    week: date.format("%Y-%m-%d").to_string(),
                    product: None,
                    product_id: product_id.to_string(),
                    customer: None,
                    customer_id: "0".to_string(),
                    units_sold: *units,
                })
            })
            .collect();

        SalesData::new(records)
    }
}
