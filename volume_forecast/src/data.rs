//! Sales history loading and selection
//!
//! Rows carry one sales figure per week, product and customer. Source files
//! with other header names are read through a [`ColumnMapping`].

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use volume_math::SequenceCodec;

/// A single row of sales history
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesRecord {
    pub week: String,
    #[serde(default)]
    pub product: Option<String>,
    pub product_id: String,
    #[serde(default)]
    pub customer: Option<String>,
    pub customer_id: String,
    pub units_sold: f64,
}

/// Renames source headers to the canonical column names before parsing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    renames: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the source column `from` onto the canonical column `to`
    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.renames.insert(from.to_string(), to.to_string());
        self
    }

    fn apply(&self, headers: &StringRecord) -> StringRecord {
        headers
            .iter()
            .map(|h| self.renames.get(h).map(String::as_str).unwrap_or(h))
            .collect()
    }
}

/// Row selection by product and customer ids; `None` means no restriction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesFilter {
    pub product_ids: Option<Vec<String>>,
    pub customer_ids: Option<Vec<String>>,
}

impl SalesFilter {
    /// Filter that keeps every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn product(mut self, product_id: impl Into<String>) -> Self {
        self.product_ids
            .get_or_insert_with(Vec::new)
            .push(product_id.into());
        self
    }

    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_ids
            .get_or_insert_with(Vec::new)
            .push(customer_id.into());
        self
    }

    fn matches(&self, record: &SalesRecord) -> bool {
        let product_ok = self
            .product_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&record.product_id));
        let customer_ok = self
            .customer_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&record.customer_id));
        product_ok && customer_ok
    }
}

/// Units sold in one week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyVolume {
    pub week: String,
    pub units_sold: f64,
}

/// Sales history held in memory
#[derive(Debug, Clone, Default)]
pub struct SalesData {
    records: Vec<SalesRecord>,
}

impl SalesData {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Load sales history from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, mapping: &ColumnMapping) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let data = Self::from_reader(file, mapping)?;

        log::debug!("Loaded {} sales rows from {}", data.len(), path.display());
        Ok(data)
    }

    /// Load sales history from any CSV source
    pub fn from_reader<R: Read>(reader: R, mapping: &ColumnMapping) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        reader.set_headers(mapping.apply(&headers));

        let records = reader
            .deserialize::<SalesRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct product ids, sorted
    pub fn product_ids(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.product_id.clone()))
    }

    /// Distinct customer ids, sorted
    pub fn customer_ids(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.customer_id.clone()))
    }

    /// Distinct product names, sorted
    pub fn products(&self) -> Vec<String> {
        distinct(self.records.iter().filter_map(|r| r.product.clone()))
    }

    /// Distinct customer names, sorted
    pub fn customers(&self) -> Vec<String> {
        distinct(self.records.iter().filter_map(|r| r.customer.clone()))
    }

    /// Units sold per week over the selected rows, ordered by week
    pub fn weekly_volumes(&self, filter: &SalesFilter) -> Vec<WeeklyVolume> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for record in self.records.iter().filter(|r| filter.matches(r)) {
            *totals.entry(record.week.as_str()).or_insert(0.0) += record.units_sold;
        }

        let mut weeks: Vec<WeeklyVolume> = totals
            .into_iter()
            .map(|(week, units_sold)| WeeklyVolume {
                week: week.to_string(),
                units_sold,
            })
            .collect();
        weeks.sort_by_cached_key(|w| WeekKey::parse(&w.week));
        weeks
    }

    /// The weekly totals as a plain sequence
    pub fn volumes(&self, filter: &SalesFilter) -> Vec<f64> {
        self.weekly_volumes(filter)
            .into_iter()
            .map(|w| w.units_sold)
            .collect()
    }

    /// Encode the weekly totals between `from` and `to` (exclusive, clamped)
    pub fn serialized_volumes(
        &self,
        filter: &SalesFilter,
        from: usize,
        to: Option<usize>,
        codec: &SequenceCodec,
    ) -> Result<String> {
        let volumes = self.volumes(filter);
        let to = to.unwrap_or(volumes.len()).min(volumes.len());
        if from > to {
            return Err(ForecastError::DataError(format!(
                "Invalid range {}..{} for {} weeks",
                from,
                to,
                volumes.len()
            )));
        }
        Ok(codec.encode(&volumes[from..to]))
    }

    /// Products of a customer with at least `min_weeks` distinct weeks of history
    pub fn forecastable_products(&self, customer_id: &str, min_weeks: usize) -> Vec<String> {
        distinct(
            self.weeks_by_series()
                .into_iter()
                .filter(|((customer, _), weeks)| {
                    *customer == customer_id && weeks.len() >= min_weeks
                })
                .map(|((_, product), _)| product.to_string()),
        )
    }

    /// Customers with at least one product that has `min_weeks` distinct weeks of history
    pub fn forecastable_customers(&self, min_weeks: usize) -> Vec<String> {
        distinct(
            self.weeks_by_series()
                .into_iter()
                .filter(|(_, weeks)| weeks.len() >= min_weeks)
                .map(|((customer, _), _)| customer.to_string()),
        )
    }

    /// Distinct weeks per (customer id, product id)
    fn weeks_by_series(&self) -> HashMap<(&str, &str), BTreeSet<&str>> {
        let mut weeks: HashMap<(&str, &str), BTreeSet<&str>> = HashMap::new();
        for record in &self.records {
            weeks
                .entry((record.customer_id.as_str(), record.product_id.as_str()))
                .or_default()
                .insert(record.week.as_str());
        }
        weeks
    }
}

/// Embedding vectors keyed by customer and product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesEmbeddings {
    vectors: BTreeMap<(String, String), Vec<f64>>,
}

impl SeriesEmbeddings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the embedding of one customer/product series, returning the one it replaces
    pub fn insert(
        &mut self,
        customer_id: impl Into<String>,
        product_id: impl Into<String>,
        embedding: Vec<f64>,
    ) -> Option<Vec<f64>> {
        self.vectors
            .insert((customer_id.into(), product_id.into()), embedding)
    }

    pub fn get(&self, customer_id: &str, product_id: &str) -> Option<&[f64]> {
        self.vectors
            .get(&(customer_id.to_string(), product_id.to_string()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Entries as `(customer_id, product_id, embedding)`, ordered by customer then product
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[f64])> {
        self.vectors
            .iter()
            .map(|((customer, product), v)| (customer.as_str(), product.as_str(), v.as_slice()))
    }
}

/// Split a series into history and the trailing `horizon` values
pub fn split_holdout(series: &[f64], horizon: usize) -> Result<(&[f64], &[f64])> {
    if horizon == 0 || horizon >= series.len() {
        return Err(ForecastError::DataError(format!(
            "Hold-out of {} leaves no history in a series of {}",
            horizon,
            series.len()
        )));
    }
    Ok(series.split_at(series.len() - horizon))
}

fn distinct<I: Iterator<Item = String>>(values: I) -> Vec<String> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Sort key for week labels: numbers, then ISO dates, then free text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum WeekKey {
    Number(i64),
    Date(NaiveDate),
    Text(String),
}

impl WeekKey {
    fn parse(week: &str) -> Self {
        if let Ok(n) = week.parse::<i64>() {
            return WeekKey::Number(n);
        }
        if let Ok(date) = NaiveDate::parse_from_str(week, "%Y-%m-%d") {
            return WeekKey::Date(date);
        }
        WeekKey::Text(week.to_string())
    }
}
