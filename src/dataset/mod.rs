//! Immutable advertising dataset snapshot and the derived views the core reads.
//!
//! A [`Dataset`] is built once per run and never mutated. Segment and
//! aggregate views borrow from it or copy out plain numbers; nothing here
//! writes back into the snapshot.

pub mod aggregation;
pub mod record;
pub mod segments;

use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{AnalystError, Result};
use crate::evaluation::stats;

pub use aggregation::{CampaignDecay, GroupStats};
pub use record::AdRecord;
pub use segments::PerformanceSegments;

/// Grouping columns of an [`AdRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Campaign,
    CreativeType,
    Platform,
    AudienceType,
    Country,
}

impl Dimension {
    pub fn value_of<'a>(&self, record: &'a AdRecord) -> &'a str {
        match self {
            Dimension::Campaign => &record.campaign_name,
            Dimension::CreativeType => &record.creative_type,
            Dimension::Platform => &record.platform,
            Dimension::AudienceType => &record.audience_type,
            Dimension::Country => &record.country,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Campaign => "campaign",
            Dimension::CreativeType => "creative_type",
            Dimension::Platform => "platform",
            Dimension::AudienceType => "audience_type",
            Dimension::Country => "country",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryMetrics {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub avg_ctr: f64,
    pub avg_roas: f64,
    pub median_roas: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryDimensions {
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    pub creative_types: Vec<String>,
    pub audience_types: Vec<String>,
}

/// Headline numbers for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub date_range: DateRange,
    pub metrics: SummaryMetrics,
    pub unique_campaigns: usize,
    pub unique_adsets: usize,
    pub dimensions: SummaryDimensions,
}

/// Read-only snapshot of advertising rows. Always holds at least one row.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AdRecord>,
}

impl Dataset {
    /// Build a snapshot, rejecting empty input and non-finite metrics.
    pub fn new(records: Vec<AdRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(AnalystError::EmptyDataset(
                "dataset contains no rows".to_string(),
            ));
        }
        for (i, r) in records.iter().enumerate() {
            if let Some(field) = r.non_finite_field() {
                return Err(AnalystError::InvalidRecord {
                    row: i + 1,
                    reason: format!("{field} is not a finite number"),
                });
            }
        }
        Ok(Self { records })
    }

    /// Parse rows from a JSON array or from JSON Lines (one object per line).
    pub fn from_json_str(input: &str) -> Result<Self> {
        let trimmed = input.trim_start();
        if trimmed.starts_with('[') {
            let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
            let records = values
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    serde_json::from_value(value).map_err(|e| AnalystError::InvalidRecord {
                        row: i + 1,
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<AdRecord>>>()?;
            return Self::new(records);
        }
        Self::from_json_lines(input.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::info!(
            "[dataset] Loaded {} rows from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    fn from_json_lines<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AdRecord =
                serde_json::from_str(&line).map_err(|e| AnalystError::InvalidRecord {
                    row: i + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }
        Self::new(records)
    }

    pub fn records(&self) -> &[AdRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed dataset; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a dimension in first-encountered order.
    pub fn distinct(&self, dimension: Dimension) -> Vec<String> {
        self.records
            .iter()
            .map(|r| dimension.value_of(r))
            .collect::<IndexSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Roas values of every row, grouped by `dimension` in key order.
    pub fn roas_by(&self, dimension: Dimension) -> Vec<(String, Vec<f64>)> {
        let mut groups: std::collections::BTreeMap<&str, Vec<f64>> =
            std::collections::BTreeMap::new();
        for r in &self.records {
            groups.entry(dimension.value_of(r)).or_default().push(r.roas);
        }
        groups
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Roas values of one campaign in chronological order (stable for equal dates).
    pub fn roas_series(&self, campaign: &str) -> Vec<f64> {
        let mut rows: Vec<&AdRecord> = self
            .records
            .iter()
            .filter(|r| r.campaign_name == campaign)
            .collect();
        rows.sort_by_key(|r| r.date);
        rows.into_iter().map(|r| r.roas).collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        let roas: Vec<f64> = self.records.iter().map(|r| r.roas).collect();
        let ctr: Vec<f64> = self.records.iter().map(|r| r.ctr).collect();

        // Non-empty by construction.
        let first = self.records[0].date;
        let (start, end) = self
            .records
            .iter()
            .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date)));

        DatasetSummary {
            total_rows: self.records.len(),
            date_range: DateRange {
                start,
                end,
                days: (end - start).num_days(),
            },
            metrics: SummaryMetrics {
                total_spend: self.records.iter().map(|r| r.spend).sum(),
                total_revenue: self.records.iter().map(|r| r.revenue).sum(),
                total_impressions: self.records.iter().map(|r| r.impressions).sum(),
                total_clicks: self.records.iter().map(|r| r.clicks).sum(),
                avg_ctr: stats::mean(&ctr),
                avg_roas: stats::mean(&roas),
                median_roas: stats::median(&roas),
            },
            unique_campaigns: self.distinct(Dimension::Campaign).len(),
            unique_adsets: self
                .records
                .iter()
                .map(|r| r.adset_name.as_str())
                .collect::<IndexSet<&str>>()
                .len(),
            dimensions: SummaryDimensions {
                platforms: self.distinct(Dimension::Platform),
                countries: self.distinct(Dimension::Country),
                creative_types: self.distinct(Dimension::CreativeType),
                audience_types: self.distinct(Dimension::AudienceType),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Row builder for unit tests; everything not passed is a fixed filler value.
    #[allow(clippy::too_many_arguments)]
    pub fn row(
        date: &str,
        campaign: &str,
        platform: &str,
        creative_type: &str,
        audience_type: &str,
        message: &str,
        ctr: f64,
        roas: f64,
    ) -> AdRecord {
        AdRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            campaign_name: campaign.to_string(),
            adset_name: format!("{campaign} / {audience_type}"),
            platform: platform.to_string(),
            country: "US".to_string(),
            creative_type: creative_type.to_string(),
            creative_message: message.to_string(),
            audience_type: audience_type.to_string(),
            spend: 100.0,
            revenue: 100.0 * roas,
            impressions: 10_000,
            clicks: (10_000.0 * ctr) as u64,
            purchases: 3,
            ctr,
            roas,
        }
    }
}
