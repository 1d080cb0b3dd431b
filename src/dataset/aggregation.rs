//! Per-dimension and per-campaign aggregates over a [`Dataset`].
//!
//! Pure computation over the borrowed snapshot; rates are computed with
//! zero-safe division so an empty or zero-spend group never produces NaN.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{AdRecord, Dataset, Dimension};
use crate::evaluation::stats::{self, safe_div};

/// Aggregate metrics for one value of a grouping dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub rows: usize,
    pub mean_ctr: f64,
    pub mean_roas: f64,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    /// `revenue / spend - 1`, 0.0 when the group has no spend.
    pub roi: f64,
}

fn build_group_stats(key: &str, rows: &[&AdRecord]) -> GroupStats {
    let ctrs: Vec<f64> = rows.iter().map(|r| r.ctr).collect();
    let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
    let total_spend: f64 = rows.iter().map(|r| r.spend).sum();
    let total_revenue: f64 = rows.iter().map(|r| r.revenue).sum();
    let roi = if total_spend == 0.0 {
        0.0
    } else {
        total_revenue / total_spend - 1.0
    };

    GroupStats {
        key: key.to_string(),
        rows: rows.len(),
        mean_ctr: stats::mean(&ctrs),
        mean_roas: stats::mean(&roas),
        total_spend,
        total_revenue,
        total_clicks: rows.iter().map(|r| r.clicks).sum(),
        total_impressions: rows.iter().map(|r| r.impressions).sum(),
        roi,
    }
}

/// Trend summary for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDecay {
    pub campaign: String,
    pub observations: usize,
    pub roas_first: f64,
    pub roas_last: f64,
    pub roas_mean: f64,
    /// Last value of the trailing rolling mean of roas.
    pub roas_rolling_last: f64,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    /// `(last - first) / first * 100`; 0.0 when the first observation is zero.
    pub roas_change_pct: f64,
}

impl Dataset {
    /// Group rows by `dimension`, ordered by key.
    pub fn group_stats(&self, dimension: Dimension) -> Vec<GroupStats> {
        let mut groups: BTreeMap<&str, Vec<&AdRecord>> = BTreeMap::new();
        for r in self.records() {
            groups.entry(dimension.value_of(r)).or_default().push(r);
        }
        groups
            .iter()
            .map(|(key, rows)| build_group_stats(key, rows))
            .collect()
    }

    /// Creative-type groups, best mean roas first (stable on ties).
    pub fn creative_performance(&self) -> Vec<GroupStats> {
        let mut stats = self.group_stats(Dimension::CreativeType);
        stats.sort_by(|a, b| b.mean_roas.total_cmp(&a.mean_roas));
        stats
    }

    pub fn platform_comparison(&self) -> Vec<GroupStats> {
        self.group_stats(Dimension::Platform)
    }

    pub fn audience_performance(&self) -> Vec<GroupStats> {
        self.group_stats(Dimension::AudienceType)
    }

    /// Per-campaign roas trend, campaigns in first-encountered order.
    pub fn detect_time_decay(&self, window: usize) -> Vec<CampaignDecay> {
        let mut by_campaign: IndexMap<&str, Vec<&AdRecord>> = IndexMap::new();
        for r in self.records() {
            by_campaign.entry(r.campaign_name.as_str()).or_default().push(r);
        }

        by_campaign
            .into_iter()
            .filter_map(|(campaign, mut rows)| {
                rows.sort_by_key(|r| r.date);
                let first = *rows.first()?;
                let last = *rows.last()?;
                let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
                let rolling = stats::rolling_mean(&roas, window);

                Some(CampaignDecay {
                    campaign: campaign.to_string(),
                    observations: rows.len(),
                    roas_first: first.roas,
                    roas_last: last.roas,
                    roas_mean: stats::mean(&roas),
                    roas_rolling_last: rolling.last().copied().unwrap_or(0.0),
                    date_start: first.date,
                    date_end: last.date,
                    roas_change_pct: safe_div(last.roas - first.roas, first.roas) * 100.0,
                })
            })
            .collect()
    }
}
