//! Turns dataset aggregates into candidate hypotheses.
//!
//! Each hypothesis kind has a fixed id (H1..H5). When the data does not
//! support a kind it is omitted and the remaining ids keep their slots.

use indexmap::IndexMap;

use super::model::{
    AudienceStats, Evidence, Hypothesis, MessageFrequency, PlatformRoas, Priority,
    ValidationMethod,
};
use crate::config::AnalystConfig;
use crate::dataset::{AdRecord, Dataset};
use crate::evaluation::stats;

pub const TIME_DECAY_ID: &str = "H1";
pub const CREATIVE_TYPE_ID: &str = "H2";
pub const PLATFORM_ID: &str = "H3";
pub const MESSAGE_PATTERN_ID: &str = "H4";
pub const AUDIENCE_ID: &str = "H5";

pub struct HypothesisGenerator<'a> {
    config: &'a AnalystConfig,
}

impl<'a> HypothesisGenerator<'a> {
    pub fn new(config: &'a AnalystConfig) -> Self {
        Self { config }
    }

    /// Emit every hypothesis the dataset supports, in H1..H5 order.
    pub fn generate_hypotheses(&self, dataset: &Dataset) -> Vec<Hypothesis> {
        let candidates = [
            (TIME_DECAY_ID, self.time_decay(dataset)),
            (CREATIVE_TYPE_ID, self.creative_type(dataset)),
            (PLATFORM_ID, self.platform(dataset)),
            (MESSAGE_PATTERN_ID, self.message_pattern(dataset)),
            (AUDIENCE_ID, self.audience(dataset)),
        ];

        let mut hypotheses = Vec::with_capacity(candidates.len());
        for (id, candidate) in candidates {
            match candidate {
                Some(h) => hypotheses.push(h),
                None => tracing::warn!("[generator] {} omitted: data does not support it", id),
            }
        }
        tracing::info!(
            "[generator] Generated {} hypotheses from {} rows",
            hypotheses.len(),
            dataset.len()
        );
        hypotheses
    }

    fn time_decay(&self, dataset: &Dataset) -> Option<Hypothesis> {
        let settings = &self.config.time_decay;
        let flagged: Vec<_> = dataset
            .detect_time_decay(settings.window)
            .into_iter()
            .filter(|d| d.roas_change_pct < settings.decline_pct)
            .collect();
        if flagged.is_empty() {
            return None;
        }

        let declines: Vec<f64> = flagged.iter().map(|d| d.roas_change_pct).collect();
        let threshold = -settings.decline_pct;
        Some(Hypothesis {
            id: TIME_DECAY_ID.to_string(),
            statement: "Audience fatigue causing ROAS decline".to_string(),
            description: format!(
                "Found {} campaigns with >{}% ROAS decline over time",
                flagged.len(),
                threshold
            ),
            evidence: Evidence::TimeDecay {
                campaigns_affected: flagged
                    .iter()
                    .take(settings.max_campaigns_reported)
                    .map(|d| d.campaign.clone())
                    .collect(),
                flagged_campaigns: flagged.len(),
                avg_decline_pct: stats::mean(&declines),
            },
            priority: Priority::High,
            validation_method: ValidationMethod::TimeSeriesRegression,
        })
    }

    fn creative_type(&self, dataset: &Dataset) -> Option<Hypothesis> {
        let perf = dataset.creative_performance();
        let best = perf.first()?;
        let worst = perf.last()?;
        Some(Hypothesis {
            id: CREATIVE_TYPE_ID.to_string(),
            statement: "Creative type impacts ROAS significantly".to_string(),
            description: format!("{} outperforms {}", best.key, worst.key),
            evidence: Evidence::CreativeType {
                best_creative_type: best.key.clone(),
                best_roas: best.mean_roas,
                worst_creative_type: worst.key.clone(),
                worst_roas: worst.mean_roas,
                roas_difference: best.mean_roas - worst.mean_roas,
            },
            priority: Priority::High,
            validation_method: ValidationMethod::AnovaTest,
        })
    }

    fn platform(&self, dataset: &Dataset) -> Option<Hypothesis> {
        let mut platforms: Vec<PlatformRoas> = dataset
            .platform_comparison()
            .into_iter()
            .map(|g| PlatformRoas {
                platform: g.key,
                roas: g.mean_roas,
            })
            .collect();
        if platforms.len() < 2 {
            return None;
        }
        platforms.sort_by(|a, b| b.roas.total_cmp(&a.roas));

        let best = platforms.first()?.platform.clone();
        let worst = platforms.last()?.platform.clone();
        Some(Hypothesis {
            id: PLATFORM_ID.to_string(),
            statement: "Platform choice affects ROAS".to_string(),
            description: format!("{best} has better ROAS than {worst}"),
            evidence: Evidence::Platform { platforms },
            priority: Priority::Medium,
            validation_method: ValidationMethod::TTest,
        })
    }

    fn message_pattern(&self, dataset: &Dataset) -> Option<Hypothesis> {
        let segments = dataset.segment_by_performance(&self.config.thresholds);
        let low_ctr = &segments.low_ctr;
        if low_ctr.is_empty() {
            return None;
        }

        let ctrs: Vec<f64> = low_ctr.iter().map(|r| r.ctr).collect();
        Some(Hypothesis {
            id: MESSAGE_PATTERN_ID.to_string(),
            statement: "Low CTR linked to specific message patterns".to_string(),
            description: format!("{} ads have CTR below threshold", low_ctr.len()),
            evidence: Evidence::MessagePattern {
                low_ctr_count: low_ctr.len(),
                avg_ctr: stats::mean(&ctrs),
                common_messages: most_common_messages(
                    low_ctr,
                    self.config.message_analysis.top_messages,
                ),
            },
            priority: Priority::High,
            validation_method: ValidationMethod::MessageAnalysis,
        })
    }

    fn audience(&self, dataset: &Dataset) -> Option<Hypothesis> {
        let audience_stats: Vec<AudienceStats> = dataset
            .audience_performance()
            .into_iter()
            .map(|g| AudienceStats {
                audience_type: g.key,
                roas: g.mean_roas,
                ctr: g.mean_ctr,
                spend: g.total_spend,
            })
            .collect();
        if audience_stats.is_empty() {
            return None;
        }
        Some(Hypothesis {
            id: AUDIENCE_ID.to_string(),
            statement: "Audience type affects performance differently".to_string(),
            description: "Different audience segments show varying engagement levels".to_string(),
            evidence: Evidence::AudienceSegments { audience_stats },
            priority: Priority::Medium,
            validation_method: ValidationMethod::SegmentationAnalysis,
        })
    }
}

/// Most frequent messages, count descending; equal counts keep first appearance.
fn most_common_messages(rows: &[&AdRecord], limit: usize) -> Vec<MessageFrequency> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for r in rows {
        *counts.entry(r.creative_message.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(message, count)| MessageFrequency {
            message: message.to_string(),
            count,
        })
        .collect()
}
