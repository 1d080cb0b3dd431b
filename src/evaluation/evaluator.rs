//! Hypothesis validation: dispatches each hypothesis to the statistical
//! procedure its `validation_method` names and turns the outcome into a
//! [`ValidationResult`].
//!
//! Procedures only read the dataset snapshot and the hypothesis evidence.
//! Unmet preconditions (too few groups, too few observations, wrong platform
//! count, empty segments) resolve to [`Verdict::InsufficientEvidence`] with
//! zero confidence instead of an error.

use super::result::{CampaignTrend, Procedure, ValidationDetails, ValidationResult, Verdict};
use super::stats::{self, clamp_unit};
use crate::config::AnalystConfig;
use crate::dataset::{segments::mean_message_len, Dataset, Dimension};
use crate::hypotheses::{Evidence, Hypothesis, ValidationMethod};

pub struct Evaluator<'a> {
    dataset: &'a Dataset,
    config: &'a AnalystConfig,
    results: Vec<ValidationResult>,
}

impl<'a> Evaluator<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a AnalystConfig) -> Self {
        Self {
            dataset,
            config,
            results: Vec::new(),
        }
    }

    /// Validate one hypothesis. Pure: the same hypothesis and dataset always
    /// produce the same result.
    pub fn validate_hypothesis(&self, hypothesis: &Hypothesis) -> ValidationResult {
        match &hypothesis.validation_method {
            ValidationMethod::TimeSeriesRegression => self.validate_time_decay(hypothesis),
            ValidationMethod::AnovaTest => {
                self.validate_anova(hypothesis, hypothesis.evidence.anova_dimension())
            }
            ValidationMethod::TTest => self.validate_platform_difference(hypothesis),
            ValidationMethod::MessageAnalysis => self.validate_message_pattern(hypothesis),
            ValidationMethod::SegmentationAnalysis => {
                self.validate_anova(hypothesis, Dimension::AudienceType)
            }
            ValidationMethod::Unrecognized(name) => not_implemented(hypothesis, name),
        }
    }

    /// Validate every hypothesis in input order. Replaces the results of any
    /// previous batch.
    pub fn evaluate_all(&mut self, hypotheses: &[Hypothesis]) -> &[ValidationResult] {
        let results: Vec<ValidationResult> = hypotheses
            .iter()
            .map(|h| {
                let result = self.validate_hypothesis(h);
                let status = if result.validated {
                    "VALIDATED"
                } else {
                    "REJECTED"
                };
                tracing::info!(
                    "[evaluator] {} - {}: {} (confidence: {:.2}, verdict: {:?})",
                    status,
                    h.id,
                    h.statement,
                    result.confidence,
                    result.verdict
                );
                result
            })
            .collect();

        let validated = results.iter().filter(|r| r.validated).count();
        tracing::info!(
            "[evaluator] Evaluated {} hypotheses, {} validated",
            results.len(),
            validated
        );
        self.results = results;
        &self.results
    }

    /// Validated results of the most recent [`evaluate_all`](Self::evaluate_all), in order.
    pub fn get_validated_insights(&self) -> Vec<ValidationResult> {
        self.results.iter().filter(|r| r.validated).cloned().collect()
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    // ── Time decay ──────────────────────────────────────────────────

    fn validate_time_decay(&self, hypothesis: &Hypothesis) -> ValidationResult {
        let settings = &self.config.time_decay;
        let mut campaigns = Vec::new();
        let mut skipped = Vec::new();

        for campaign in campaigns_affected(&hypothesis.evidence)
            .into_iter()
            .take(settings.max_campaigns_evaluated)
        {
            let series = self.dataset.roas_series(&campaign);
            let fit = if series.len() > settings.min_observations {
                stats::ordinary_least_squares(&series)
            } else {
                None
            };
            match fit {
                Some(fit) => {
                    tracing::debug!(
                        "[evaluator] {} trend for {}: slope={:.4}, r2={:.3}, n={}",
                        hypothesis.id,
                        campaign,
                        fit.slope,
                        fit.r_squared,
                        series.len()
                    );
                    campaigns.push(CampaignTrend {
                        campaign,
                        observations: series.len(),
                        slope: fit.slope,
                        intercept: fit.intercept,
                        r_squared: fit.r_squared,
                        declining: fit.slope < settings.slope_cutoff,
                    });
                }
                None => skipped.push(campaign),
            }
        }

        let declining = campaigns.iter().filter(|c| c.declining).count();
        let evaluated = campaigns.len();
        let confidence = stats::safe_div(declining as f64, evaluated as f64);
        let verdict = if evaluated == 0 {
            Verdict::InsufficientEvidence
        } else if confidence > self.config.confidence_min {
            Verdict::Supported
        } else {
            Verdict::Rejected
        };

        ValidationResult::new(
            &hypothesis.id,
            Procedure::LinearRegression,
            verdict,
            confidence,
            ValidationDetails::TimeDecay {
                campaigns,
                skipped,
                declining,
                confidence_min: self.config.confidence_min,
            },
            format!("Time decay detected in {declining}/{evaluated} campaigns"),
        )
    }

    // ── ANOVA (creative type, audience) ─────────────────────────────

    fn validate_anova(&self, hypothesis: &Hypothesis, dimension: Dimension) -> ValidationResult {
        let alpha = self.config.significance_level;
        let groups: Vec<Vec<f64>> = self
            .dataset
            .roas_by(dimension)
            .into_iter()
            .map(|(_, roas)| roas)
            .collect();
        let group_count = groups.len();

        let anova = if group_count >= 2 {
            stats::one_way_anova(&groups)
        } else {
            None
        };

        let (verdict, confidence, f_statistic, p_value) = match anova {
            Some(a) if a.p_value < alpha => (
                Verdict::Supported,
                1.0 - a.p_value,
                Some(a.f_statistic),
                a.p_value,
            ),
            Some(a) => (Verdict::Rejected, 0.0, Some(a.f_statistic), a.p_value),
            None => (Verdict::InsufficientEvidence, 0.0, None, 1.0),
        };
        tracing::debug!(
            "[evaluator] {} anova by {}: groups={}, f={:?}, p={:.6}",
            hypothesis.id,
            dimension.as_str(),
            group_count,
            f_statistic,
            p_value
        );

        let supported = verdict.is_supported();
        let conclusion = match dimension {
            Dimension::AudienceType => format!(
                "Audience segments show {} performance variation",
                if supported { "significant" } else { "no significant" }
            ),
            _ => format!(
                "Creative type {} impact ROAS",
                if supported {
                    "significantly"
                } else {
                    "does not significantly"
                }
            ),
        };

        ValidationResult::new(
            &hypothesis.id,
            Procedure::Anova,
            verdict,
            confidence,
            ValidationDetails::Anova {
                dimension,
                group_count,
                f_statistic: f_statistic.filter(|f| f.is_finite()),
                p_value,
                significance_level: alpha,
            },
            conclusion,
        )
    }

    // ── T-test (platform) ───────────────────────────────────────────

    fn validate_platform_difference(&self, hypothesis: &Hypothesis) -> ValidationResult {
        let alpha = self.config.significance_level;
        let equal_variance = self.config.t_test.equal_variance;
        let platforms = self.dataset.distinct(Dimension::Platform);

        let test = match platforms.as_slice() {
            [first, second] => {
                let roas_of = |platform: &str| -> Vec<f64> {
                    self.dataset
                        .records()
                        .iter()
                        .filter(|r| r.platform == platform)
                        .map(|r| r.roas)
                        .collect()
                };
                stats::two_sample_t_test(&roas_of(first), &roas_of(second), equal_variance)
            }
            _ => None,
        };

        let (verdict, confidence, p_value) = match test {
            Some(t) if t.p_value < alpha => (Verdict::Supported, 1.0 - t.p_value, t.p_value),
            Some(t) => (Verdict::Rejected, 0.0, t.p_value),
            None => (Verdict::InsufficientEvidence, 0.0, 1.0),
        };
        tracing::debug!(
            "[evaluator] {} t-test over {:?}: t={:?}, p={:.6}",
            hypothesis.id,
            platforms,
            test.map(|t| t.t_statistic),
            p_value
        );

        ValidationResult::new(
            &hypothesis.id,
            Procedure::TTest,
            verdict,
            confidence,
            ValidationDetails::TTest {
                platforms,
                t_statistic: test.map(|t| t.t_statistic).filter(|t| t.is_finite()),
                p_value,
                degrees_of_freedom: test.map(|t| t.degrees_of_freedom),
                equal_variance,
                significance_level: alpha,
            },
            format!(
                "Platform difference {} statistically significant",
                if verdict.is_supported() { "is" } else { "is not" }
            ),
        )
    }

    // ── Message length ──────────────────────────────────────────────

    fn validate_message_pattern(&self, hypothesis: &Hypothesis) -> ValidationResult {
        let settings = &self.config.message_analysis;
        let segments = self.dataset.segment_by_performance(&self.config.thresholds);
        let low = mean_message_len(&segments.low_ctr);
        let high = mean_message_len(&segments.high_ctr);

        let (verdict, difference, confidence) = match (low, high) {
            (Some(low), Some(high)) => {
                let difference = (low - high).abs();
                let confidence = (difference / settings.confidence_scale).min(1.0);
                let verdict = if difference > settings.min_length_difference {
                    Verdict::Supported
                } else {
                    Verdict::Rejected
                };
                (verdict, difference, confidence)
            }
            _ => (Verdict::InsufficientEvidence, 0.0, 0.0),
        };
        tracing::debug!(
            "[evaluator] {} message length: low={:?}, high={:?}, diff={:.2}",
            hypothesis.id,
            low,
            high,
            difference
        );

        ValidationResult::new(
            &hypothesis.id,
            Procedure::MessageAnalysis,
            verdict,
            clamp_unit(confidence),
            ValidationDetails::MessageLength {
                low_ctr_avg_msg_length: low,
                high_ctr_avg_msg_length: high,
                difference,
            },
            format!(
                "Message patterns show {} correlation with CTR",
                if verdict.is_supported() { "notable" } else { "minimal" }
            ),
        )
    }
}

fn not_implemented(hypothesis: &Hypothesis, method: &str) -> ValidationResult {
    tracing::warn!(
        "[evaluator] {} requests unknown method '{}'",
        hypothesis.id,
        method
    );
    ValidationResult::new(
        &hypothesis.id,
        Procedure::None,
        Verdict::NotImplemented,
        0.0,
        ValidationDetails::Unimplemented {
            requested_method: method.to_string(),
        },
        "Validation method not implemented".to_string(),
    )
}

/// Campaign names a time-decay validation should examine. Externally supplied
/// hypotheses may carry them as a `campaigns_affected` string array.
fn campaigns_affected(evidence: &Evidence) -> Vec<String> {
    match evidence {
        Evidence::TimeDecay {
            campaigns_affected, ..
        } => campaigns_affected.clone(),
        Evidence::Other { fields } => fields
            .get("campaigns_affected")
            .and_then(|v| v.as_array())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
