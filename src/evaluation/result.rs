use serde::{Deserialize, Serialize};

use super::stats::clamp_unit;
use crate::dataset::Dimension;

/// Procedure that actually ran for a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    LinearRegression,
    Anova,
    TTest,
    MessageAnalysis,
    None,
}

/// Outcome class of a validation.
///
/// `Rejected` is a computed negative result. `InsufficientEvidence` means the
/// procedure's preconditions did not hold and `NotImplemented` means the
/// hypothesis named a method with no procedure behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    Rejected,
    InsufficientEvidence,
    NotImplemented,
}

impl Verdict {
    pub fn is_supported(self) -> bool {
        self == Verdict::Supported
    }
}

/// Regression of one campaign's roas against observation index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTrend {
    pub campaign: String,
    pub observations: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub declining: bool,
}

/// Method-specific statistics attached to a [`ValidationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationDetails {
    TimeDecay {
        /// Campaigns that had enough observations to be fitted.
        campaigns: Vec<CampaignTrend>,
        /// Campaigns named by the hypothesis but skipped for too few observations.
        skipped: Vec<String>,
        declining: usize,
        confidence_min: f64,
    },
    Anova {
        dimension: Dimension,
        group_count: usize,
        /// Absent when the test did not run or the statistic is unbounded.
        f_statistic: Option<f64>,
        p_value: f64,
        significance_level: f64,
    },
    TTest {
        platforms: Vec<String>,
        t_statistic: Option<f64>,
        p_value: f64,
        degrees_of_freedom: Option<f64>,
        equal_variance: bool,
        significance_level: f64,
    },
    MessageLength {
        low_ctr_avg_msg_length: Option<f64>,
        high_ctr_avg_msg_length: Option<f64>,
        difference: f64,
    },
    Unimplemented {
        requested_method: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub hypothesis_id: String,
    pub validated: bool,
    pub confidence: f64,
    pub method: Procedure,
    pub verdict: Verdict,
    pub details: ValidationDetails,
    pub conclusion: String,
}

impl ValidationResult {
    /// `validated` follows the verdict. Confidence is clamped into [0, 1] and
    /// forced to 0 when the procedure could not run.
    pub fn new(
        hypothesis_id: &str,
        method: Procedure,
        verdict: Verdict,
        confidence: f64,
        details: ValidationDetails,
        conclusion: String,
    ) -> Self {
        let confidence = match verdict {
            Verdict::InsufficientEvidence | Verdict::NotImplemented => 0.0,
            _ => clamp_unit(confidence),
        };
        Self {
            hypothesis_id: hypothesis_id.to_string(),
            validated: verdict.is_supported(),
            confidence,
            method,
            verdict,
            details,
            conclusion,
        }
    }
}
