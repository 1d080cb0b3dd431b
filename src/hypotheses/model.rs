use serde::{Deserialize, Serialize};

use crate::dataset::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: HIGH < MEDIUM < LOW.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// Statistical procedure a hypothesis asks to be validated with.
///
/// Serializes as the bare method name. Names outside the known set survive a
/// round trip as [`ValidationMethod::Unrecognized`] and resolve to the
/// not-implemented result at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationMethod {
    TimeSeriesRegression,
    AnovaTest,
    TTest,
    MessageAnalysis,
    SegmentationAnalysis,
    Unrecognized(String),
}

impl ValidationMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationMethod::TimeSeriesRegression => "time_series_regression",
            ValidationMethod::AnovaTest => "anova_test",
            ValidationMethod::TTest => "t_test",
            ValidationMethod::MessageAnalysis => "message_analysis",
            ValidationMethod::SegmentationAnalysis => "segmentation_analysis",
            ValidationMethod::Unrecognized(name) => name,
        }
    }
}

impl From<&str> for ValidationMethod {
    fn from(name: &str) -> Self {
        match name {
            "time_series_regression" => ValidationMethod::TimeSeriesRegression,
            "anova_test" => ValidationMethod::AnovaTest,
            "t_test" => ValidationMethod::TTest,
            "message_analysis" => ValidationMethod::MessageAnalysis,
            "segmentation_analysis" => ValidationMethod::SegmentationAnalysis,
            other => ValidationMethod::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for ValidationMethod {
    fn from(name: String) -> Self {
        ValidationMethod::from(name.as_str())
    }
}

impl From<ValidationMethod> for String {
    fn from(method: ValidationMethod) -> Self {
        match method {
            ValidationMethod::Unrecognized(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRoas {
    pub platform: String,
    pub roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageFrequency {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceStats {
    pub audience_type: String,
    pub roas: f64,
    pub ctr: f64,
    pub spend: f64,
}

/// Aggregated figures backing a hypothesis, one shape per hypothesis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    TimeDecay {
        /// Up to the configured number of flagged campaigns, first-encountered order.
        campaigns_affected: Vec<String>,
        flagged_campaigns: usize,
        /// Mean decline over every flagged campaign, not just the listed ones.
        avg_decline_pct: f64,
    },
    CreativeType {
        best_creative_type: String,
        best_roas: f64,
        worst_creative_type: String,
        worst_roas: f64,
        /// Best minus worst, signed.
        roas_difference: f64,
    },
    Platform {
        /// Sorted by roas, highest first.
        platforms: Vec<PlatformRoas>,
    },
    MessagePattern {
        low_ctr_count: usize,
        avg_ctr: f64,
        common_messages: Vec<MessageFrequency>,
    },
    AudienceSegments {
        audience_stats: Vec<AudienceStats>,
    },
    /// Free-form evidence on hypotheses supplied from outside the generator.
    Other {
        #[serde(default)]
        fields: serde_json::Map<String, serde_json::Value>,
    },
}

impl Evidence {
    /// The grouping column an ANOVA over this evidence should partition by.
    pub fn anova_dimension(&self) -> Dimension {
        match self {
            Evidence::AudienceSegments { .. } => Dimension::AudienceType,
            _ => Dimension::CreativeType,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: String,
    #[serde(alias = "hypothesis")]
    pub statement: String,
    pub description: String,
    pub evidence: Evidence,
    pub priority: Priority,
    pub validation_method: ValidationMethod,
}

/// Stable sort by priority rank; equal priorities keep their input order.
pub fn prioritize(mut hypotheses: Vec<Hypothesis>) -> Vec<Hypothesis> {
    hypotheses.sort_by_key(|h| h.priority.rank());
    hypotheses
}
