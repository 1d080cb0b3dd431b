use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalystError, Result};

fn default_low_ctr() -> f64 {
    0.013
}

fn default_low_roas() -> f64 {
    2.0
}

fn default_confidence_min() -> f64 {
    0.6
}

fn default_significance_level() -> f64 {
    0.05
}

fn default_window() -> usize {
    7
}

fn default_decline_pct() -> f64 {
    -20.0
}

fn default_slope_cutoff() -> f64 {
    -0.01
}

fn default_max_campaigns_reported() -> usize {
    5
}

fn default_max_campaigns_evaluated() -> usize {
    3
}

fn default_min_observations() -> usize {
    5
}

fn default_min_length_difference() -> f64 {
    10.0
}

fn default_confidence_scale() -> f64 {
    50.0
}

fn default_top_messages() -> usize {
    3
}

fn default_equal_variance() -> bool {
    true
}

/// Segment boundaries. Rows strictly below a threshold fall in the "low" segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    #[serde(default = "default_low_ctr")]
    pub low_ctr: f64,
    #[serde(default = "default_low_roas")]
    pub low_roas: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_ctr: default_low_ctr(),
            low_roas: default_low_roas(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeDecaySettings {
    /// Trailing rolling-mean window, in observations.
    #[serde(default = "default_window")]
    pub window: usize,
    /// A campaign is flagged when its first-to-last roas change is strictly below this percentage.
    #[serde(default = "default_decline_pct")]
    pub decline_pct: f64,
    /// Regression slope strictly below this marks a campaign as declining.
    #[serde(default = "default_slope_cutoff")]
    pub slope_cutoff: f64,
    #[serde(default = "default_max_campaigns_reported")]
    pub max_campaigns_reported: usize,
    #[serde(default = "default_max_campaigns_evaluated")]
    pub max_campaigns_evaluated: usize,
    /// The regression runs only on campaigns with strictly more observations than this.
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

impl Default for TimeDecaySettings {
    fn default() -> Self {
        Self {
            window: default_window(),
            decline_pct: default_decline_pct(),
            slope_cutoff: default_slope_cutoff(),
            max_campaigns_reported: default_max_campaigns_reported(),
            max_campaigns_evaluated: default_max_campaigns_evaluated(),
            min_observations: default_min_observations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageAnalysisSettings {
    /// Mean message length gap (characters) strictly above which the pattern is validated.
    #[serde(default = "default_min_length_difference")]
    pub min_length_difference: f64,
    /// Confidence is `min(difference / confidence_scale, 1.0)`.
    #[serde(default = "default_confidence_scale")]
    pub confidence_scale: f64,
    #[serde(default = "default_top_messages")]
    pub top_messages: usize,
}

impl Default for MessageAnalysisSettings {
    fn default() -> Self {
        Self {
            min_length_difference: default_min_length_difference(),
            confidence_scale: default_confidence_scale(),
            top_messages: default_top_messages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TTestSettings {
    /// Pooled-variance Student t-test when true, Welch's t-test otherwise.
    #[serde(default = "default_equal_variance")]
    pub equal_variance: bool,
}

impl Default for TTestSettings {
    fn default() -> Self {
        Self {
            equal_variance: default_equal_variance(),
        }
    }
}

/// Settings that drive hypothesis generation and validation.
///
/// Every field is optional on disk; missing keys take the defaults below.
///
/// ```yaml
/// thresholds:
///   low_ctr: 0.013
///   low_roas: 2.0
/// confidence_min: 0.6
/// significance_level: 0.05
/// time_decay:
///   window: 7
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalystConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Minimum confidence for the time-decay verdict.
    #[serde(default = "default_confidence_min")]
    pub confidence_min: f64,
    /// Alpha for the ANOVA and t-test verdicts.
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,
    #[serde(default)]
    pub time_decay: TimeDecaySettings,
    #[serde(default)]
    pub message_analysis: MessageAnalysisSettings,
    #[serde(default)]
    pub t_test: TTestSettings,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            confidence_min: default_confidence_min(),
            significance_level: default_significance_level(),
            time_decay: TimeDecaySettings::default(),
            message_analysis: MessageAnalysisSettings::default(),
            t_test: TTestSettings::default(),
        }
    }
}

impl AnalystConfig {
    /// Load and validate a config file. The format is chosen by extension:
    /// `.json`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config: AnalystConfig = match ext.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(path, e))?,
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(path, e))?
            }
            _ => {
                return Err(AnalystError::Config(format!(
                    "unsupported config format for {} (expected .json, .yaml or .yml)",
                    path.display()
                )))
            }
        };
        config.validate()?;
        tracing::info!(
            "[config] Loaded {}: low_ctr={}, confidence_min={}, significance_level={}",
            path.display(),
            config.thresholds.low_ctr,
            config.confidence_min,
            config.significance_level
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| -> Result<()> {
            if !(0.0..=1.0).contains(&v) {
                return Err(AnalystError::Config(format!(
                    "{name} must be in [0.0, 1.0], got {v}"
                )));
            }
            Ok(())
        };
        unit("thresholds.low_ctr", self.thresholds.low_ctr)?;
        unit("confidence_min", self.confidence_min)?;

        if !self.thresholds.low_roas.is_finite() || self.thresholds.low_roas < 0.0 {
            return Err(AnalystError::Config(format!(
                "thresholds.low_roas must be a non-negative number, got {}",
                self.thresholds.low_roas
            )));
        }
        if self.significance_level <= 0.0 || self.significance_level >= 1.0 {
            return Err(AnalystError::Config(format!(
                "significance_level must be in (0.0, 1.0) exclusive, got {}",
                self.significance_level
            )));
        }
        if self.time_decay.window == 0 {
            return Err(AnalystError::Config(
                "time_decay.window must be at least 1".to_string(),
            ));
        }
        if self.time_decay.max_campaigns_reported == 0
            || self.time_decay.max_campaigns_evaluated == 0
        {
            return Err(AnalystError::Config(
                "time_decay campaign limits must be at least 1".to_string(),
            ));
        }
        if !self.time_decay.decline_pct.is_finite() || !self.time_decay.slope_cutoff.is_finite() {
            return Err(AnalystError::Config(
                "time_decay cutoffs must be finite".to_string(),
            ));
        }
        if !(self.message_analysis.confidence_scale > 0.0) {
            return Err(AnalystError::Config(format!(
                "message_analysis.confidence_scale must be positive, got {}",
                self.message_analysis.confidence_scale
            )));
        }
        if !(self.message_analysis.min_length_difference >= 0.0) {
            return Err(AnalystError::Config(format!(
                "message_analysis.min_length_difference must be non-negative, got {}",
                self.message_analysis.min_length_difference
            )));
        }
        Ok(())
    }
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> AnalystError {
    AnalystError::Config(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AnalystConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = AnalystConfig::default();
        assert_eq!(c.thresholds.low_ctr, 0.013);
        assert_eq!(c.thresholds.low_roas, 2.0);
        assert_eq!(c.confidence_min, 0.6);
        assert_eq!(c.significance_level, 0.05);
        assert_eq!(c.time_decay.window, 7);
        assert_eq!(c.time_decay.decline_pct, -20.0);
        assert_eq!(c.time_decay.slope_cutoff, -0.01);
        assert_eq!(c.time_decay.max_campaigns_reported, 5);
        assert_eq!(c.time_decay.max_campaigns_evaluated, 3);
        assert_eq!(c.time_decay.min_observations, 5);
        assert_eq!(c.message_analysis.min_length_difference, 10.0);
        assert_eq!(c.message_analysis.confidence_scale, 50.0);
        assert_eq!(c.message_analysis.top_messages, 3);
        assert!(c.t_test.equal_variance);
    }

    #[test]
    fn empty_json_object_takes_all_defaults() {
        let c: AnalystConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, AnalystConfig::default());
    }

    #[test]
    fn partial_nested_section_keeps_sibling_defaults() {
        let c: AnalystConfig =
            serde_json::from_str(r#"{"thresholds": {"low_ctr": 0.02}}"#).unwrap();
        assert_eq!(c.thresholds.low_ctr, 0.02);
        assert_eq!(c.thresholds.low_roas, 2.0);
    }

    #[test]
    fn load_yaml_file() {
        let f = write_temp(
            ".yaml",
            "thresholds:\n  low_ctr: 0.01\nconfidence_min: 0.7\ntime_decay:\n  window: 3\n",
        );
        let c = AnalystConfig::load(f.path()).unwrap();
        assert_eq!(c.thresholds.low_ctr, 0.01);
        assert_eq!(c.confidence_min, 0.7);
        assert_eq!(c.time_decay.window, 3);
        assert_eq!(c.time_decay.slope_cutoff, -0.01);
    }

    #[test]
    fn load_json_file() {
        let f = write_temp(".json", r#"{"significance_level": 0.01}"#);
        let c = AnalystConfig::load(f.path()).unwrap();
        assert_eq!(c.significance_level, 0.01);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let f = write_temp(".toml", "confidence_min = 0.5");
        let err = AnalystConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
    }

    #[test]
    fn load_malformed_json_is_config_error() {
        let f = write_temp(".json", r#"{"confidence_min": "#);
        let err = AnalystConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn load_malformed_yaml_is_config_error() {
        let f = write_temp(".yml", "thresholds: [unclosed");
        let err = AnalystConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
        assert!(err.to_string().contains(".yml"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AnalystConfig::load(Path::new("/nonexistent/adlens.yaml")).unwrap_err();
        assert!(matches!(err, AnalystError::Io(_)));
    }

    #[test]
    fn load_validates_after_parsing() {
        let f = write_temp(".yaml", "confidence_min: 1.5\n");
        let err = AnalystConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
    }

    #[test]
    fn validate_rejects_significance_zero_and_one() {
        let mut c = AnalystConfig::default();
        c.significance_level = 0.0;
        assert!(c.validate().is_err());
        c.significance_level = 1.0;
        assert!(c.validate().is_err());
        c.significance_level = 0.1;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let mut c = AnalystConfig::default();
        c.time_decay.window = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_confidence_scale() {
        let mut c = AnalystConfig::default();
        c.message_analysis.confidence_scale = 0.0;
        assert!(c.validate().is_err());
        c.message_analysis.confidence_scale = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_low_roas() {
        let mut c = AnalystConfig::default();
        c.thresholds.low_roas = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_campaign_limits() {
        let mut c = AnalystConfig::default();
        c.time_decay.max_campaigns_evaluated = 0;
        assert!(c.validate().is_err());
    }
}
