use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalystConfig;
use crate::dataset::{Dataset, DatasetSummary};
use crate::evaluation::{Evaluator, ValidationResult};
use crate::hypotheses::{Hypothesis, HypothesisGenerator};
use crate::planner::{AnalysisTask, Planner};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    pub tasks: Vec<AnalysisTask>,
    pub summary: DatasetSummary,
    /// Generation order (H1..H5 minus omitted kinds).
    pub hypotheses: Vec<Hypothesis>,
    /// One per hypothesis, same order.
    pub validations: Vec<ValidationResult>,
    pub validated_insights: Vec<ValidationResult>,
}

/// Single-pass orchestrator: plan, summarize, generate, evaluate.
pub struct Analyst {
    config: AnalystConfig,
}

impl Analyst {
    pub fn new(config: AnalystConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn run(&self, query: &str, dataset: &Dataset) -> AnalysisReport {
        let run_id = Uuid::new_v4();
        tracing::info!("[pipeline] Run {} started: '{}'", run_id, query);

        let tasks = Planner::parse_query(query);
        let summary = dataset.summary();
        tracing::info!(
            "[pipeline] Dataset {} to {}: spend={:.2}, revenue={:.2}, avg_roas={:.2}, avg_ctr={:.4}",
            summary.date_range.start,
            summary.date_range.end,
            summary.metrics.total_spend,
            summary.metrics.total_revenue,
            summary.metrics.avg_roas,
            summary.metrics.avg_ctr
        );

        let hypotheses = HypothesisGenerator::new(&self.config).generate_hypotheses(dataset);

        let mut evaluator = Evaluator::new(dataset, &self.config);
        let validations = evaluator.evaluate_all(&hypotheses).to_vec();
        let validated_insights = evaluator.get_validated_insights();

        tracing::info!(
            "[pipeline] Run {} finished: {} hypotheses, {} validated",
            run_id,
            hypotheses.len(),
            validated_insights.len()
        );

        AnalysisReport {
            run_id,
            generated_at: Utc::now(),
            query: query.to_string(),
            tasks,
            summary,
            hypotheses,
            validations,
            validated_insights,
        }
    }
}
