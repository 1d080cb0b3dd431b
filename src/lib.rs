pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hypotheses;
pub mod pipeline;
pub mod planner;

pub use config::AnalystConfig;
pub use dataset::{AdRecord, Dataset, Dimension};
pub use error::{AnalystError, Result};
pub use evaluation::{Evaluator, Procedure, ValidationDetails, ValidationResult, Verdict};
pub use hypotheses::{
    prioritize, Evidence, Hypothesis, HypothesisGenerator, Priority, ValidationMethod,
};
pub use pipeline::{AnalysisReport, Analyst};
pub use planner::Planner;
