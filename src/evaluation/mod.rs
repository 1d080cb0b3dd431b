pub mod evaluator;
pub mod result;
pub mod stats;

pub use evaluator::Evaluator;
pub use result::{CampaignTrend, Procedure, ValidationDetails, ValidationResult, Verdict};
