pub mod generator;
pub mod model;

pub use generator::HypothesisGenerator;
pub use model::{
    prioritize, AudienceStats, Evidence, Hypothesis, MessageFrequency, PlatformRoas, Priority,
    ValidationMethod,
};
