use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One advertising performance row.
///
/// Field names follow the upstream export columns so a row serializes to the
/// same shape it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub date: NaiveDate,
    pub campaign_name: String,
    pub adset_name: String,
    pub platform: String,
    pub country: String,
    pub creative_type: String,
    pub creative_message: String,
    pub audience_type: String,
    pub spend: f64,
    pub revenue: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub purchases: u64,
    pub ctr: f64,
    pub roas: f64,
}

impl AdRecord {
    /// Returns the name of the first numeric field that is NaN or infinite.
    pub(crate) fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("spend", self.spend),
            ("revenue", self.revenue),
            ("ctr", self.ctr),
            ("roas", self.roas),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Message length in characters, not bytes.
    pub fn message_len(&self) -> usize {
        self.creative_message.chars().count()
    }
}
