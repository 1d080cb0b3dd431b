use super::{AdRecord, Dataset};
use crate::config::Thresholds;
use crate::evaluation::stats;

/// Low/high performance partitions of a dataset. Rows keep dataset order.
#[derive(Debug, Clone)]
pub struct PerformanceSegments<'a> {
    pub low_ctr: Vec<&'a AdRecord>,
    pub high_ctr: Vec<&'a AdRecord>,
    pub low_roas: Vec<&'a AdRecord>,
    pub high_roas: Vec<&'a AdRecord>,
}

impl Dataset {
    /// Split rows at the configured thresholds: `ctr < low_ctr` is low ctr,
    /// `roas < low_roas` is low roas, everything else is high.
    pub fn segment_by_performance(&self, thresholds: &Thresholds) -> PerformanceSegments<'_> {
        let (low_ctr, high_ctr) = self
            .records()
            .iter()
            .partition(|r| r.ctr < thresholds.low_ctr);
        let (low_roas, high_roas) = self
            .records()
            .iter()
            .partition(|r| r.roas < thresholds.low_roas);
        PerformanceSegments {
            low_ctr,
            high_ctr,
            low_roas,
            high_roas,
        }
    }
}

/// Mean creative-message length in characters. `None` for an empty segment.
pub fn mean_message_len(rows: &[&AdRecord]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let lens: Vec<f64> = rows.iter().map(|r| r.message_len() as f64).collect();
    Some(stats::mean(&lens))
}
