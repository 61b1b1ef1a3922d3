//! Reporting utilities: batch statistics and formatted terminal output.

use crate::domain::Estimate;
use crate::error::CpdResult;

pub mod format;

pub use format::*;

/// Aggregate counts and Zb range over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub ok: usize,
    pub failed: usize,
    /// `(min, max, mean)` of Zb over successful locations.
    pub zb_range: Option<(f64, f64, f64)>,
}

impl BatchSummary {
    pub fn from_results(results: &[CpdResult<Estimate>]) -> Self {
        let zbs: Vec<f64> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|e| e.curie.zb)
            .collect();
        let zb_range = if zbs.is_empty() {
            None
        } else {
            let min = zbs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = zbs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = zbs.iter().sum::<f64>() / zbs.len() as f64;
            Some((min, max, mean))
        };
        Self {
            ok: zbs.len(),
            failed: results.len() - zbs.len(),
            zb_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CpdError;

    #[test]
    fn empty_batch_has_no_range() {
        let results: Vec<CpdResult<Estimate>> = vec![Err(CpdError::InvalidWindow("x".to_string()))];
        let s = BatchSummary::from_results(&results);
        assert_eq!((s.ok, s.failed), (0, 1));
        assert!(s.zb_range.is_none());
    }
}
