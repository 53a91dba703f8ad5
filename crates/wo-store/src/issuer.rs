//! Sequential work-order numbering.
//!
//! Issues `"{cost_center}-{sequence}"` with a per-cost-center counter,
//! zero-padded to the configured width. Numbers are never reused: a number
//! handed out for a request that later fails to persist is simply skipped.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use wo_core::{CostCenterId, WorkOrderNumber};
use wo_state::{IssuerError, NumberIssuer};

use crate::config::DEFAULT_NUMBER_WIDTH;

#[derive(Debug)]
pub struct SequentialNumberIssuer {
    width: usize,
    counters: Mutex<BTreeMap<i64, u64>>,
}

impl Default for SequentialNumberIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_WIDTH)
    }
}

impl SequentialNumberIssuer {
    /// `width` is clamped to 1–9 digits.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.clamp(1, 9),
            counters: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resume from previously exported counters.
    pub fn with_counters(width: usize, counters: BTreeMap<i64, u64>) -> Self {
        let issuer = Self::new(width);
        *issuer.counters.lock() = counters;
        issuer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Last sequence issued per cost center.
    pub fn counters(&self) -> BTreeMap<i64, u64> {
        self.counters.lock().clone()
    }

    fn capacity(&self) -> u64 {
        10u64.pow(self.width as u32) - 1
    }
}

impl NumberIssuer for SequentialNumberIssuer {
    fn issue_number(&self, cost_center: CostCenterId) -> Result<WorkOrderNumber, IssuerError> {
        if cost_center.value() <= 0 {
            return Err(IssuerError::Rejected {
                cost_center,
                reason: "cost center identifiers are positive".into(),
            });
        }

        let mut counters = self.counters.lock();
        let last = counters.entry(cost_center.value()).or_insert(0);
        if *last >= self.capacity() {
            return Err(IssuerError::Exhausted(cost_center));
        }
        *last += 1;
        let seq = *last;
        drop(counters);

        WorkOrderNumber::new(format!(
            "{}-{:0width$}",
            cost_center.value(),
            seq,
            width = self.width
        ))
        .map_err(|e| IssuerError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn sequences_are_per_cost_center() {
        let issuer = SequentialNumberIssuer::new(4);
        let a1 = issuer.issue_number(CostCenterId(12)).unwrap();
        let a2 = issuer.issue_number(CostCenterId(12)).unwrap();
        let b1 = issuer.issue_number(CostCenterId(7)).unwrap();
        assert_eq!(a1.as_str(), "12-0001");
        assert_eq!(a2.as_str(), "12-0002");
        assert_eq!(b1.as_str(), "7-0001");
        assert_eq!(issuer.counters(), BTreeMap::from([(7, 1), (12, 2)]));
    }

    #[test]
    fn exhaustion_is_reported() {
        let issuer = SequentialNumberIssuer::new(1);
        for _ in 0..9 {
            issuer.issue_number(CostCenterId(3)).unwrap();
        }
        assert_eq!(
            issuer.issue_number(CostCenterId(3)),
            Err(IssuerError::Exhausted(CostCenterId(3)))
        );
        assert_eq!(issuer.issue_number(CostCenterId(4)).unwrap().as_str(), "4-1");
    }

    #[test]
    fn non_positive_cost_center_rejected() {
        let issuer = SequentialNumberIssuer::default();
        assert!(matches!(
            issuer.issue_number(CostCenterId(0)),
            Err(IssuerError::Rejected { .. })
        ));
        assert!(issuer.counters().is_empty());
    }

    #[test]
    fn resumes_from_counters() {
        let issuer = SequentialNumberIssuer::with_counters(4, BTreeMap::from([(5, 41)]));
        assert_eq!(issuer.issue_number(CostCenterId(5)).unwrap().as_str(), "5-0042");
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(SequentialNumberIssuer::new(0).width(), 1);
        assert_eq!(SequentialNumberIssuer::new(40).width(), 9);
    }

    #[test]
    fn concurrent_issuance_never_duplicates() {
        let issuer = Arc::new(SequentialNumberIssuer::new(4));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let issuer = Arc::clone(&issuer);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| issuer.issue_number(CostCenterId(1)).unwrap().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
