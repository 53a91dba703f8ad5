//! # Settlement Calculator
//!
//! Computes the closing financial figures of a work order:
//!
//! - `accounting_period`: `MM/YYYY` of the delivery date (UTC).
//! - `savings_percent`: `(budget − procurement) / budget × 100`, signed,
//!   kept at full decimal precision. A zero budget yields `0`. Operator
//!   output rounds it with [`SettlementCalculator::display_savings`].
//! - `final_cost`: the procurement cost.
//!
//! The calculator is pure. Applying a settlement to a record (phase guard,
//! completion stamp, history) is [`crate::LifecycleEngine::finalize`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use wo_core::{AccountingPeriod, Timestamp};

use crate::error::LifecycleError;
use crate::record::Settlement;

/// Decimal places shown when a savings figure is reported.
pub const SAVINGS_SCALE: u32 = 2;

/// Caller-supplied figures for [`crate::LifecycleEngine::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInput {
    pub engineering_cost: Decimal,
    pub procurement_cost: Decimal,
    /// Delivery instant; the engine clock's "now" when absent.
    #[serde(default)]
    pub delivered_at: Option<Timestamp>,
    #[serde(default)]
    pub justification: Option<String>,
}

impl SettlementInput {
    pub fn new(engineering_cost: Decimal, procurement_cost: Decimal) -> Self {
        Self {
            engineering_cost,
            procurement_cost,
            delivered_at: None,
            justification: None,
        }
    }

    pub fn delivered_at(mut self, at: Timestamp) -> Self {
        self.delivered_at = Some(at);
        self
    }

    pub fn justification(mut self, text: impl Into<String>) -> Self {
        self.justification = Some(text.into());
        self
    }
}

/// Stateless settlement math.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Compute the settlement for a work order with the given `budget`.
    ///
    /// `now` is used as the delivery instant when the input has none.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidInput`] when either cost is negative.
    pub fn compute(
        budget: Decimal,
        input: &SettlementInput,
        now: Timestamp,
    ) -> Result<Settlement, LifecycleError> {
        if input.engineering_cost < Decimal::ZERO {
            return Err(LifecycleError::input(
                "engineering_cost",
                format!("must be >= 0, got {}", input.engineering_cost),
            ));
        }
        if input.procurement_cost < Decimal::ZERO {
            return Err(LifecycleError::input(
                "procurement_cost",
                format!("must be >= 0, got {}", input.procurement_cost),
            ));
        }

        let delivered_at = input.delivered_at.unwrap_or(now);
        let close_justification = input
            .justification
            .as_deref()
            .map(str::trim)
            .filter(|j| !j.is_empty())
            .map(str::to_string);

        Ok(Settlement {
            engineering_cost: input.engineering_cost,
            procurement_cost: input.procurement_cost,
            final_cost: input.procurement_cost,
            savings_percent: Self::savings_percent(budget, input.procurement_cost)?,
            accounting_period: AccountingPeriod::containing(&delivered_at),
            actual_delivered_at: delivered_at,
            close_justification,
        })
    }

    /// Signed savings of `procurement` against `budget`, in percent.
    ///
    /// Non-positive budgets have no meaningful baseline and yield `0`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidInput`] when the ratio leaves the decimal
    /// range (a vanishing budget against an enormous procurement cost).
    pub fn savings_percent(
        budget: Decimal,
        procurement: Decimal,
    ) -> Result<Decimal, LifecycleError> {
        if budget <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        budget
            .checked_sub(procurement)
            .and_then(|diff| diff.checked_div(budget))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.normalize())
            .ok_or_else(|| {
                LifecycleError::input(
                    "procurement_cost",
                    format!(
                        "savings ratio of {procurement} against budget {budget} is out of range"
                    ),
                )
            })
    }

    /// A stored savings figure rounded for display: [`SAVINGS_SCALE`]
    /// places, midpoint away from zero.
    pub fn display_savings(pct: Decimal) -> Decimal {
        pct.round_dp_with_strategy(SAVINGS_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn delivered(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_ymd(y, m, d).unwrap()
    }

    fn pct(budget: Decimal, procurement: Decimal) -> Decimal {
        SettlementCalculator::savings_percent(budget, procurement).unwrap()
    }

    #[test]
    fn under_budget_is_positive() {
        assert_eq!(pct(dec!(10000), dec!(8500)), dec!(15));
    }

    #[test]
    fn overrun_is_negative() {
        assert_eq!(pct(dec!(10000), dec!(11000)), dec!(-10));
    }

    #[test]
    fn zero_budget_is_zero_savings() {
        assert_eq!(pct(Decimal::ZERO, dec!(0)), Decimal::ZERO);
        assert_eq!(pct(Decimal::ZERO, dec!(999.99)), Decimal::ZERO);
    }

    #[test]
    fn exact_budget_is_zero_savings() {
        assert_eq!(pct(dec!(5000), dec!(5000)), Decimal::ZERO);
    }

    #[test]
    fn repeating_fraction_keeps_full_precision() {
        // (3 - 2) / 3 * 100 = 33.333...
        let third = pct(dec!(3), dec!(2));
        assert!(third.scale() > SAVINGS_SCALE, "stored figure was rounded: {third}");
        assert!((third - dec!(33.333333333)).abs() < dec!(0.000000001));
        assert_eq!(SettlementCalculator::display_savings(third), dec!(33.33));

        // (3 - 1) / 3 * 100 = 66.666...
        let two_thirds = pct(dec!(3), dec!(1));
        assert_eq!(SettlementCalculator::display_savings(two_thirds), dec!(66.67));
        let overrun = pct(dec!(3), dec!(5));
        assert_eq!(SettlementCalculator::display_savings(overrun), dec!(-66.67));
    }

    #[test]
    fn display_rounds_midpoint_away_from_zero() {
        assert_eq!(SettlementCalculator::display_savings(dec!(12.345)), dec!(12.35));
        assert_eq!(SettlementCalculator::display_savings(dec!(-12.345)), dec!(-12.35));
        assert_eq!(SettlementCalculator::display_savings(dec!(22)), dec!(22));
    }

    #[test]
    fn free_procurement_is_full_savings() {
        assert_eq!(pct(dec!(800), Decimal::ZERO), dec!(100));
    }

    #[test]
    fn overflowing_ratio_is_input_error() {
        let tiny = dec!(0.0000000000000000000000000001);
        let err = SettlementCalculator::savings_percent(tiny, Decimal::MAX).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn compute_fills_every_field() {
        let input = SettlementInput::new(dec!(42000), dec!(39000))
            .delivered_at(delivered(2025, 2, 20))
            .justification("scope reduced");
        let s = SettlementCalculator::compute(dec!(50000), &input, delivered(2030, 1, 1)).unwrap();
        assert_eq!(s.engineering_cost, dec!(42000));
        assert_eq!(s.procurement_cost, dec!(39000));
        assert_eq!(s.final_cost, dec!(39000));
        assert_eq!(s.savings_percent, dec!(22));
        assert_eq!(s.accounting_period.to_string(), "02/2025");
        assert_eq!(s.actual_delivered_at, delivered(2025, 2, 20));
        assert_eq!(s.close_justification.as_deref(), Some("scope reduced"));
    }

    #[test]
    fn compute_defaults_delivery_to_now() {
        let input = SettlementInput::new(dec!(1), dec!(1));
        let now = delivered(2025, 11, 1);
        let s = SettlementCalculator::compute(dec!(1), &input, now).unwrap();
        assert_eq!(s.actual_delivered_at, now);
        assert_eq!(s.accounting_period.to_string(), "11/2025");
    }

    #[test]
    fn blank_justification_is_dropped() {
        let input = SettlementInput::new(dec!(1), dec!(1)).justification("   ");
        let s = SettlementCalculator::compute(dec!(1), &input, delivered(2025, 1, 1)).unwrap();
        assert!(s.close_justification.is_none());
    }

    #[test]
    fn negative_costs_rejected() {
        let now = delivered(2025, 1, 1);
        let input = SettlementInput::new(dec!(-1), dec!(1));
        let err = SettlementCalculator::compute(dec!(10), &input, now).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidInput { field: "engineering_cost", .. }));
        let input = SettlementInput::new(dec!(1), dec!(-0.01));
        let err = SettlementCalculator::compute(dec!(10), &input, now).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidInput { field: "procurement_cost", .. }));
    }

    #[test]
    fn negative_zero_cost_is_accepted() {
        let now = delivered(2025, 1, 1);
        let neg_zero = -Decimal::ZERO;
        let input = SettlementInput::new(neg_zero, neg_zero);
        assert!(SettlementCalculator::compute(dec!(10), &input, now).is_ok());
    }
}
