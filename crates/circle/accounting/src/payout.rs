//! Payout amounts.
//!
//! `base = monthly_amount * total_members`. Positions inside the treasury
//! window earn no interest; later positions earn
//! `round(base * rate * (position - window) / normalization)`.
//!
//! The rate is held in basis points and the whole computation runs in
//! integers, rounding halves up.

use circle_types::{AccountingConfig, Group, PayoutBreakdown};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 7% expressed in basis points.
pub const DEFAULT_INTEREST_RATE_BPS: u32 = 700;

/// Positions past the window per full rate step.
pub const DEFAULT_INTEREST_NORMALIZATION: u32 = 10;

const BPS_DENOMINATOR: u128 = 10_000;

/// Computes payout breakdowns under a fixed rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoutCalculator {
    interest_rate_bps: u32,
    interest_normalization: u32,
}

impl PayoutCalculator {
    /// `interest_normalization` of zero is treated as one.
    pub fn new(interest_rate_bps: u32, interest_normalization: u32) -> Self {
        Self {
            interest_rate_bps,
            interest_normalization: interest_normalization.max(1),
        }
    }

    pub fn from_config(config: &AccountingConfig) -> Self {
        Self::new(config.interest_rate_bps, config.interest_normalization)
    }

    pub fn interest_rate_bps(&self) -> u32 {
        self.interest_rate_bps
    }

    /// Interest owed on `base_amount` at `payout_position`.
    ///
    /// Growth is linear in the position with no upper bound.
    pub fn interest(&self, base_amount: u64, payout_position: u32, treasury_window: u32) -> u64 {
        if payout_position <= treasury_window {
            return 0;
        }

        let steps = u128::from(payout_position - treasury_window);
        let numerator = u128::from(base_amount) * u128::from(self.interest_rate_bps) * steps;
        let denominator = BPS_DENOMINATOR * u128::from(self.interest_normalization);
        let rounded = (2 * numerator + denominator) / (2 * denominator);

        u64::try_from(rounded).unwrap_or(u64::MAX)
    }

    /// Breakdown for one payout position.
    pub fn quote(
        &self,
        monthly_amount: u64,
        total_members: u32,
        payout_position: u32,
        treasury_window: u32,
    ) -> PayoutBreakdown {
        let base_amount = monthly_amount.saturating_mul(u64::from(total_members));
        let interest_amount = self.interest(base_amount, payout_position, treasury_window);
        let breakdown = PayoutBreakdown {
            base_amount,
            interest_amount,
            total_amount: base_amount.saturating_add(interest_amount),
        };

        debug!(
            monthly_amount,
            total_members,
            payout_position,
            treasury_window,
            base = breakdown.base_amount,
            interest = breakdown.interest_amount,
            "Computed payout"
        );

        breakdown
    }

    /// Breakdown for `payout_position` using the group's current size and window.
    pub fn quote_for_group(&self, group: &Group, payout_position: u32) -> PayoutBreakdown {
        self.quote(
            group.monthly_amount,
            group.current_members,
            payout_position,
            group.treasury_window,
        )
    }

    /// Breakdowns for every position `1..=total_members`, in rotation order.
    pub fn schedule(
        &self,
        monthly_amount: u64,
        total_members: u32,
        treasury_window: u32,
    ) -> Vec<PayoutBreakdown> {
        (1..=total_members)
            .map(|position| self.quote(monthly_amount, total_members, position, treasury_window))
            .collect()
    }
}

impl Default for PayoutCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_INTEREST_RATE_BPS, DEFAULT_INTEREST_NORMALIZATION)
    }
}

/// Payout breakdown under the default 7% rate.
pub fn calculate_payout(
    monthly_amount: u64,
    total_members: u32,
    payout_position: u32,
    treasury_protected_positions: u32,
) -> PayoutBreakdown {
    PayoutCalculator::default().quote(
        monthly_amount,
        total_members,
        payout_position,
        treasury_protected_positions,
    )
}

/// Sums over a rotation schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationTotals {
    pub positions: u32,
    pub base_amount: u64,
    pub interest_amount: u64,
    pub total_amount: u64,
}

impl RotationTotals {
    pub fn from_schedule(schedule: &[PayoutBreakdown]) -> Self {
        schedule.iter().fold(Self::default(), |acc, b| Self {
            positions: acc.positions + 1,
            base_amount: acc.base_amount.saturating_add(b.base_amount),
            interest_amount: acc.interest_amount.saturating_add(b.interest_amount),
            total_amount: acc.total_amount.saturating_add(b.total_amount),
        })
    }
}
