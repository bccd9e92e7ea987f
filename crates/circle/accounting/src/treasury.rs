use circle_types::{ContributionRecord, ContributionStatus, PayoutEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Treasury position projected from recorded contributions and payouts.
///
/// The balance is replayed from the records on every call and never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    /// Contributions paid inside the treasury window.
    pub treasury_inflow: u64,
    /// Contributions paid after the treasury window.
    pub rotation_inflow: u64,
    pub base_paid_out: u64,
    pub interest_paid_out: u64,
    pub contributions: usize,
    pub payouts: usize,
}

impl TreasurySnapshot {
    pub fn reconcile(contributions: &[ContributionRecord], payouts: &[PayoutEvent]) -> Self {
        let mut snapshot = Self::default();

        for record in contributions {
            match record.status {
                ContributionStatus::Treasury => {
                    snapshot.treasury_inflow = snapshot.treasury_inflow.saturating_add(record.amount)
                }
                ContributionStatus::Paid => {
                    snapshot.rotation_inflow = snapshot.rotation_inflow.saturating_add(record.amount)
                }
                ContributionStatus::Pending | ContributionStatus::Overdue => continue,
            }
            snapshot.contributions += 1;
        }

        for payout in payouts {
            snapshot.base_paid_out = snapshot
                .base_paid_out
                .saturating_add(payout.breakdown.base_amount);
            snapshot.interest_paid_out = snapshot
                .interest_paid_out
                .saturating_add(payout.breakdown.interest_amount);
            snapshot.payouts += 1;
        }

        debug!(
            treasury_inflow = snapshot.treasury_inflow,
            rotation_inflow = snapshot.rotation_inflow,
            paid_out = snapshot.total_paid_out(),
            balance = %snapshot.balance(),
            "Treasury reconciled"
        );

        snapshot
    }

    pub fn total_inflow(&self) -> u64 {
        self.treasury_inflow.saturating_add(self.rotation_inflow)
    }

    pub fn total_paid_out(&self) -> u64 {
        self.base_paid_out.saturating_add(self.interest_paid_out)
    }

    /// Inflow minus outflow; negative when payouts exceeded contributions.
    pub fn balance(&self) -> i128 {
        i128::from(self.total_inflow()) - i128::from(self.total_paid_out())
    }

    pub fn is_solvent(&self) -> bool {
        self.balance() >= 0
    }

    /// Amount missing to fund a payout of `amount`; zero when fundable.
    pub fn shortfall_for(&self, amount: u64) -> u64 {
        let missing = i128::from(amount) - self.balance();
        if missing <= 0 {
            0
        } else {
            u64::try_from(missing).unwrap_or(u64::MAX)
        }
    }

    pub fn can_fund(&self, amount: u64) -> bool {
        self.shortfall_for(amount) == 0
    }
}
