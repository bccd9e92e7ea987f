use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, MemberId, RecordId, UserId};

/// One user's seat in a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub group_id: GroupId,
    pub user_id: UserId,
    /// Rotation position, 1-based and unique within the group.
    pub payout_order: u32,
    pub has_received_payout: bool,
    pub joined_at: DateTime<Utc>,
}

/// Read-time payment state of a single contribution obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Paid,
    Pending,
    Overdue,
}

/// Status attached to a contribution for a period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    Pending,
    Paid,
    Overdue,
    /// Paid during the treasury window; held as buffer rather than rotated.
    Treasury,
}

impl ContributionStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, ContributionStatus::Paid | ContributionStatus::Treasury)
    }
}

impl From<PaymentState> for ContributionStatus {
    fn from(state: PaymentState) -> Self {
        match state {
            PaymentState::Paid => ContributionStatus::Paid,
            PaymentState::Pending => ContributionStatus::Pending,
            PaymentState::Overdue => ContributionStatus::Overdue,
        }
    }
}

impl std::fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContributionStatus::Pending => "pending",
            ContributionStatus::Paid => "paid",
            ContributionStatus::Overdue => "overdue",
            ContributionStatus::Treasury => "treasury",
        };
        f.write_str(label)
    }
}

/// A member's payment for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub id: RecordId,
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub user_id: UserId,
    /// 1-based period (month) of the group's schedule.
    pub period: u32,
    pub amount: u64,
    pub status: ContributionStatus,
    /// Transaction reference returned by the payment rail.
    pub payment_ref: String,
    pub recorded_at: DateTime<Utc>,
}

/// Amounts owed to the recipient at a payout position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    pub base_amount: u64,
    pub interest_amount: u64,
    pub total_amount: u64,
}

/// A payout made to the member at the head of the rotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEvent {
    pub id: RecordId,
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub user_id: UserId,
    pub payout_order: u32,
    pub breakdown: PayoutBreakdown,
    pub payment_ref: String,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_statuses() {
        assert!(ContributionStatus::Paid.is_settled());
        assert!(ContributionStatus::Treasury.is_settled());
        assert!(!ContributionStatus::Pending.is_settled());
        assert!(!ContributionStatus::Overdue.is_settled());
    }

    #[test]
    fn payment_state_maps_to_status() {
        assert_eq!(
            ContributionStatus::from(PaymentState::Overdue),
            ContributionStatus::Overdue
        );
        assert_eq!(
            serde_json::to_string(&ContributionStatus::Treasury).unwrap(),
            "\"treasury\""
        );
    }
}
