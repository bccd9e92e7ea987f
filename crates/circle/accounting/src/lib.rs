//! # circle-accounting
//!
//! The domain rules of a rotating savings circle, as pure functions:
//!
//! - **Admission**: capacity, duplicate, secret-code and community checks;
//!   an admitted member takes payout order `current_members + 1`
//! - **Payout**: base pot plus position-dependent interest, zero inside the
//!   treasury window
//! - **Status**: paid/pending/overdue projection of a contribution, plus the
//!   treasury status for periods inside the window and due-date reminders
//! - **Lifecycle**: group status transitions after joins and payouts
//! - **Treasury**: balance reconciliation from recorded contributions and payouts
//!
//! Nothing here touches storage. Callers read state from the membership store,
//! ask these functions for a decision or an amount, and persist the result.

#![deny(unsafe_code)]

pub mod admission;
pub mod error;
pub mod lifecycle;
pub mod payout;
pub mod status;
pub mod treasury;

pub use admission::{
    check_capacity, evaluate_admission, verify_credentials, AdmissionDecision, RejectReason,
};
pub use error::{AdmissionError, LifecycleError};
pub use payout::{calculate_payout, PayoutCalculator, RotationTotals};
pub use status::{classify, contribution_status, due_date, in_treasury_window, reminder_due};
pub use treasury::TreasurySnapshot;
