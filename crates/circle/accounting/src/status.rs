//! Contribution status projection.
//!
//! Status is recomputed on every read from the authoritative `paid` flag and
//! the calendar; it is never the source of truth.

use chrono::{Months, NaiveDate};
use circle_types::{ContributionStatus, PaymentState};

/// Paid, pending, or overdue.
pub fn classify(due_date: NaiveDate, current_date: NaiveDate, paid: bool) -> PaymentState {
    if paid {
        PaymentState::Paid
    } else if current_date > due_date {
        PaymentState::Overdue
    } else {
        PaymentState::Pending
    }
}

/// Status of a period's contribution, including the treasury status for
/// paid periods inside the treasury window.
pub fn contribution_status(
    period: u32,
    treasury_window: u32,
    due_date: NaiveDate,
    current_date: NaiveDate,
    paid: bool,
) -> ContributionStatus {
    match classify(due_date, current_date, paid) {
        PaymentState::Paid if in_treasury_window(period, treasury_window) => {
            ContributionStatus::Treasury
        }
        state => state.into(),
    }
}

/// Whether a 1-based period falls inside the treasury window.
pub fn in_treasury_window(period: u32, treasury_window: u32) -> bool {
    period >= 1 && period <= treasury_window
}

/// Due date of a 1-based period: the first due date advanced by `period - 1`
/// calendar months, clamped to the end of shorter months.
///
/// Returns `None` for period zero or a date out of range.
pub fn due_date(first_due_date: NaiveDate, period: u32) -> Option<NaiveDate> {
    let offset = period.checked_sub(1)?;
    first_due_date.checked_add_months(Months::new(offset))
}

/// Whether an unpaid contribution is close enough to its due date to remind
/// the member. Overdue contributions are not reminders.
pub fn reminder_due(
    due_date: NaiveDate,
    current_date: NaiveDate,
    lead_days: u32,
    paid: bool,
) -> bool {
    if paid || current_date > due_date {
        return false;
    }
    (due_date - current_date).num_days() <= i64::from(lead_days)
}
