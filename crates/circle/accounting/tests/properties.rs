//! Property tests for the payout, admission and status rules.

use chrono::{Duration, NaiveDate};
use circle_accounting::*;
use circle_types::PaymentState;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_monthly() -> impl Strategy<Value = u64> {
    1u64..1_000_000_000
}

fn arb_group_size() -> impl Strategy<Value = u32> {
    1u32..=50
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
    })
}

// ---------------------------------------------------------------------------
// Payout
// ---------------------------------------------------------------------------

proptest! {
    /// Positions inside the treasury window never earn interest.
    #[test]
    fn no_interest_inside_window(
        monthly in arb_monthly(),
        members in arb_group_size(),
        window in 1u32..=50,
        position_seed in any::<u32>(),
    ) {
        let position = 1 + position_seed % window;
        let b = calculate_payout(monthly, members, position, window);
        prop_assert_eq!(b.interest_amount, 0);
    }

    /// Identical inputs give identical breakdowns.
    #[test]
    fn payout_is_deterministic(
        monthly in arb_monthly(),
        members in arb_group_size(),
        position in 1u32..=200,
        window in 0u32..=50,
    ) {
        let first = calculate_payout(monthly, members, position, window);
        let second = calculate_payout(monthly, members, position, window);
        prop_assert_eq!(first, second);
    }

    /// Total is always base plus interest.
    #[test]
    fn total_is_base_plus_interest(
        monthly in arb_monthly(),
        members in arb_group_size(),
        position in 1u32..=200,
        window in 0u32..=50,
    ) {
        let b = calculate_payout(monthly, members, position, window);
        prop_assert_eq!(b.base_amount, monthly * u64::from(members));
        prop_assert_eq!(b.total_amount, b.base_amount + b.interest_amount);
    }

    /// Later positions never earn less than earlier ones.
    #[test]
    fn interest_is_monotonic_in_position(
        monthly in arb_monthly(),
        members in arb_group_size(),
        position in 1u32..=199,
        window in 0u32..=50,
    ) {
        let earlier = calculate_payout(monthly, members, position, window);
        let later = calculate_payout(monthly, members, position + 1, window);
        prop_assert!(later.interest_amount >= earlier.interest_amount);
    }
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

proptest! {
    /// A group at capacity never admits a newcomer.
    #[test]
    fn full_group_never_admits(max in 1u32..=50) {
        prop_assert_eq!(
            check_capacity(max, max, false),
            AdmissionDecision::Reject(RejectReason::Full)
        );
    }

    /// Existing members are refused regardless of capacity.
    #[test]
    fn duplicates_always_rejected(current in 0u32..=60, max in 1u32..=50) {
        prop_assert_eq!(
            check_capacity(current, max, true),
            AdmissionDecision::Reject(RejectReason::Duplicate)
        );
    }

    /// Admission hands out the next contiguous order.
    #[test]
    fn admitted_order_is_next_slot(max in 1u32..=50, seed in any::<u32>()) {
        let current = seed % max;
        prop_assert_eq!(check_capacity(current, max, false).payout_order(), Some(current + 1));
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

proptest! {
    /// Paid always wins; otherwise overdue exactly when past due.
    #[test]
    fn classification_is_total(due in arb_date(), today in arb_date(), paid in any::<bool>()) {
        let state = classify(due, today, paid);
        let expected = if paid {
            PaymentState::Paid
        } else if today > due {
            PaymentState::Overdue
        } else {
            PaymentState::Pending
        };
        prop_assert_eq!(state, expected);
    }
}

#[test]
fn concrete_payout_scenarios() {
    let third = calculate_payout(100, 10, 3, 2);
    assert_eq!(
        (third.base_amount, third.interest_amount, third.total_amount),
        (1000, 7, 1007)
    );

    let first = calculate_payout(100, 10, 1, 2);
    assert_eq!((first.interest_amount, first.total_amount), (0, 1000));
}

#[test]
fn concrete_full_group_scenario() {
    assert_eq!(
        check_capacity(5, 5, false),
        AdmissionDecision::Reject(RejectReason::Full)
    );
}
