//! Group status transitions.

use circle_types::{Group, GroupStatus};

use crate::error::LifecycleError;

/// Status implied by membership alone.
pub fn capacity_status(current_members: u32, max_members: u32) -> GroupStatus {
    if current_members >= max_members {
        GroupStatus::Full
    } else {
        GroupStatus::Active
    }
}

/// Joins are refused while paused and after completion. A full group is
/// left to the admission check so the caller sees a capacity rejection.
pub fn ensure_accepting_joins(group: &Group) -> Result<(), LifecycleError> {
    match group.status {
        GroupStatus::Paused => Err(LifecycleError::Paused),
        GroupStatus::Completed => Err(LifecycleError::Completed),
        GroupStatus::Active | GroupStatus::Full => Ok(()),
    }
}

/// Contributions and payouts require a running rotation.
pub fn ensure_operational(group: &Group) -> Result<(), LifecycleError> {
    ensure_accepting_joins(group)
}

/// Payouts start once every seat is taken, so the pot size is fixed for
/// the whole rotation.
pub fn ensure_rotation_started(group: &Group) -> Result<(), LifecycleError> {
    match group.status {
        GroupStatus::Full => Ok(()),
        GroupStatus::Active => Err(LifecycleError::NotStarted {
            current_members: group.current_members,
            max_members: group.max_members,
        }),
        GroupStatus::Paused => Err(LifecycleError::Paused),
        GroupStatus::Completed => Err(LifecycleError::Completed),
    }
}

/// Payout order of the next recipient, if any position remains unpaid.
pub fn next_payout_order(group: &Group) -> Option<u32> {
    let next = group.current_cycle.checked_add(1)?;
    (next <= group.current_members).then_some(next)
}

/// Status once the payout for `completed_cycle` has been made.
pub fn status_after_payout(
    completed_cycle: u32,
    current_members: u32,
    max_members: u32,
) -> GroupStatus {
    if completed_cycle >= current_members {
        GroupStatus::Completed
    } else {
        capacity_status(current_members, max_members)
    }
}

pub fn pause(group: &Group) -> Result<GroupStatus, LifecycleError> {
    match group.status {
        GroupStatus::Active | GroupStatus::Full => Ok(GroupStatus::Paused),
        from => Err(LifecycleError::InvalidTransition {
            from,
            to: GroupStatus::Paused,
        }),
    }
}

/// Resuming restores whichever status the membership implies.
pub fn resume(group: &Group) -> Result<GroupStatus, LifecycleError> {
    let to = capacity_status(group.current_members, group.max_members);
    match group.status {
        GroupStatus::Paused => Ok(to),
        from => Err(LifecycleError::InvalidTransition { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use circle_types::{AccountingConfig, GroupDraft, GroupSettings, UserId};

    fn group(current: u32, max: u32, cycle: u32, status: GroupStatus) -> Group {
        let draft = GroupDraft::new(
            "Circle",
            GroupSettings::Public,
            50,
            max,
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        );
        let mut g = Group::from_draft(
            draft,
            UserId::generate(),
            &AccountingConfig::default(),
            Utc::now(),
        );
        g.current_members = current;
        g.current_cycle = cycle;
        g.status = status;
        g
    }

    #[test]
    fn full_when_capacity_reached() {
        assert_eq!(capacity_status(4, 5), GroupStatus::Active);
        assert_eq!(capacity_status(5, 5), GroupStatus::Full);
    }

    #[test]
    fn paused_and_completed_refuse_joins() {
        assert_eq!(
            ensure_accepting_joins(&group(3, 5, 0, GroupStatus::Paused)),
            Err(LifecycleError::Paused)
        );
        assert_eq!(
            ensure_accepting_joins(&group(5, 5, 5, GroupStatus::Completed)),
            Err(LifecycleError::Completed)
        );
        assert!(ensure_accepting_joins(&group(5, 5, 0, GroupStatus::Full)).is_ok());
    }

    #[test]
    fn rotation_waits_for_full_group() {
        assert_eq!(
            ensure_rotation_started(&group(1, 5, 0, GroupStatus::Active)),
            Err(LifecycleError::NotStarted {
                current_members: 1,
                max_members: 5
            })
        );
        assert!(ensure_rotation_started(&group(5, 5, 0, GroupStatus::Full)).is_ok());
        assert_eq!(
            ensure_rotation_started(&group(5, 5, 2, GroupStatus::Paused)),
            Err(LifecycleError::Paused)
        );
        assert_eq!(
            ensure_rotation_started(&group(5, 5, 5, GroupStatus::Completed)),
            Err(LifecycleError::Completed)
        );
    }

    #[test]
    fn next_order_follows_cycle() {
        assert_eq!(next_payout_order(&group(4, 5, 0, GroupStatus::Active)), Some(1));
        assert_eq!(next_payout_order(&group(4, 5, 3, GroupStatus::Active)), Some(4));
        assert_eq!(next_payout_order(&group(4, 5, 4, GroupStatus::Completed)), None);
    }

    #[test]
    fn completes_after_last_payout() {
        assert_eq!(status_after_payout(3, 5, 5), GroupStatus::Full);
        assert_eq!(status_after_payout(2, 3, 5), GroupStatus::Active);
        assert_eq!(status_after_payout(5, 5, 5), GroupStatus::Completed);
    }

    #[test]
    fn pause_resume_round_trip() {
        let active = group(5, 5, 1, GroupStatus::Full);
        assert_eq!(pause(&active), Ok(GroupStatus::Paused));

        let paused = group(5, 5, 1, GroupStatus::Paused);
        assert_eq!(resume(&paused), Ok(GroupStatus::Full));

        let completed = group(5, 5, 5, GroupStatus::Completed);
        assert!(matches!(
            pause(&completed),
            Err(LifecycleError::InvalidTransition { .. })
        ));
        assert!(resume(&active).is_err());
    }
}
