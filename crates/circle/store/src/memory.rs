//! In-memory reference implementation of the circle storage traits.
//!
//! Each conditional update runs under a single write lock, which makes slot
//! reservation and cycle advancement linearizable per group. A SQL backend
//! gets the same guarantee from `UPDATE ... WHERE current_members = $n`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use circle_accounting::lifecycle;
use circle_types::{
    ContributionRecord, Group, GroupId, GroupStatus, Member, MemberId, PayoutEvent, UserId,
};
use tracing::{debug, info};

use crate::ledger::{LedgerEntry, RecordLedger};
use crate::traits::{MembershipStore, RecordStore};
use crate::{StorageError, StorageResult};

#[derive(Debug, Clone)]
struct GroupState {
    group: Group,
    /// Kept sorted by payout order.
    members: Vec<Member>,
}

/// In-memory circle storage adapter.
#[derive(Default)]
pub struct InMemoryCircleStorage {
    groups: RwLock<HashMap<GroupId, GroupState>>,
    ledger: RwLock<RecordLedger>,
}

impl InMemoryCircleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously persisted record log.
    pub fn with_ledger(ledger: RecordLedger) -> Self {
        Self {
            groups: RwLock::default(),
            ledger: RwLock::new(ledger),
        }
    }
}

fn poisoned(what: &str) -> StorageError {
    StorageError::Backend(format!("{what} lock poisoned"))
}

fn group_not_found(group_id: &GroupId) -> StorageError {
    StorageError::NotFound(format!("group {group_id}"))
}

#[async_trait]
impl MembershipStore for InMemoryCircleStorage {
    async fn insert_group(&self, group: Group, founder: Member) -> StorageResult<()> {
        if founder.group_id != group.id || founder.payout_order != 1 || group.current_members != 1 {
            return Err(StorageError::InvariantViolation(
                "founder must be member #1 of the group being inserted".to_string(),
            ));
        }

        let mut guard = self.groups.write().map_err(|_| poisoned("groups"))?;
        if guard.contains_key(&group.id) {
            return Err(StorageError::AlreadyExists(format!("group {}", group.id)));
        }

        info!(group = %group.id, founder = %founder.user_id, "Group inserted");
        guard.insert(
            group.id,
            GroupState {
                group,
                members: vec![founder],
            },
        );
        Ok(())
    }

    async fn get_group(&self, group_id: &GroupId) -> StorageResult<Option<Group>> {
        let guard = self.groups.read().map_err(|_| poisoned("groups"))?;
        Ok(guard.get(group_id).map(|state| state.group.clone()))
    }

    async fn list_groups(&self) -> StorageResult<Vec<Group>> {
        let guard = self.groups.read().map_err(|_| poisoned("groups"))?;
        Ok(guard.values().map(|state| state.group.clone()).collect())
    }

    async fn groups_for_user(&self, user_id: &UserId) -> StorageResult<Vec<Group>> {
        let guard = self.groups.read().map_err(|_| poisoned("groups"))?;
        Ok(guard
            .values()
            .filter(|state| state.members.iter().any(|m| m.user_id == *user_id))
            .map(|state| state.group.clone())
            .collect())
    }

    async fn find_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> StorageResult<Option<Member>> {
        let guard = self.groups.read().map_err(|_| poisoned("groups"))?;
        Ok(guard.get(group_id).and_then(|state| {
            state
                .members
                .iter()
                .find(|member| member.user_id == *user_id)
                .cloned()
        }))
    }

    async fn list_members(&self, group_id: &GroupId) -> StorageResult<Vec<Member>> {
        let guard = self.groups.read().map_err(|_| poisoned("groups"))?;
        guard
            .get(group_id)
            .map(|state| state.members.clone())
            .ok_or_else(|| group_not_found(group_id))
    }

    async fn reserve_slot(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        expected_members: u32,
        joined_at: DateTime<Utc>,
    ) -> StorageResult<(Group, Member)> {
        let mut guard = self.groups.write().map_err(|_| poisoned("groups"))?;
        let state = guard
            .get_mut(group_id)
            .ok_or_else(|| group_not_found(group_id))?;

        if state.members.iter().any(|member| member.user_id == *user_id) {
            return Err(StorageError::AlreadyExists(format!(
                "user {user_id} in group {group_id}"
            )));
        }

        let actual = state.group.current_members;
        if actual != expected_members {
            debug!(group = %group_id, expected_members, actual, "Stale member count");
            return Err(StorageError::Stale {
                field: "current_members",
                expected: expected_members,
                actual,
            });
        }

        if state.group.is_full() {
            return Err(StorageError::CapacityExceeded(format!(
                "group {group_id} has {actual} of {} seats taken",
                state.group.max_members
            )));
        }

        let payout_order = actual + 1;
        let member = Member {
            id: MemberId::generate(),
            group_id: *group_id,
            user_id: *user_id,
            payout_order,
            has_received_payout: false,
            joined_at,
        };

        state.group.current_members = payout_order;
        state.group.updated_at = joined_at;
        if state.group.status == GroupStatus::Active {
            state.group.status =
                lifecycle::capacity_status(state.group.current_members, state.group.max_members);
        }
        state.members.push(member.clone());

        debug!(group = %group_id, user = %user_id, payout_order, "Slot reserved");
        Ok((state.group.clone(), member))
    }

    async fn complete_payout(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
        expected_cycle: u32,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Group> {
        let mut guard = self.groups.write().map_err(|_| poisoned("groups"))?;
        let state = guard
            .get_mut(group_id)
            .ok_or_else(|| group_not_found(group_id))?;

        let actual = state.group.current_cycle;
        if actual != expected_cycle {
            return Err(StorageError::Stale {
                field: "current_cycle",
                expected: expected_cycle,
                actual,
            });
        }

        let member = state
            .members
            .iter_mut()
            .find(|member| member.id == *member_id)
            .ok_or_else(|| StorageError::NotFound(format!("member {member_id}")))?;

        if member.payout_order != expected_cycle + 1 {
            return Err(StorageError::InvariantViolation(format!(
                "member {} holds order {}, cycle {} pays order {}",
                member_id,
                member.payout_order,
                expected_cycle,
                expected_cycle + 1
            )));
        }
        if member.has_received_payout {
            return Err(StorageError::AlreadyExists(format!(
                "payout for member {member_id}"
            )));
        }

        member.has_received_payout = true;
        state.group.current_cycle = expected_cycle + 1;
        state.group.status = lifecycle::status_after_payout(
            state.group.current_cycle,
            state.group.current_members,
            state.group.max_members,
        );
        state.group.updated_at = updated_at;

        debug!(
            group = %group_id,
            cycle = state.group.current_cycle,
            status = %state.group.status,
            "Cycle advanced"
        );
        Ok(state.group.clone())
    }

    async fn transition_status(
        &self,
        group_id: &GroupId,
        expected: GroupStatus,
        to: GroupStatus,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Group> {
        let mut guard = self.groups.write().map_err(|_| poisoned("groups"))?;
        let state = guard
            .get_mut(group_id)
            .ok_or_else(|| group_not_found(group_id))?;

        if state.group.status != expected {
            return Err(StorageError::InvariantViolation(format!(
                "invalid status transition: expected {}, found {}",
                expected, state.group.status
            )));
        }

        state.group.status = to;
        state.group.updated_at = updated_at;
        Ok(state.group.clone())
    }
}

#[async_trait]
impl RecordStore for InMemoryCircleStorage {
    async fn append_contribution(&self, record: ContributionRecord) -> StorageResult<LedgerEntry> {
        let mut ledger = self.ledger.write().map_err(|_| poisoned("ledger"))?;

        let duplicate = ledger
            .contributions(&record.group_id)?
            .iter()
            .any(|existing| existing.member_id == record.member_id && existing.period == record.period);
        if duplicate {
            return Err(StorageError::AlreadyExists(format!(
                "contribution for member {} period {}",
                record.member_id, record.period
            )));
        }

        ledger.append_contribution(&record)
    }

    async fn append_payout(&self, event: PayoutEvent) -> StorageResult<LedgerEntry> {
        let mut ledger = self.ledger.write().map_err(|_| poisoned("ledger"))?;

        let duplicate = ledger
            .payouts(&event.group_id)?
            .iter()
            .any(|existing| existing.payout_order == event.payout_order);
        if duplicate {
            return Err(StorageError::AlreadyExists(format!(
                "payout for order {} in group {}",
                event.payout_order, event.group_id
            )));
        }

        ledger.append_payout(&event)
    }

    async fn contributions(&self, group_id: &GroupId) -> StorageResult<Vec<ContributionRecord>> {
        let ledger = self.ledger.read().map_err(|_| poisoned("ledger"))?;
        ledger.contributions(group_id)
    }

    async fn payouts(&self, group_id: &GroupId) -> StorageResult<Vec<PayoutEvent>> {
        let ledger = self.ledger.read().map_err(|_| poisoned("ledger"))?;
        ledger.payouts(group_id)
    }

    async fn entries(&self) -> StorageResult<Vec<LedgerEntry>> {
        let ledger = self.ledger.read().map_err(|_| poisoned("ledger"))?;
        Ok(ledger.entries().to_vec())
    }

    async fn verify_chain(&self) -> StorageResult<bool> {
        let ledger = self.ledger.read().map_err(|_| poisoned("ledger"))?;
        Ok(ledger.verify_chain())
    }
}
