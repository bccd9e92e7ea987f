use async_trait::async_trait;
use chrono::{DateTime, Utc};
use circle_types::{
    ContributionRecord, Group, GroupId, GroupStatus, Member, MemberId, PayoutEvent, UserId,
};

use crate::ledger::LedgerEntry;
use crate::StorageResult;

/// Storage interface for groups and their members.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a new group together with its founding member (order 1).
    async fn insert_group(&self, group: Group, founder: Member) -> StorageResult<()>;

    async fn get_group(&self, group_id: &GroupId) -> StorageResult<Option<Group>>;

    /// Every stored group, in no particular order.
    async fn list_groups(&self) -> StorageResult<Vec<Group>>;

    /// Groups in which `user_id` holds a seat.
    async fn groups_for_user(&self, user_id: &UserId) -> StorageResult<Vec<Group>>;

    async fn find_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> StorageResult<Option<Member>>;

    /// Members ordered by payout order.
    async fn list_members(&self, group_id: &GroupId) -> StorageResult<Vec<Member>>;

    /// Atomically seat `user_id` as member `expected_members + 1`.
    ///
    /// Succeeds only while the stored member count still equals
    /// `expected_members`; otherwise fails with [`crate::StorageError::Stale`]
    /// and changes nothing. Refuses existing members and full groups. Returns
    /// the updated group and the new member.
    async fn reserve_slot(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        expected_members: u32,
        joined_at: DateTime<Utc>,
    ) -> StorageResult<(Group, Member)>;

    /// Atomically mark `member_id` paid and advance the cycle, provided the
    /// stored cycle still equals `expected_cycle` and the member holds order
    /// `expected_cycle + 1`.
    ///
    /// The matching [`RecordStore::append_payout`] is a separate write made
    /// afterwards; a failure there leaves the cycle advanced with no event.
    async fn complete_payout(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
        expected_cycle: u32,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Group>;

    /// Set the status if it still equals `expected`.
    async fn transition_status(
        &self,
        group_id: &GroupId,
        expected: GroupStatus,
        to: GroupStatus,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Group>;
}

/// Storage interface for the append-only contribution and payout log.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a contribution. At most one per member per period.
    async fn append_contribution(&self, record: ContributionRecord) -> StorageResult<LedgerEntry>;

    /// Append a payout. At most one per payout order per group.
    async fn append_payout(&self, event: PayoutEvent) -> StorageResult<LedgerEntry>;

    async fn contributions(&self, group_id: &GroupId) -> StorageResult<Vec<ContributionRecord>>;

    async fn payouts(&self, group_id: &GroupId) -> StorageResult<Vec<PayoutEvent>>;

    /// Every entry in append order.
    async fn entries(&self) -> StorageResult<Vec<LedgerEntry>>;

    async fn verify_chain(&self) -> StorageResult<bool>;
}

/// Unified storage bundle used by the circle service.
pub trait CircleStorage: MembershipStore + RecordStore + Send + Sync {}

impl<T> CircleStorage for T where T: MembershipStore + RecordStore + Send + Sync {}
