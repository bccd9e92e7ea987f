use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use circle_accounting::{
    contribution_status, due_date, evaluate_admission, lifecycle, reminder_due, AdmissionError,
    LifecycleError, PayoutCalculator, TreasurySnapshot,
};
use circle_store::{CircleStorage, MembershipStore, StorageError};
use circle_types::{
    AccountingConfig, ContributionRecord, ContributionStatus, Group, GroupDraft, GroupId,
    GroupStatus, JoinCredentials, Member, MemberId, PayoutBreakdown, PayoutEvent, RecordId,
    UserId,
};
use tracing::{debug, info, warn};

use crate::error::{CircleError, CircleResult};

/// Orchestrates savings circle operations over a storage backend.
pub struct CircleService<S: CircleStorage> {
    storage: Arc<S>,
    config: AccountingConfig,
    calculator: PayoutCalculator,
}

impl<S: CircleStorage> CircleService<S> {
    pub fn new(storage: Arc<S>, config: AccountingConfig) -> Self {
        let calculator = PayoutCalculator::from_config(&config);
        Self {
            storage,
            config,
            calculator,
        }
    }

    pub fn config(&self) -> &AccountingConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<S> {
        Arc::clone(&self.storage)
    }

    pub fn calculator(&self) -> &PayoutCalculator {
        &self.calculator
    }

    /// Create a group; the creator becomes member #1.
    pub async fn create_group(&self, creator: UserId, draft: GroupDraft) -> CircleResult<Group> {
        draft.validate(&self.config)?;

        let now = Utc::now();
        let group = Group::from_draft(draft, creator, &self.config, now);
        let founder = Member {
            id: MemberId::generate(),
            group_id: group.id,
            user_id: creator,
            payout_order: 1,
            has_received_payout: false,
            joined_at: now,
        };

        self.storage.insert_group(group.clone(), founder).await?;
        info!(
            group = %group.id,
            group_type = %group.group_type(),
            monthly_amount = group.monthly_amount,
            max_members = group.max_members,
            treasury_window = group.treasury_window,
            "Group created"
        );
        Ok(group)
    }

    pub async fn group(&self, group_id: &GroupId) -> CircleResult<Group> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or(CircleError::GroupNotFound(*group_id))
    }

    /// Public and community groups still accepting members, newest first.
    pub async fn listed_groups(&self) -> CircleResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .storage
            .list_groups()
            .await?
            .into_iter()
            .filter(|group| group.settings.is_listed() && group.status == GroupStatus::Active)
            .collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    /// Every group `user_id` holds a seat in, newest first.
    pub async fn user_groups(&self, user_id: &UserId) -> CircleResult<Vec<Group>> {
        let mut groups = self.storage.groups_for_user(user_id).await?;
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    /// Members in payout order.
    pub async fn members(&self, group_id: &GroupId) -> CircleResult<Vec<Member>> {
        match self.storage.list_members(group_id).await {
            Ok(members) => Ok(members),
            Err(StorageError::NotFound(_)) => Err(CircleError::GroupNotFound(*group_id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn member(&self, group_id: &GroupId, user_id: &UserId) -> CircleResult<Member> {
        self.storage
            .find_member(group_id, user_id)
            .await?
            .ok_or(CircleError::NotMember {
                group: *group_id,
                user: *user_id,
            })
    }

    /// Admit `user_id` to the group.
    ///
    /// The admission decision is made against a snapshot and then committed
    /// with a conditional slot reservation. If another join landed in between,
    /// the snapshot is re-read and the decision re-made.
    pub async fn join_group(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        credentials: &JoinCredentials,
    ) -> CircleResult<Member> {
        let attempts = self.config.join_retry_limit;

        for attempt in 1..=attempts {
            let group = self.group(group_id).await?;
            lifecycle::ensure_accepting_joins(&group)?;

            let already_member = self.storage.find_member(group_id, user_id).await?.is_some();
            let payout_order = evaluate_admission(&group, already_member, credentials)
                .into_result()
                .map_err(|err| {
                    warn!(group = %group_id, user = %user_id, reason = %err, "Join rejected");
                    err
                })?;

            match self
                .storage
                .reserve_slot(group_id, user_id, group.current_members, Utc::now())
                .await
            {
                Ok((updated, member)) => {
                    info!(
                        group = %group_id,
                        user = %user_id,
                        payout_order = member.payout_order,
                        members = updated.current_members,
                        status = %updated.status,
                        "Member joined"
                    );
                    debug_assert_eq!(member.payout_order, payout_order);
                    return Ok(member);
                }
                Err(err) if err.is_stale() => {
                    debug!(group = %group_id, user = %user_id, attempt, "Member count moved, retrying join");
                }
                Err(StorageError::AlreadyExists(_)) => {
                    return Err(AdmissionError::Duplicate.into())
                }
                Err(StorageError::CapacityExceeded(_)) => return Err(AdmissionError::Full.into()),
                Err(err) => return Err(err.into()),
            }
        }

        warn!(group = %group_id, user = %user_id, attempts, "Join contention limit reached");
        Err(CircleError::Contention { attempts })
    }

    /// Record a member's payment for a period.
    ///
    /// `payment_ref` is the transaction reference returned by the payment rail.
    pub async fn record_contribution(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        period: u32,
        amount: u64,
        payment_ref: impl Into<String>,
    ) -> CircleResult<ContributionRecord> {
        let group = self.group(group_id).await?;
        lifecycle::ensure_operational(&group)?;
        let member = self.member(group_id, user_id).await?;

        if amount != group.monthly_amount {
            return Err(CircleError::InvalidAmount {
                expected: group.monthly_amount,
                supplied: amount,
            });
        }
        let due = due_date(group.first_due_date, period).ok_or(CircleError::InvalidPeriod(period))?;

        let now = Utc::now();
        let status = contribution_status(period, group.treasury_window, due, now.date_naive(), true);
        let record = ContributionRecord {
            id: RecordId::generate(),
            group_id: *group_id,
            member_id: member.id,
            user_id: *user_id,
            period,
            amount,
            status,
            payment_ref: payment_ref.into(),
            recorded_at: now,
        };

        match self.storage.append_contribution(record.clone()).await {
            Ok(entry) => {
                info!(
                    group = %group_id,
                    member = %member.id,
                    period,
                    amount,
                    status = %status,
                    entry = entry.index,
                    "Contribution recorded"
                );
                Ok(record)
            }
            Err(StorageError::AlreadyExists(_)) => Err(CircleError::AlreadyContributed { period }),
            Err(err) => Err(err.into()),
        }
    }

    /// Status of a member's contribution for `period` as of `today`.
    pub async fn contribution_status(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        period: u32,
        today: NaiveDate,
    ) -> CircleResult<ContributionStatus> {
        let group = self.group(group_id).await?;
        let member = self.member(group_id, user_id).await?;
        let due = due_date(group.first_due_date, period).ok_or(CircleError::InvalidPeriod(period))?;

        let paid = self
            .storage
            .contributions(group_id)
            .await?
            .iter()
            .any(|record| record.member_id == member.id && record.period == period);

        Ok(contribution_status(
            period,
            group.treasury_window,
            due,
            today,
            paid,
        ))
    }

    /// Members who have not paid for `period` and whose due date is within
    /// the configured reminder lead time.
    pub async fn members_due_reminder(
        &self,
        group_id: &GroupId,
        period: u32,
        today: NaiveDate,
    ) -> CircleResult<Vec<Member>> {
        let group = self.group(group_id).await?;
        let due = due_date(group.first_due_date, period).ok_or(CircleError::InvalidPeriod(period))?;
        let contributions = self.storage.contributions(group_id).await?;
        let members = self.members(group_id).await?;

        Ok(members
            .into_iter()
            .filter(|member| {
                let paid = contributions
                    .iter()
                    .any(|record| record.member_id == member.id && record.period == period);
                reminder_due(due, today, self.config.reminder_lead_days, paid)
            })
            .collect())
    }

    /// Breakdown for a payout position with the group's current size.
    pub async fn quote_payout(
        &self,
        group_id: &GroupId,
        payout_position: u32,
    ) -> CircleResult<PayoutBreakdown> {
        let group = self.group(group_id).await?;
        Ok(self.calculator.quote_for_group(&group, payout_position))
    }

    /// Breakdown for every position in the rotation.
    pub async fn payout_schedule(&self, group_id: &GroupId) -> CircleResult<Vec<PayoutBreakdown>> {
        let group = self.group(group_id).await?;
        Ok(self.calculator.schedule(
            group.monthly_amount,
            group.current_members,
            group.treasury_window,
        ))
    }

    /// Member whose payout order equals the next cycle.
    ///
    /// Fails with [`LifecycleError::NotStarted`] while seats are still open.
    pub async fn next_recipient(&self, group_id: &GroupId) -> CircleResult<Option<Member>> {
        let group = self.group(group_id).await?;
        if let Err(err @ LifecycleError::NotStarted { .. }) =
            lifecycle::ensure_rotation_started(&group)
        {
            return Err(err.into());
        }
        let Some(order) = lifecycle::next_payout_order(&group) else {
            return Ok(None);
        };
        Ok(self
            .members(group_id)
            .await?
            .into_iter()
            .find(|member| member.payout_order == order))
    }

    /// Pay the member at the head of the rotation and advance the cycle.
    ///
    /// Only a full group pays out. The cycle is advanced before the payout is
    /// logged; if the log append then fails the caller gets
    /// [`CircleError::PayoutNotLogged`] and must write a compensating record.
    pub async fn record_payout(
        &self,
        group_id: &GroupId,
        payment_ref: impl Into<String>,
    ) -> CircleResult<PayoutEvent> {
        let group = self.group(group_id).await?;
        lifecycle::ensure_rotation_started(&group)?;

        let order = lifecycle::next_payout_order(&group).ok_or(CircleError::RotationExhausted)?;
        let recipient = self
            .members(group_id)
            .await?
            .into_iter()
            .find(|member| member.payout_order == order)
            .ok_or_else(|| {
                StorageError::InvariantViolation(format!(
                    "no member holds payout order {order} in group {group_id}"
                ))
            })?;
        if recipient.has_received_payout {
            return Err(CircleError::RotationExhausted);
        }

        let breakdown = self.calculator.quote_for_group(&group, order);

        if self.config.enforce_treasury_solvency {
            let snapshot = self.treasury_snapshot(group_id).await?;
            let shortfall = snapshot.shortfall_for(breakdown.total_amount);
            if shortfall > 0 {
                warn!(
                    group = %group_id,
                    required = breakdown.total_amount,
                    shortfall,
                    "Payout refused, treasury short"
                );
                return Err(CircleError::InsufficientTreasury {
                    required: breakdown.total_amount,
                    shortfall,
                });
            }
        }

        let now = Utc::now();
        // The cycle advance is the guard; only one concurrent caller wins it.
        let updated = self
            .storage
            .complete_payout(group_id, &recipient.id, group.current_cycle, now)
            .await?;

        let event = PayoutEvent {
            id: RecordId::generate(),
            group_id: *group_id,
            member_id: recipient.id,
            user_id: recipient.user_id,
            payout_order: order,
            breakdown,
            payment_ref: payment_ref.into(),
            recorded_at: now,
        };
        let entry = match self.storage.append_payout(event.clone()).await {
            Ok(entry) => entry,
            Err(source) => {
                warn!(
                    group = %group_id,
                    payout_order = order,
                    error = %source,
                    "Cycle advanced but payout not logged"
                );
                return Err(CircleError::PayoutNotLogged {
                    group: *group_id,
                    payout_order: order,
                    source,
                });
            }
        };

        info!(
            group = %group_id,
            recipient = %recipient.user_id,
            payout_order = order,
            base = breakdown.base_amount,
            interest = breakdown.interest_amount,
            status = %updated.status,
            entry = entry.index,
            "Payout recorded"
        );
        Ok(event)
    }

    /// Treasury position replayed from the group's records.
    pub async fn treasury_snapshot(&self, group_id: &GroupId) -> CircleResult<TreasurySnapshot> {
        self.group(group_id).await?;
        let contributions = self.storage.contributions(group_id).await?;
        let payouts = self.storage.payouts(group_id).await?;
        Ok(TreasurySnapshot::reconcile(&contributions, &payouts))
    }

    pub async fn pause_group(&self, group_id: &GroupId) -> CircleResult<Group> {
        let group = self.group(group_id).await?;
        let to = lifecycle::pause(&group)?;
        let updated = self
            .storage
            .transition_status(group_id, group.status, to, Utc::now())
            .await?;
        info!(group = %group_id, "Group paused");
        Ok(updated)
    }

    pub async fn resume_group(&self, group_id: &GroupId) -> CircleResult<Group> {
        let group = self.group(group_id).await?;
        let to = lifecycle::resume(&group)?;
        let updated = self
            .storage
            .transition_status(group_id, group.status, to, Utc::now())
            .await?;
        info!(group = %group_id, status = %updated.status, "Group resumed");
        Ok(updated)
    }
}
