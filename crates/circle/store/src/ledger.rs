//! Append-only record log for contributions and payouts.

use chrono::{DateTime, Utc};
use circle_types::{ContributionRecord, GroupId, PayoutEvent};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StorageError;
use crate::StorageResult;

/// Ledger entry types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Contribution,
    Payout,
}

/// One record in the log, linked to its predecessor by hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: String,
    pub index: u64,
    pub group_id: GroupId,
    pub kind: LedgerEntryKind,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Append-only log with hash-chain proofs.
///
/// No in-place mutation is exposed; corrections are new records.
#[derive(Clone, Debug, Default)]
pub struct RecordLedger {
    entries: Vec<LedgerEntry>,
}

impl RecordLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a record log written by an earlier process.
    ///
    /// Fails when indices are not contiguous from zero or any hash link is broken.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> StorageResult<Self> {
        if let Some((position, entry)) = entries
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position as u64)
        {
            return Err(StorageError::Ledger(format!(
                "record {} stored at position {position}",
                entry.index
            )));
        }

        let restored = Self { entries };
        if restored.verify_chain() {
            Ok(restored)
        } else {
            Err(StorageError::Ledger("record hash chain is broken".into()))
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append_contribution(&mut self, record: &ContributionRecord) -> StorageResult<LedgerEntry> {
        let payload =
            serde_json::to_value(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.append(record.group_id, LedgerEntryKind::Contribution, payload)
    }

    pub fn append_payout(&mut self, event: &PayoutEvent) -> StorageResult<LedgerEntry> {
        let payload =
            serde_json::to_value(event).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.append(event.group_id, LedgerEntryKind::Payout, payload)
    }

    pub fn contributions(&self, group_id: &GroupId) -> StorageResult<Vec<ContributionRecord>> {
        self.decode(group_id, LedgerEntryKind::Contribution)
    }

    pub fn payouts(&self, group_id: &GroupId) -> StorageResult<Vec<PayoutEvent>> {
        self.decode(group_id, LedgerEntryKind::Payout)
    }

    /// Recompute every hash and check each entry links to its predecessor.
    pub fn verify_chain(&self) -> bool {
        let mut link: Option<&str> = None;
        for entry in &self.entries {
            if entry.previous_hash.as_deref() != link {
                return false;
            }
            let recomputed = compute_entry_hash(
                entry.index,
                &entry.group_id,
                entry.kind,
                entry.timestamp,
                &entry.payload,
                link,
            );
            if entry.entry_hash != recomputed {
                return false;
            }
            link = Some(entry.entry_hash.as_str());
        }
        true
    }

    fn last_hash(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.entry_hash.as_str())
    }

    fn decode<T: DeserializeOwned>(
        &self,
        group_id: &GroupId,
        kind: LedgerEntryKind,
    ) -> StorageResult<Vec<T>> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind && entry.group_id == *group_id)
            .map(|entry| {
                serde_json::from_value(entry.payload.clone())
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }

    fn append(
        &mut self,
        group_id: GroupId,
        kind: LedgerEntryKind,
        payload: Value,
    ) -> StorageResult<LedgerEntry> {
        let index = self.entries.len() as u64;
        let timestamp = Utc::now();
        let previous_hash = self.last_hash().map(str::to_owned);
        let entry_hash = compute_entry_hash(
            index,
            &group_id,
            kind,
            timestamp,
            &payload,
            previous_hash.as_deref(),
        );

        let entry = LedgerEntry {
            entry_id: Uuid::new_v4().to_string(),
            index,
            group_id,
            kind,
            timestamp,
            payload,
            previous_hash,
            entry_hash,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

fn compute_entry_hash(
    index: u64,
    group_id: &GroupId,
    kind: LedgerEntryKind,
    timestamp: DateTime<Utc>,
    payload: &Value,
    previous_hash: Option<&str>,
) -> String {
    let material = serde_json::json!({
        "index": index,
        "group_id": group_id,
        "kind": kind,
        "timestamp": timestamp,
        "payload": payload,
        "previous_hash": previous_hash,
    });

    let encoded = serde_json::to_vec(&material).unwrap_or_default();
    blake3::hash(&encoded).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_types::{ContributionStatus, MemberId, PayoutBreakdown, RecordId, UserId};

    fn contribution(group_id: GroupId, period: u32) -> ContributionRecord {
        ContributionRecord {
            id: RecordId::generate(),
            group_id,
            member_id: MemberId::generate(),
            user_id: UserId::generate(),
            period,
            amount: 100,
            status: ContributionStatus::Paid,
            payment_ref: format!("0xabc{period}"),
            recorded_at: Utc::now(),
        }
    }

    fn payout(group_id: GroupId) -> PayoutEvent {
        PayoutEvent {
            id: RecordId::generate(),
            group_id,
            member_id: MemberId::generate(),
            user_id: UserId::generate(),
            payout_order: 1,
            breakdown: PayoutBreakdown {
                base_amount: 1000,
                interest_amount: 0,
                total_amount: 1000,
            },
            payment_ref: "0xpayout".into(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn appended_records_are_linked() {
        let group = GroupId::generate();
        let mut ledger = RecordLedger::new();
        ledger.append_contribution(&contribution(group, 1)).unwrap();
        ledger.append_payout(&payout(group)).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.entries()[1].previous_hash.as_deref(),
            Some(ledger.entries()[0].entry_hash.as_str())
        );
        assert!(ledger.verify_chain());
    }

    #[test]
    fn edited_payload_breaks_chain() {
        let group = GroupId::generate();
        let mut ledger = RecordLedger::new();
        ledger.append_contribution(&contribution(group, 1)).unwrap();

        let mut edited = ledger.clone();
        edited.entries[0].payload = serde_json::json!({"amount": 1});
        assert!(!edited.verify_chain());
    }

    #[test]
    fn decodes_records_per_group() {
        let a = GroupId::generate();
        let b = GroupId::generate();
        let mut ledger = RecordLedger::new();
        let first = contribution(a, 1);
        ledger.append_contribution(&first).unwrap();
        ledger.append_contribution(&contribution(b, 1)).unwrap();
        ledger.append_payout(&payout(a)).unwrap();

        assert_eq!(ledger.contributions(&a).unwrap(), vec![first]);
        assert_eq!(ledger.contributions(&b).unwrap().len(), 1);
        assert_eq!(ledger.payouts(&a).unwrap().len(), 1);
        assert!(ledger.payouts(&b).unwrap().is_empty());
    }

    #[test]
    fn rebuilds_from_persisted_entries() {
        let group = GroupId::generate();
        let mut ledger = RecordLedger::new();
        ledger.append_contribution(&contribution(group, 1)).unwrap();
        ledger.append_contribution(&contribution(group, 2)).unwrap();

        let json = serde_json::to_string(ledger.entries()).unwrap();
        let restored: Vec<LedgerEntry> = serde_json::from_str(&json).unwrap();
        let rebuilt = RecordLedger::from_entries(restored).unwrap();
        assert_eq!(rebuilt.len(), 2);

        let mut gapped = ledger.entries().to_vec();
        gapped.remove(0);
        assert!(matches!(
            RecordLedger::from_entries(gapped),
            Err(StorageError::Ledger(_))
        ));
    }
}
