//! Join admission.
//!
//! Checks run in a fixed order: duplicate membership, capacity, then the
//! group type's credentials. The first failing check decides the outcome.

use circle_types::{CommunityAttestation, Group, GroupSettings, JoinCredentials};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdmissionError;

/// Why a join request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Full,
    Duplicate,
    InvalidCode,
    Unverified,
}

/// Outcome of evaluating a join request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionDecision {
    Admit { payout_order: u32 },
    Reject(RejectReason),
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admit { .. })
    }

    pub fn payout_order(&self) -> Option<u32> {
        match self {
            AdmissionDecision::Admit { payout_order } => Some(*payout_order),
            AdmissionDecision::Reject(_) => None,
        }
    }

    pub fn into_result(self) -> Result<u32, AdmissionError> {
        match self {
            AdmissionDecision::Admit { payout_order } => Ok(payout_order),
            AdmissionDecision::Reject(reason) => Err(reason.into()),
        }
    }
}

impl From<RejectReason> for AdmissionError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::Full => AdmissionError::Full,
            RejectReason::Duplicate => AdmissionError::Duplicate,
            RejectReason::InvalidCode => AdmissionError::InvalidCode,
            RejectReason::Unverified => AdmissionError::Unverified,
        }
    }
}

/// Capacity and duplicate check.
///
/// `already_member` must come from the caller's persisted membership. An
/// admitted candidate takes order `current_members + 1`.
pub fn check_capacity(
    current_members: u32,
    max_members: u32,
    already_member: bool,
) -> AdmissionDecision {
    if already_member {
        return AdmissionDecision::Reject(RejectReason::Duplicate);
    }
    if current_members >= max_members {
        return AdmissionDecision::Reject(RejectReason::Full);
    }
    AdmissionDecision::Admit {
        payout_order: current_members + 1,
    }
}

/// Credential check for the group's type.
///
/// Private groups compare the code byte-for-byte. Community groups with
/// verification compare the attested handle (ignoring a leading `@` and
/// ASCII case) and require the minimum membership months.
pub fn verify_credentials(
    settings: &GroupSettings,
    credentials: &JoinCredentials,
) -> Result<(), RejectReason> {
    match settings {
        GroupSettings::Private { secret_code } => match credentials.secret_code.as_deref() {
            Some(supplied) if supplied == secret_code => Ok(()),
            _ => Err(RejectReason::InvalidCode),
        },
        GroupSettings::Public => Ok(()),
        GroupSettings::Community { verification: None } => Ok(()),
        GroupSettings::Community {
            verification: Some(required),
        } => match &credentials.attestation {
            Some(CommunityAttestation {
                group_handle,
                membership_months,
            }) if same_handle(group_handle, &required.group_handle)
                && *membership_months >= required.min_membership_months =>
            {
                Ok(())
            }
            _ => Err(RejectReason::Unverified),
        },
    }
}

fn bare_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}

fn same_handle(a: &str, b: &str) -> bool {
    bare_handle(a).eq_ignore_ascii_case(bare_handle(b))
}

/// Full admission decision for a join request against a group snapshot.
pub fn evaluate_admission(
    group: &Group,
    already_member: bool,
    credentials: &JoinCredentials,
) -> AdmissionDecision {
    let decision = match check_capacity(group.current_members, group.max_members, already_member) {
        AdmissionDecision::Admit { payout_order } => {
            match verify_credentials(&group.settings, credentials) {
                Ok(()) => AdmissionDecision::Admit { payout_order },
                Err(reason) => AdmissionDecision::Reject(reason),
            }
        }
        rejected => rejected,
    };

    debug!(
        group = %group.id,
        group_type = %group.group_type(),
        current_members = group.current_members,
        max_members = group.max_members,
        ?decision,
        "Evaluated admission"
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use circle_types::{AccountingConfig, CommunityVerification, GroupDraft, UserId};

    fn group(settings: GroupSettings, current: u32, max: u32) -> Group {
        let draft = GroupDraft::new(
            "Circle",
            settings,
            100,
            max,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        let mut group = Group::from_draft(
            draft,
            UserId::generate(),
            &AccountingConfig::default(),
            Utc::now(),
        );
        group.current_members = current;
        group
    }

    fn community(handle: &str, months: u32) -> GroupSettings {
        GroupSettings::Community {
            verification: Some(CommunityVerification {
                group_handle: handle.into(),
                min_membership_months: months,
            }),
        }
    }

    #[test]
    fn admits_with_next_order() {
        assert_eq!(
            check_capacity(3, 10, false),
            AdmissionDecision::Admit { payout_order: 4 }
        );
    }

    #[test]
    fn full_group_rejects() {
        assert_eq!(
            check_capacity(5, 5, false),
            AdmissionDecision::Reject(RejectReason::Full)
        );
    }

    #[test]
    fn duplicate_wins_over_full() {
        assert_eq!(
            check_capacity(5, 5, true),
            AdmissionDecision::Reject(RejectReason::Duplicate)
        );
        assert_eq!(
            check_capacity(1, 5, true),
            AdmissionDecision::Reject(RejectReason::Duplicate)
        );
    }

    #[test]
    fn private_code_is_case_sensitive() {
        let g = group(
            GroupSettings::Private {
                secret_code: "ABC123".into(),
            },
            2,
            10,
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_code("abc123")),
            AdmissionDecision::Reject(RejectReason::InvalidCode)
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_code("ABC123")),
            AdmissionDecision::Admit { payout_order: 3 }
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::none()),
            AdmissionDecision::Reject(RejectReason::InvalidCode)
        );
    }

    #[test]
    fn capacity_checked_before_code() {
        let g = group(
            GroupSettings::Private {
                secret_code: "ABC123".into(),
            },
            10,
            10,
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_code("wrong")),
            AdmissionDecision::Reject(RejectReason::Full)
        );
    }

    #[test]
    fn public_ignores_credentials() {
        let g = group(GroupSettings::Public, 1, 4);
        assert!(evaluate_admission(&g, false, &JoinCredentials::with_code("anything")).is_admitted());
    }

    #[test]
    fn community_without_verification_is_open() {
        let g = group(GroupSettings::Community { verification: None }, 1, 4);
        assert!(evaluate_admission(&g, false, &JoinCredentials::none()).is_admitted());
    }

    #[test]
    fn community_verification() {
        let g = group(community("@RustSavers", 6), 1, 4);
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::none()),
            AdmissionDecision::Reject(RejectReason::Unverified)
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_attestation("rustsavers", 5)),
            AdmissionDecision::Reject(RejectReason::Unverified)
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_attestation("other", 12)),
            AdmissionDecision::Reject(RejectReason::Unverified)
        );
        assert_eq!(
            evaluate_admission(&g, false, &JoinCredentials::with_attestation("rustsavers", 6)),
            AdmissionDecision::Admit { payout_order: 2 }
        );
    }

    #[test]
    fn into_result_maps_reasons() {
        assert_eq!(check_capacity(0, 3, false).into_result(), Ok(1));
        assert_eq!(
            check_capacity(3, 3, false).into_result(),
            Err(AdmissionError::Full)
        );
        assert_eq!(
            AdmissionDecision::Reject(RejectReason::InvalidCode).into_result(),
            Err(AdmissionError::InvalidCode)
        );
    }
}
