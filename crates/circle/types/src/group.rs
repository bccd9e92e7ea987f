use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AccountingConfig;
use crate::error::ValidationError;
use crate::ids::{GroupId, UserId};

/// Visibility class of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Private,
    Public,
    Community,
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GroupType::Private => "private",
            GroupType::Public => "public",
            GroupType::Community => "community",
        };
        f.write_str(label)
    }
}

/// Verification a community group may demand from joining users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityVerification {
    /// Handle of the external community the user must belong to.
    pub group_handle: String,
    /// Minimum months the user must have been part of that community.
    pub min_membership_months: u32,
}

/// Type-specific group settings.
///
/// Each group type carries exactly the fields it needs: a private group
/// cannot exist without its code, a public group has nothing extra.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupSettings {
    Private { secret_code: String },
    Public,
    Community {
        verification: Option<CommunityVerification>,
    },
}

impl GroupSettings {
    pub fn group_type(&self) -> GroupType {
        match self {
            GroupSettings::Private { .. } => GroupType::Private,
            GroupSettings::Public => GroupType::Public,
            GroupSettings::Community { .. } => GroupType::Community,
        }
    }

    /// Whether the group shows up in public listings.
    pub fn is_listed(&self) -> bool {
        !matches!(self, GroupSettings::Private { .. })
    }
}

/// Lifecycle status of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Accepting members and running the rotation.
    Active,
    /// Every seat is taken; the rotation continues.
    Full,
    /// Every member has received a payout.
    Completed,
    /// Frozen by an operator; no joins, contributions or payouts.
    Paused,
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GroupStatus::Active => "active",
            GroupStatus::Full => "full",
            GroupStatus::Completed => "completed",
            GroupStatus::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// Request to create a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupDraft {
    pub name: String,
    pub description: Option<String>,
    pub settings: GroupSettings,
    /// Contribution per member per period, in the smallest currency unit.
    pub monthly_amount: u64,
    pub max_members: u32,
    /// Overrides `AccountingConfig::default_treasury_window`.
    pub treasury_window: Option<u32>,
    /// Due date of the first period's contribution.
    pub first_due_date: NaiveDate,
}

impl GroupDraft {
    pub fn new(
        name: impl Into<String>,
        settings: GroupSettings,
        monthly_amount: u64,
        max_members: u32,
        first_due_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            settings,
            monthly_amount,
            max_members,
            treasury_window: None,
            first_due_date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_treasury_window(mut self, window: u32) -> Self {
        self.treasury_window = Some(window);
        self
    }

    /// Effective treasury window under the given configuration.
    pub fn effective_treasury_window(&self, config: &AccountingConfig) -> u32 {
        self.treasury_window
            .unwrap_or(config.default_treasury_window)
    }

    pub fn validate(&self, config: &AccountingConfig) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.monthly_amount == 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.max_members < config.min_members || self.max_members > config.max_members {
            return Err(ValidationError::MemberLimit {
                requested: self.max_members,
                min: config.min_members,
                max: config.max_members,
            });
        }
        if self
            .monthly_amount
            .checked_mul(u64::from(self.max_members))
            .is_none()
        {
            return Err(ValidationError::PotOverflow {
                monthly_amount: self.monthly_amount,
                max_members: self.max_members,
            });
        }

        let window = self.effective_treasury_window(config);
        if window > self.max_members {
            return Err(ValidationError::TreasuryWindowTooLarge {
                window,
                max_members: self.max_members,
            });
        }

        match &self.settings {
            GroupSettings::Private { secret_code } if secret_code.trim().is_empty() => {
                Err(ValidationError::MissingSecretCode)
            }
            GroupSettings::Community {
                verification: Some(verification),
            } if verification.group_handle.trim().is_empty() => {
                Err(ValidationError::MissingCommunityHandle)
            }
            _ => Ok(()),
        }
    }
}

/// A savings group as held by the membership store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub settings: GroupSettings,
    pub creator: UserId,
    pub monthly_amount: u64,
    pub max_members: u32,
    pub current_members: u32,
    /// Number of payouts already made; the next recipient holds order `current_cycle + 1`.
    pub current_cycle: u32,
    pub treasury_window: u32,
    pub status: GroupStatus,
    pub first_due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Materialize a validated draft. The creator is counted as member #1.
    pub fn from_draft(
        draft: GroupDraft,
        creator: UserId,
        config: &AccountingConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let treasury_window = draft.effective_treasury_window(config);
        Self {
            id: GroupId::generate(),
            name: draft.name,
            description: draft.description,
            settings: draft.settings,
            creator,
            monthly_amount: draft.monthly_amount,
            max_members: draft.max_members,
            current_members: 1,
            current_cycle: 0,
            treasury_window,
            status: if draft.max_members <= 1 {
                GroupStatus::Full
            } else {
                GroupStatus::Active
            },
            first_due_date: draft.first_due_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn group_type(&self) -> GroupType {
        self.settings.group_type()
    }

    pub fn open_seats(&self) -> u32 {
        self.max_members.saturating_sub(self.current_members)
    }

    pub fn is_full(&self) -> bool {
        self.current_members >= self.max_members
    }
}

/// Proof of community membership presented by a joining user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAttestation {
    pub group_handle: String,
    pub membership_months: u32,
}

/// Credentials a user presents when joining.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCredentials {
    pub secret_code: Option<String>,
    pub attestation: Option<CommunityAttestation>,
}

impl JoinCredentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            secret_code: Some(code.into()),
            attestation: None,
        }
    }

    pub fn with_attestation(group_handle: impl Into<String>, membership_months: u32) -> Self {
        Self {
            secret_code: None,
            attestation: Some(CommunityAttestation {
                group_handle: group_handle.into(),
                membership_months,
            }),
        }
    }
}
