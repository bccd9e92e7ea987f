//! # circle-types
//!
//! Shared vocabulary for the savings circle workspace:
//!
//! - **Identifiers**: `GroupId`, `MemberId`, `UserId`, `RecordId`
//! - **Groups**: typed settings per group type (private groups carry a
//!   secret code, community groups may carry verification parameters)
//! - **Records**: members, contributions and payout events as persisted by
//!   the storage collaborator
//! - **Configuration**: `AccountingConfig`, loadable from TOML
//!
//! Amounts are always integers in the smallest currency unit.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod group;
pub mod ids;
pub mod records;

pub use config::AccountingConfig;
pub use error::{ConfigError, ValidationError};
pub use group::{
    CommunityAttestation, CommunityVerification, Group, GroupDraft, GroupSettings, GroupStatus,
    GroupType, JoinCredentials,
};
pub use ids::{GroupId, MemberId, RecordId, UserId};
pub use records::{
    ContributionRecord, ContributionStatus, Member, PaymentState, PayoutBreakdown, PayoutEvent,
};
