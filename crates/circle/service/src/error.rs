use circle_accounting::{AdmissionError, LifecycleError};
use circle_store::StorageError;
use circle_types::{GroupId, UserId, ValidationError};
use thiserror::Error;

pub type CircleResult<T> = Result<T, CircleError>;

/// Errors surfaced by [`crate::CircleService`].
#[derive(Debug, Error)]
pub enum CircleError {
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("user {user} is not a member of group {group}")]
    NotMember { group: GroupId, user: UserId },

    #[error("join rejected: {0}")]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid group: {0}")]
    Validation(#[from] ValidationError),

    #[error("contribution of {supplied} does not match monthly amount {expected}")]
    InvalidAmount { expected: u64, supplied: u64 },

    #[error("invalid period {0}")]
    InvalidPeriod(u32),

    #[error("member already contributed for period {period}")]
    AlreadyContributed { period: u32 },

    #[error("every member has already received a payout")]
    RotationExhausted,

    #[error("treasury cannot fund payout of {required}: short by {shortfall}")]
    InsufficientTreasury { required: u64, shortfall: u64 },

    /// The cycle advanced but the payout record could not be appended.
    #[error("payout for order {payout_order} in group {group} was made but not logged: {source}")]
    PayoutNotLogged {
        group: GroupId,
        payout_order: u32,
        #[source]
        source: StorageError,
    },

    #[error("gave up joining after {attempts} contended attempts")]
    Contention { attempts: u32 },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
