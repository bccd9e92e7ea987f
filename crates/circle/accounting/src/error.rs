use circle_types::GroupStatus;
use thiserror::Error;

/// A join request the admission rules refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("group is full")]
    Full,

    #[error("user is already a member of this group")]
    Duplicate,

    #[error("secret code does not match")]
    InvalidCode,

    #[error("community verification failed")]
    Unverified,
}

/// An operation not permitted in the group's current status.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("group is paused")]
    Paused,

    #[error("group has completed its rotation")]
    Completed,

    #[error("rotation has not started: {current_members} of {max_members} seats taken")]
    NotStarted {
        current_members: u32,
        max_members: u32,
    },

    #[error("cannot move group from {from} to {to}")]
    InvalidTransition { from: GroupStatus, to: GroupStatus },
}
