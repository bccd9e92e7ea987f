//! Storage contracts for savings circles.
//!
//! The accounting rules never persist anything themselves. This crate defines
//! what they need from the outside world:
//! - membership state, with a conditional "reserve next slot" so payout orders
//!   stay unique and contiguous under concurrent joins
//! - an append-only, hash-chained log of contribution and payout records
//!
//! `InMemoryCircleStorage` is the deterministic reference adapter. A
//! transactional backend implements the same traits with conditional updates.

#![deny(unsafe_code)]

mod error;
pub mod ledger;
pub mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use ledger::{LedgerEntry, LedgerEntryKind, RecordLedger};
pub use memory::InMemoryCircleStorage;
pub use traits::{CircleStorage, MembershipStore, RecordStore};
