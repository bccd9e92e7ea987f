//! Savings circle service.
//!
//! `CircleService` is what callers talk to. Each operation reads state from
//! the storage collaborator, asks `circle-accounting` for a decision or an
//! amount, and writes the result back through a conditional update.

#![deny(unsafe_code)]

mod error;
mod service;

pub use error::{CircleError, CircleResult};
pub use service::CircleService;
