//! # Fees
//!
//! Rate table ([`schedule`]) and accrual buckets ([`book`]). The waterfall
//! itself — which fees apply to which operation, and in what order they are
//! capped against the remaining amount — lives with the vault operations.

pub mod book;
pub mod schedule;

pub use book::{FeeBook, FeeError};
pub use schedule::FeeSchedule;
