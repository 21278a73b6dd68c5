//! Tax calculation for the batch recompute.
//!
//! The strategies are pure functions of a jurisdiction's rules and an
//! income; they never touch the store.

pub mod common;
pub mod strategies;

pub use strategies::{Evaluation, evaluate, flat, percentage, progressive};
