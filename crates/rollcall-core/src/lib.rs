//! Core types, store traits and roster rules for Rollcall.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The two rule engines live here:
//!
//! - [`naming`] decides the persisted name of a new student and resolves
//!   same-name collisions with single-letter suffixes.
//! - [`roster`] computes which students appear in a roster on a given date
//!   and performs the unassigned / new-friend / class-assigned transitions.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod class;
pub mod error;
pub mod naming;
pub mod report;
pub mod roster;
pub mod staff;
pub mod store;
pub mod student;
pub mod worship;

pub use error::{Error, Result, WriteStep};

#[cfg(test)]
mod memory;
