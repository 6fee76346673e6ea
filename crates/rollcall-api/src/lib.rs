//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::WorshipStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(store.clone()))
//! ```
//!
//! Dates in paths and bodies are `YYYY-MM-DD`. Wherever a date is optional
//! it defaults to today in the server's local time zone.

pub mod classes;
pub mod error;
pub mod logs;
pub mod stats;
pub mod students;
pub mod teachers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::{Local, NaiveDate};
use rollcall_core::store::WorshipStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: WorshipStore + Clone + 'static,
{
  Router::new()
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>).delete(students::delete_one::<S>),
    )
    .route("/students/{id}/deactivate", post(students::deactivate::<S>))
    .route("/students/{id}/new-friend", post(students::tag_new_friend::<S>))
    .route("/students/{id}/assign", post(students::assign::<S>))
    .route("/students/{id}/unassign", post(students::unassign::<S>))
    .route(
      "/students/{id}/tags/{tag}",
      put(students::add_tag::<S>).delete(students::remove_tag::<S>),
    )
    // Classes and rosters
    .route("/classes", get(classes::list::<S>).post(classes::create::<S>))
    .route("/classes/{id}", axum::routing::delete(classes::delete_one::<S>))
    .route("/classes/{id}/roster", get(classes::roster::<S>))
    .route("/new-friends", get(classes::new_friends::<S>))
    // Teachers
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    .route("/teachers/{id}", put(teachers::set_active::<S>))
    // Worship logs
    .route("/logs", get(logs::list::<S>))
    .route("/logs/{date}", get(logs::get_one::<S>).put(logs::upsert::<S>))
    .route("/logs/{date}/attendance", get(logs::list_attendance::<S>))
    .route(
      "/logs/{date}/attendance/{student_id}",
      put(logs::set_attendance::<S>).delete(logs::clear_attendance::<S>),
    )
    .route("/logs/{date}/staff", get(logs::list_staff::<S>))
    .route(
      "/logs/{date}/staff/{teacher_id}",
      put(logs::mark_staff::<S>).delete(logs::clear_staff::<S>),
    )
    .route(
      "/logs/{date}/offerings",
      get(logs::list_offerings::<S>).put(logs::upsert_offering::<S>),
    )
    .route("/logs/{date}/snapshot", get(logs::snapshot::<S>))
    // Statistics
    .route("/stats", get(stats::summary::<S>))
    .route("/stats/{student_id}", get(stats::student::<S>))
    .with_state(store)
}

/// The reference date used when a request leaves it out.
pub(crate) fn today() -> NaiveDate { Local::now().date_naive() }
