//! # campus-events
//!
//! Registration consistency and capacity-enforcement engine for campus
//! events.
//!
//! Two independently persisted JSON documents back the system: events (with
//! embedded attendee lists) and accounts (with embedded registered-event
//! lists). This crate keeps them mutually consistent under capacity
//! constraints. Presentation, raw report rendering, and anything resembling
//! a transaction log are external collaborators.
//!
//! ## Architecture
//!
//! ```text
//! Callers (UI, tests)
//!     │
//!     ├── RegistrationCoordinator (service/)
//!     │
//!     ├── EventRegistry (domain/)      ── source of truth for membership
//!     ├── AccountRegistry (domain/)    ── mirrors registration references
//!     │
//!     └── JsonStore (persistence/)     ── one document per registry
//! ```
//!
//! The core correctness property: for every account `u` and event `e`,
//! `e.id ∈ u.registered_events ⇔ u.username ∈ e.attendees`. There is no
//! transaction spanning the two stores, so the coordinator maintains the
//! property procedurally and reports partial failure distinctly instead of
//! pretending atomicity.

pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod report;
pub mod service;
