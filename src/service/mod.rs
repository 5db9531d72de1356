//! Service layer: the cross-registry registration protocol.

pub mod registration;

pub use registration::{ReconcileReport, RegistrationCoordinator};
