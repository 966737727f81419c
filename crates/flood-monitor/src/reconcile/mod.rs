//! Hazard-to-subscription reconciliation.
//!
//! Each active hazard maps to exactly one subscription through a
//! deterministic name. One pass walks the filtered hazards in feed order
//! and, per hazard: derives the desired subscription state, locates the
//! recorded one by name, then creates it or refreshes its window. Failures
//! are contained at the hazard boundary so one broken hazard cannot corrupt
//! the rest of the batch. Subscriptions are never deleted.

pub mod desired;
pub mod drift;
pub mod reconciler;

pub use desired::desired_subscription;
pub use drift::{DriftReport, FieldDrift};
pub use reconciler::{
    HazardOutcome, ReconcileAction, ReconcileError, ReconcileReport, Reconciler,
};

/// Prefix that ties a subscription name to the hazard it monitors.
pub const SUBSCRIPTION_NAME_PREFIX: &str = "PDC-hazard-";

/// Deterministic subscription name for a hazard.
#[must_use]
pub fn subscription_name_from_hazard_uuid(uuid: &str) -> String {
    format!("{SUBSCRIPTION_NAME_PREFIX}{uuid}")
}

/// Inverse of [`subscription_name_from_hazard_uuid`]. `None` for names this
/// system did not produce.
#[must_use]
pub fn hazard_uuid_from_subscription_name(name: &str) -> Option<&str> {
    name.strip_prefix(SUBSCRIPTION_NAME_PREFIX)
}
