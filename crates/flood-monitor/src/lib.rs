//! Flood hazard monitoring for HyP3.
//!
//! Watches the PDC hazard feed and keeps one HyP3 water-map subscription
//! per active flood warning: filter the feed, derive each hazard's desired
//! subscription state, then create or refresh the recorded one through the
//! subscriptions API. Subscriptions are never deleted; one that stops being
//! refreshed lapses when its window end passes.
//!
//! The external subscription store is the sole source of truth. Nothing is
//! cached between passes; every pass re-queries it fresh.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod hazards;
pub mod ops;
pub mod pdc;
pub mod pipeline;
pub mod reconcile;
pub mod time;

pub use config::{Config, SubscriptionWindows};
pub use hazards::{filter_hazards, Hazard};
pub use pdc::{PdcClient, PdcError};
pub use reconcile::{
    DriftReport, HazardOutcome, ReconcileAction, ReconcileError, ReconcileReport, Reconciler,
};
