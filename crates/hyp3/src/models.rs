//! Wire types for the HyP3 subscriptions API.
//!
//! Field names follow the API's JSON exactly (`processingLevel`,
//! `intersectsWith`, `validate_only`, ...). Subscription start/end datetimes
//! are kept as strings in the `YYYY-MM-DDTHH:MM:SSZ` wire format on both
//! sides of the exchange, so equality comparisons never go through a parse.

use serde::{Deserialize, Serialize};

/// Search window and scene selection criteria for a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub platform: String,
    pub processing_level: String,
    pub beam_mode: Vec<String>,
    pub polarization: Vec<String>,
    /// Window start, UTC, second precision, `Z` suffix.
    pub start: String,
    /// Window end, UTC, second precision, `Z` suffix.
    pub end: String,
    /// Area of interest as WKT text.
    pub intersects_with: String,
}

/// Processing job submitted for each matching scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpecification {
    pub job_type: String,
    pub job_parameters: JobParameters,
    /// Subscription name; the monitoring pipeline derives it from the
    /// hazard identity and uses it as the lookup key.
    pub name: String,
}

/// Tuning parameters forwarded to the processing job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    pub resolution: u32,
    pub speckle_filter: bool,
    pub max_vv_threshold: f64,
    pub max_vh_threshold: f64,
    pub hand_threshold: f64,
    pub hand_fraction: f64,
    pub membership_threshold: f64,
}

/// Payload for creating a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub search_parameters: SearchParameters,
    pub job_specification: JobSpecification,
}

/// A subscription record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_id: String,
    pub search_parameters: SearchParameters,
    pub job_specification: JobSpecification,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Mutable fields accepted by the update endpoint. Absent fields are left
/// untouched by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersects_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Request body for the create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub subscription: NewSubscription,
    pub validate_only: bool,
}

/// Response envelope for the create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub subscription: Subscription,
}

/// Response envelope for subscription queries.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionsResponse {
    pub subscriptions: Vec<Subscription>,
}
