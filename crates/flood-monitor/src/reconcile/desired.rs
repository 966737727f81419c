//! Desired subscription state derived from a hazard.

use hyp3::{JobParameters, JobSpecification, NewSubscription, SearchParameters};

use crate::config::SubscriptionWindows;
use crate::hazards::Hazard;
use crate::reconcile::subscription_name_from_hazard_uuid;
use crate::time::{datetime_from_epoch_ms, format_timestamp};

/// Window start for a hazard: the hazard's start minus the configured lead,
/// never earlier than the configured floor. Truncated to whole seconds.
#[must_use]
pub fn start_datetime_str(start_ms: i64, windows: &SubscriptionWindows) -> String {
    let start = datetime_from_epoch_ms(start_ms) - windows.start_lead;
    format_timestamp(start.max(windows.start_floor))
}

/// Window end: "now" plus the configured trail. Truncated to whole seconds.
#[must_use]
pub fn end_datetime_str(now_ms: i64, windows: &SubscriptionWindows) -> String {
    format_timestamp(datetime_from_epoch_ms(now_ms) + windows.end_trail)
}

/// Build the subscription this hazard should have right now.
///
/// Pure: same hazard, same clock, same windows, same result. Recomputed
/// fresh on every pass and never persisted locally.
#[must_use]
pub fn desired_subscription(
    hazard: &Hazard,
    now_ms: i64,
    windows: &SubscriptionWindows,
) -> NewSubscription {
    NewSubscription {
        search_parameters: SearchParameters {
            platform: "S1".to_string(),
            processing_level: "SLC".to_string(),
            beam_mode: vec!["IW".to_string()],
            polarization: vec!["VV+VH".to_string()],
            start: start_datetime_str(hazard.start_ms, windows),
            end: end_datetime_str(now_ms, windows),
            intersects_with: hazard.aoi(),
        },
        job_specification: JobSpecification {
            job_type: "WATER_MAP".to_string(),
            job_parameters: water_map_job_parameters(),
            name: subscription_name_from_hazard_uuid(&hazard.uuid),
        },
    }
}

/// WATER_MAP processing thresholds. Fixed configuration, identical for
/// every hazard; not part of the reconciliation logic's variability.
#[must_use]
pub fn water_map_job_parameters() -> JobParameters {
    JobParameters {
        resolution: 30,
        speckle_filter: true,
        max_vv_threshold: -15.5,
        max_vh_threshold: -23.0,
        hand_threshold: 15.0,
        hand_fraction: 0.8,
        membership_threshold: 0.45,
    }
}
