//! Operator tooling layered on the subscriptions API.

use hyp3::{Hyp3Client, Hyp3Error, Subscription, SubscriptionUpdate};
use tracing::info;

use crate::reconcile::hazard_uuid_from_subscription_name;

/// Freshness summary across the monitored subscriptions.
///
/// Every subscription refreshed by a reconciliation pass receives the same
/// window end, and that end is the maximum on record, so "carries the most
/// recent end" is exactly "was refreshed by the most recent pass".
#[derive(Debug, PartialEq, Eq)]
pub struct FreshnessSummary {
    /// Most recent window end on record.
    pub latest_end: String,
    /// How many monitored subscriptions carry it.
    pub up_to_date: usize,
    /// Total monitored (hazard-derived) subscriptions.
    pub monitored: usize,
}

/// Summarize subscription freshness. Subscriptions whose name was not
/// derived from a hazard are ignored. `None` when nothing is monitored.
#[must_use]
pub fn freshness_summary(subscriptions: &[Subscription]) -> Option<FreshnessSummary> {
    let monitored: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| hazard_uuid_from_subscription_name(&s.job_specification.name).is_some())
        .collect();

    // The wire format is fixed-width ISO-8601, so lexicographic max is
    // chronological max.
    let latest_end = monitored
        .iter()
        .map(|s| s.search_parameters.end.as_str())
        .max()?
        .to_string();
    let up_to_date = monitored
        .iter()
        .filter(|s| s.search_parameters.end == latest_end)
        .count();

    Some(FreshnessSummary {
        latest_end,
        up_to_date,
        monitored: monitored.len(),
    })
}

/// Fetch all subscriptions and summarize their freshness.
///
/// # Errors
///
/// Returns an error on transport failure or a non-success response.
pub async fn check_subscriptions(
    hyp3: &Hyp3Client,
) -> Result<Option<FreshnessSummary>, Hyp3Error> {
    let subscriptions = hyp3.list_subscriptions().await?.subscriptions;
    Ok(freshness_summary(&subscriptions))
}

/// Disable every enabled subscription, one update per record. Returns how
/// many were disabled.
///
/// This is the one deliberate lifecycle termination the system offers;
/// subscriptions are still never deleted.
///
/// # Errors
///
/// Returns an error on transport failure or a non-success response.
pub async fn disable_all_subscriptions(hyp3: &Hyp3Client) -> Result<usize, Hyp3Error> {
    let subscriptions = hyp3.list_subscriptions().await?.subscriptions;
    let enabled: Vec<Subscription> = subscriptions.into_iter().filter(|s| s.enabled).collect();
    let total = enabled.len();

    for (index, subscription) in enabled.into_iter().enumerate() {
        let position = index + 1;
        info!(
            subscription_id = %subscription.subscription_id,
            "({position}/{total}) Disabling subscription"
        );
        let update = SubscriptionUpdate {
            enabled: Some(false),
            ..SubscriptionUpdate::default()
        };
        hyp3.update_subscription(&subscription.subscription_id, update)
            .await?;
    }

    Ok(total)
}
