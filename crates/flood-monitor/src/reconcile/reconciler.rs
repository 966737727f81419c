//! The create-or-update convergence loop.

use hyp3::{Hyp3Client, Hyp3Error, Subscription, SubscriptionUpdate, SubscriptionsResponse};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::SubscriptionWindows;
use crate::hazards::Hazard;
use crate::pdc::{PdcClient, PdcError};
use crate::reconcile::desired::desired_subscription;
use crate::reconcile::drift::DriftReport;
use crate::reconcile::subscription_name_from_hazard_uuid;

/// A failure scoped to a single hazard within a pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Hazard feed request failed.
    #[error("hazard feed error: {0}")]
    Pdc(#[from] PdcError),

    /// Subscription API request failed.
    #[error("subscription API error: {0}")]
    Hyp3(#[from] Hyp3Error),

    /// The store holds several records under one deterministic name.
    /// Corrupted external state; reported, never auto-repaired.
    #[error("got {count} subscriptions with name {name} (expected 0 or 1)")]
    DuplicateSubscriptionNames { name: String, count: usize },
}

/// What the reconciler did for one hazard.
#[derive(Debug, Clone)]
pub enum ReconcileAction {
    /// No subscription existed; one was submitted.
    Created { subscription_id: String },
    /// A subscription existed; its window was refreshed.
    Updated {
        subscription_id: String,
        drift: DriftReport,
    },
}

/// Outcome of one hazard within a pass.
#[derive(Debug)]
pub struct HazardOutcome {
    pub uuid: String,
    pub name: String,
    pub result: Result<ReconcileAction, ReconcileError>,
}

/// Per-hazard outcomes of a full reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub outcomes: Vec<HazardOutcome>,
}

impl ReconcileReport {
    #[must_use]
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ReconcileAction::Created { .. })))
            .count()
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ReconcileAction::Updated { .. })))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Drives the recorded subscriptions toward the active hazard set.
///
/// Create-or-update only: a hazard with no subscription gets one, a hazard
/// with one gets its window refreshed. Nothing is ever deleted.
pub struct Reconciler {
    pdc: PdcClient,
    hyp3: Hyp3Client,
    windows: SubscriptionWindows,
    dry_run: bool,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        pdc: PdcClient,
        hyp3: Hyp3Client,
        windows: SubscriptionWindows,
        dry_run: bool,
    ) -> Self {
        Self {
            pdc,
            hyp3,
            windows,
            dry_run,
        }
    }

    /// Reconcile every hazard, sequentially, in feed order.
    ///
    /// A failure on one hazard is logged, recorded in the report, and does
    /// not stop the rest of the batch.
    pub async fn reconcile_all(&self, hazards: Vec<Hazard>, now_ms: i64) -> ReconcileReport {
        let total = hazards.len();
        let mut report = ReconcileReport::default();

        for (index, hazard) in hazards.into_iter().enumerate() {
            let position = index + 1;
            let uuid = hazard.uuid.clone();
            let name = subscription_name_from_hazard_uuid(&uuid);
            info!(uuid = %uuid, "({position}/{total}) Processing hazard");

            let result = self.reconcile_one(hazard, now_ms).await;
            if let Err(e) = &result {
                error!(uuid = %uuid, error = %e, "Error while processing hazard");
            }

            report.outcomes.push(HazardOutcome { uuid, name, result });
        }

        report
    }

    /// Converge a single hazard: resolve its AOI, locate the subscription
    /// recorded under its deterministic name, then create or refresh it.
    async fn reconcile_one(
        &self,
        mut hazard: Hazard,
        now_ms: i64,
    ) -> Result<ReconcileAction, ReconcileError> {
        debug!(hazard_id = hazard.hazard_id, "Fetching alert geography");
        hazard.geometry = Some(self.pdc.alert_geography(hazard.hazard_id).await?);

        let desired = desired_subscription(&hazard, now_ms, &self.windows);
        let name = desired.job_specification.name.clone();

        debug!(name = %name, "Fetching existing subscription");
        let existing = unique_subscription(self.hyp3.subscriptions_by_name(&name).await?, &name)?;

        match existing {
            None => {
                info!(name = %name, dry_run = self.dry_run, "No existing subscription; submitting");
                let stored = self.hyp3.submit_subscription(desired, self.dry_run).await?;
                info!(subscription_id = %stored.subscription_id, "Created subscription");
                Ok(ReconcileAction::Created {
                    subscription_id: stored.subscription_id,
                })
            }
            Some(existing) => {
                let drift =
                    DriftReport::detect(&existing.search_parameters, &desired.search_parameters);
                drift.log(&existing.subscription_id);

                if self.dry_run {
                    info!(
                        subscription_id = %existing.subscription_id,
                        "(dry run) Skipping subscription update"
                    );
                } else {
                    let update = SubscriptionUpdate {
                        start: Some(desired.search_parameters.start.clone()),
                        end: Some(desired.search_parameters.end.clone()),
                        intersects_with: Some(desired.search_parameters.intersects_with.clone()),
                        enabled: Some(true),
                    };
                    self.hyp3
                        .update_subscription(&existing.subscription_id, update)
                        .await?;
                    info!(subscription_id = %existing.subscription_id, "Updated subscription");
                }

                Ok(ReconcileAction::Updated {
                    subscription_id: existing.subscription_id,
                    drift,
                })
            }
        }
    }
}

/// Resolve a name query to at most one record.
///
/// # Errors
///
/// Returns [`ReconcileError::DuplicateSubscriptionNames`] when the store
/// holds more than one record under the name.
pub fn unique_subscription(
    response: SubscriptionsResponse,
    name: &str,
) -> Result<Option<Subscription>, ReconcileError> {
    let mut subscriptions = response.subscriptions;
    match subscriptions.len() {
        0 => Ok(None),
        1 => Ok(subscriptions.pop()),
        count => Err(ReconcileError::DuplicateSubscriptionNames {
            name: name.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyp3::{JobParameters, JobSpecification, SearchParameters};

    fn subscription(id: &str, name: &str) -> Subscription {
        Subscription {
            subscription_id: id.to_string(),
            search_parameters: SearchParameters {
                platform: "S1".to_string(),
                processing_level: "SLC".to_string(),
                beam_mode: vec!["IW".to_string()],
                polarization: vec!["VV+VH".to_string()],
                start: "2022-04-19T15:08:31Z".to_string(),
                end: "2022-04-19T19:08:31Z".to_string(),
                intersects_with: "POINT(0 0)".to_string(),
            },
            job_specification: JobSpecification {
                job_type: "WATER_MAP".to_string(),
                job_parameters: JobParameters {
                    resolution: 30,
                    speckle_filter: true,
                    max_vv_threshold: -15.5,
                    max_vh_threshold: -23.0,
                    hand_threshold: 15.0,
                    hand_fraction: 0.8,
                    membership_threshold: 0.45,
                },
                name: name.to_string(),
            },
            enabled: true,
            creation_date: None,
        }
    }

    #[test]
    fn test_unique_subscription_not_found() {
        let response = SubscriptionsResponse {
            subscriptions: vec![],
        };
        assert!(unique_subscription(response, "PDC-hazard-123")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unique_subscription_single_match() {
        let response = SubscriptionsResponse {
            subscriptions: vec![subscription("s1", "PDC-hazard-123")],
        };
        let found = unique_subscription(response, "PDC-hazard-123")
            .unwrap()
            .unwrap();
        assert_eq!(found.subscription_id, "s1");
    }

    #[test]
    fn test_unique_subscription_duplicates_are_an_error() {
        let response = SubscriptionsResponse {
            subscriptions: vec![
                subscription("s1", "PDC-hazard-123"),
                subscription("s2", "PDC-hazard-123"),
            ],
        };
        let error = unique_subscription(response, "PDC-hazard-123").unwrap_err();
        match error {
            ReconcileError::DuplicateSubscriptionNames { name, count } => {
                assert_eq!(name, "PDC-hazard-123");
                assert_eq!(count, 2);
            }
            other => panic!("expected DuplicateSubscriptionNames, got {other:?}"),
        }
    }

    #[test]
    fn test_report_counts() {
        let report = ReconcileReport {
            outcomes: vec![
                HazardOutcome {
                    uuid: "a".to_string(),
                    name: "PDC-hazard-a".to_string(),
                    result: Ok(ReconcileAction::Created {
                        subscription_id: "s1".to_string(),
                    }),
                },
                HazardOutcome {
                    uuid: "b".to_string(),
                    name: "PDC-hazard-b".to_string(),
                    result: Ok(ReconcileAction::Updated {
                        subscription_id: "s2".to_string(),
                        drift: DriftReport::default(),
                    }),
                },
                HazardOutcome {
                    uuid: "c".to_string(),
                    name: "PDC-hazard-c".to_string(),
                    result: Err(ReconcileError::DuplicateSubscriptionNames {
                        name: "PDC-hazard-c".to_string(),
                        count: 2,
                    }),
                },
            ],
        };

        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.failed(), 1);
    }
}
