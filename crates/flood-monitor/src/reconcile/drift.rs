//! Drift detection between recorded and freshly computed parameters.
//!
//! Policy: log-then-update. Drift is surfaced as warnings naming the
//! subscription and both values, and the update that follows applies the
//! fresh values unconditionally. Stale values are never preserved and drift
//! never blocks an update.

use hyp3::SearchParameters;
use tracing::warn;

/// One drifted field: what the store has recorded vs what would be
/// computed now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDrift {
    pub recorded: String,
    pub desired: String,
}

/// Divergence between a subscription's recorded window start / AOI and the
/// values freshly derived from the hazard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub start: Option<FieldDrift>,
    pub aoi: Option<FieldDrift>,
}

impl DriftReport {
    /// Compare recorded search parameters against freshly computed ones.
    /// The window end is excluded: it moves forward on every pass.
    #[must_use]
    pub fn detect(recorded: &SearchParameters, desired: &SearchParameters) -> Self {
        let start = (recorded.start != desired.start).then(|| FieldDrift {
            recorded: recorded.start.clone(),
            desired: desired.start.clone(),
        });
        let aoi = (recorded.intersects_with != desired.intersects_with).then(|| FieldDrift {
            recorded: recorded.intersects_with.clone(),
            desired: desired.intersects_with.clone(),
        });
        Self { start, aoi }
    }

    /// Whether any field diverged.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.start.is_some() || self.aoi.is_some()
    }

    /// Emit one warning per drifted field.
    pub fn log(&self, subscription_id: &str) {
        if let Some(drift) = &self.start {
            warn!(
                subscription_id,
                recorded = %drift.recorded,
                desired = %drift.desired,
                "Subscription start drifted; applying fresh value"
            );
        }
        if let Some(drift) = &self.aoi {
            warn!(
                subscription_id,
                recorded = %drift.recorded,
                desired = %drift.desired,
                "Subscription AOI drifted; applying fresh value"
            );
        }
    }
}
