//! Hazard records from the PDC feed, and the monitoring filter.

use serde::{Deserialize, Deserializer, Serialize};

const HAZARD_TYPE_FLOOD: &str = "FLOOD";
const HAZARD_CATEGORY_EVENT: &str = "EVENT";
const HAZARD_SEVERITY_WARNING: &str = "WARNING";

/// One hazard as reported by the feed. Read-only snapshot; the feed owns
/// these records and this system never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    /// Stable opaque identifier; the subscription name is derived from it.
    pub uuid: String,
    /// Numeric feed key, used only to address per-hazard feed endpoints.
    #[serde(rename = "hazard_ID")]
    pub hazard_id: i64,
    #[serde(rename = "type_ID")]
    pub type_id: String,
    #[serde(rename = "category_ID")]
    pub category_id: String,
    #[serde(rename = "severity_ID")]
    pub severity_id: String,
    /// Hazard start as epoch milliseconds. The feed serializes this as a
    /// string or a number depending on endpoint; both forms are accepted.
    #[serde(rename = "start_Date", deserialize_with = "epoch_ms")]
    pub start_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Alert geometry as WKT, resolved from the feed's alert-geography
    /// endpoint. Absent until resolved.
    #[serde(skip)]
    pub geometry: Option<String>,
}

impl Hazard {
    /// WKT for the hazard's reported coordinates.
    #[must_use]
    pub fn point_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// The hazard's area of interest: the resolved alert geometry when
    /// present, otherwise the reported point location. Opaque text either
    /// way; geometry is owned by the feed.
    #[must_use]
    pub fn aoi(&self) -> String {
        self.geometry.clone().unwrap_or_else(|| self.point_wkt())
    }

    /// Whether this hazard is one the pipeline monitors: an in-progress
    /// flood event at warning severity. Advisories, forecasts, and
    /// future-dated hazards are excluded.
    #[must_use]
    pub fn is_active_flood_warning(&self, now_ms: i64) -> bool {
        self.type_id == HAZARD_TYPE_FLOOD
            && self.category_id == HAZARD_CATEGORY_EVENT
            && self.severity_id == HAZARD_SEVERITY_WARNING
            && self.start_ms <= now_ms
    }
}

/// Select the hazards worth monitoring, preserving feed order.
#[must_use]
pub fn filter_hazards(hazards: Vec<Hazard>, now_ms: i64) -> Vec<Hazard> {
    hazards
        .into_iter()
        .filter(|hazard| hazard.is_active_flood_warning(now_ms))
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochMs {
    Number(i64),
    Text(String),
}

fn epoch_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match EpochMs::deserialize(deserializer)? {
        EpochMs::Number(ms) => Ok(ms),
        EpochMs::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
