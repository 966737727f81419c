//! One full reconciliation pass: fetch, filter, converge, report.

use anyhow::{Context, Result};
use chrono::Utc;
use hyp3::Hyp3Client;
use tracing::info;

use crate::config::Config;
use crate::hazards;
use crate::pdc::PdcClient;
use crate::reconcile::{ReconcileReport, Reconciler};

/// Run a single reconciliation pass against the live APIs.
///
/// Failures before the per-hazard loop (configuration, login, the feed
/// fetch) are fatal; everything after is isolated per hazard and recorded
/// in the returned report.
pub async fn run_once(config: &Config, dry_run: bool) -> Result<ReconcileReport> {
    if dry_run {
        info!("Dry run: creates are validate-only, updates are skipped");
    }

    info!(
        pdc_api_url = %config.pdc_api_url,
        hyp3_api_url = %config.hyp3.api_url,
        earthdata_username = %config.hyp3.earthdata_username,
        "Starting reconciliation pass"
    );

    let pdc = PdcClient::new(&config.pdc_api_url, &config.pdc_auth_token)
        .context("building PDC client")?;
    let hyp3 = Hyp3Client::new(&config.hyp3.api_url).context("building HyP3 client")?;
    hyp3.login(
        &config.hyp3.earthdata_username,
        &config.hyp3.earthdata_password,
    )
    .await
    .context("establishing Earthdata session")?;

    info!("Fetching active hazards");
    let raw = pdc
        .active_hazards()
        .await
        .context("fetching active hazards")?;
    info!(count = raw.len(), "Active hazards (before filtering)");

    let now_ms = Utc::now().timestamp_millis();
    let active = hazards::filter_hazards(raw, now_ms);
    info!(count = active.len(), "Active hazards (after filtering)");

    let reconciler = Reconciler::new(pdc, hyp3, config.windows.clone(), dry_run);
    let report = reconciler.reconcile_all(active, now_ms).await;

    info!(
        created = report.created(),
        updated = report.updated(),
        failed = report.failed(),
        "Reconciliation pass complete"
    );

    Ok(report)
}
