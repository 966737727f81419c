//! End-to-end reconciliation scenarios against mock PDC and HyP3 servers.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flood_monitor::config::SubscriptionWindows;
use flood_monitor::hazards::Hazard;
use flood_monitor::pdc::PdcClient;
use flood_monitor::reconcile::{ReconcileAction, ReconcileError, Reconciler};
use hyp3::Hyp3Client;

/// 2022-04-19T16:08:31Z
const NOW_MS: i64 = 1_650_388_111_000;

const POLYGON: &str = "POLYGON((0 0,1 0,1 1,0 1,0 0))";

fn hazard(uuid: &str, hazard_id: i64) -> Hazard {
    Hazard {
        uuid: uuid.to_string(),
        hazard_id,
        type_id: "FLOOD".to_string(),
        category_id: "EVENT".to_string(),
        severity_id: "WARNING".to_string(),
        start_ms: NOW_MS,
        latitude: 38.39,
        longitude: 47.94,
        geometry: None,
    }
}

fn reconciler(pdc: &MockServer, hyp3: &MockServer, dry_run: bool) -> Reconciler {
    Reconciler::new(
        PdcClient::new(pdc.uri(), "token").unwrap(),
        Hyp3Client::new(hyp3.uri()).unwrap(),
        SubscriptionWindows::default(),
        dry_run,
    )
}

async fn mount_alert_geography(pdc: &MockServer, hazard_id: i64, wkt: &str) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/hp_srv/services/hazard/{hazard_id}/alertGeography"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"wkt": {"text": wkt}})))
        .mount(pdc)
        .await;
}

fn desired_search_parameters(aoi: &str) -> serde_json::Value {
    // With the default windows and NOW_MS as both hazard start and clock:
    // start = 16:08:31 - 1 h lead, end = 16:08:31 + 3 h trail.
    json!({
        "platform": "S1",
        "processingLevel": "SLC",
        "beamMode": ["IW"],
        "polarization": ["VV+VH"],
        "start": "2022-04-19T15:08:31Z",
        "end": "2022-04-19T19:08:31Z",
        "intersectsWith": aoi
    })
}

fn subscription_json(id: &str, name: &str, start: &str, aoi: &str) -> serde_json::Value {
    json!({
        "subscription_id": id,
        "search_parameters": {
            "platform": "S1",
            "processingLevel": "SLC",
            "beamMode": ["IW"],
            "polarization": ["VV+VH"],
            "start": start,
            "end": "2022-04-19T12:00:00Z",
            "intersectsWith": aoi
        },
        "job_specification": {
            "job_type": "WATER_MAP",
            "job_parameters": {
                "resolution": 30,
                "speckle_filter": true,
                "max_vv_threshold": -15.5,
                "max_vh_threshold": -23.0,
                "hand_threshold": 15.0,
                "hand_fraction": 0.8,
                "membership_threshold": 0.45
            },
            "name": name
        },
        "enabled": true
    })
}

fn job_specification_json(name: &str) -> serde_json::Value {
    json!({
        "job_type": "WATER_MAP",
        "job_parameters": {
            "resolution": 30,
            "speckle_filter": true,
            "max_vv_threshold": -15.5,
            "max_vh_threshold": -23.0,
            "hand_threshold": 15.0,
            "hand_fraction": 0.8,
            "membership_threshold": 0.45
        },
        "name": name
    })
}

#[tokio::test]
async fn test_unknown_hazard_issues_exactly_one_create() {
    let pdc = MockServer::start().await;
    let hyp3 = MockServer::start().await;
    let name = "PDC-hazard-595467f9-77f2-4036-87d3-ef9e5e4ad939";

    mount_alert_geography(&pdc, 176, POLYGON).await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subscriptions": []})))
        .expect(1)
        .mount(&hyp3)
        .await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(body_json(json!({
            "subscription": {
                "search_parameters": desired_search_parameters(POLYGON),
                "job_specification": job_specification_json(name)
            },
            "validate_only": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "subscription": subscription_json("new-id", name, "2022-04-19T15:08:31Z", POLYGON)
            })),
        )
        .expect(1)
        .mount(&hyp3)
        .await;

    let report = reconciler(&pdc, &hyp3, false)
        .reconcile_all(
            vec![hazard("595467f9-77f2-4036-87d3-ef9e5e4ad939", 176)],
            NOW_MS,
        )
        .await;

    assert_eq!(report.created(), 1);
    assert_eq!(report.updated(), 0);
    assert_eq!(report.failed(), 0);
    match &report.outcomes[0].result {
        Ok(ReconcileAction::Created { subscription_id }) => {
            assert_eq!(subscription_id, "new-id");
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn test_known_hazard_issues_exactly_one_update() {
    let pdc = MockServer::start().await;
    let hyp3 = MockServer::start().await;
    let name = "PDC-hazard-abc";

    mount_alert_geography(&pdc, 42, POLYGON).await;

    // Recorded with a stale start and a stale AOI: both must be reported
    // as drift and overwritten.
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscriptions": [
                subscription_json("s1", name, "2022-04-19T14:00:00Z", "POINT(1 1)")
            ]
        })))
        .expect(1)
        .mount(&hyp3)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/subscriptions/s1"))
        .and(body_json(json!({
            "start": "2022-04-19T15:08:31Z",
            "end": "2022-04-19T19:08:31Z",
            "intersectsWith": POLYGON,
            "enabled": true
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(subscription_json("s1", name, "2022-04-19T15:08:31Z", POLYGON)),
        )
        .expect(1)
        .mount(&hyp3)
        .await;

    let report = reconciler(&pdc, &hyp3, false)
        .reconcile_all(vec![hazard("abc", 42)], NOW_MS)
        .await;

    assert_eq!(report.created(), 0);
    assert_eq!(report.updated(), 1);
    match &report.outcomes[0].result {
        Ok(ReconcileAction::Updated {
            subscription_id,
            drift,
        }) => {
            assert_eq!(subscription_id, "s1");
            assert!(drift.start.is_some());
            assert!(drift.aoi.is_some());
        }
        other => panic!("expected Updated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_on_one_hazard_does_not_stop_the_batch() {
    let pdc = MockServer::start().await;
    let hyp3 = MockServer::start().await;

    mount_alert_geography(&pdc, 1, POLYGON).await;
    mount_alert_geography(&pdc, 2, POLYGON).await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", "PDC-hazard-aaa"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&hyp3)
        .await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", "PDC-hazard-bbb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subscriptions": []})))
        .expect(1)
        .mount(&hyp3)
        .await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscription": subscription_json(
                "bbb-id",
                "PDC-hazard-bbb",
                "2022-04-19T15:08:31Z",
                POLYGON
            )
        })))
        .expect(1)
        .mount(&hyp3)
        .await;

    let report = reconciler(&pdc, &hyp3, false)
        .reconcile_all(vec![hazard("aaa", 1), hazard("bbb", 2)], NOW_MS)
        .await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);
    assert_eq!(report.outcomes[0].uuid, "aaa");
    assert!(report.outcomes[0].result.is_err());
    assert_eq!(report.outcomes[1].uuid, "bbb");
    assert!(report.outcomes[1].result.is_ok());
}

#[tokio::test]
async fn test_duplicate_names_fail_that_hazard_without_writes() {
    let pdc = MockServer::start().await;
    let hyp3 = MockServer::start().await;
    let name = "PDC-hazard-abc";

    mount_alert_geography(&pdc, 42, POLYGON).await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscriptions": [
                subscription_json("s1", name, "2022-04-19T15:08:31Z", POLYGON),
                subscription_json("s2", name, "2022-04-19T15:08:31Z", POLYGON)
            ]
        })))
        .mount(&hyp3)
        .await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&hyp3)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/subscriptions/s1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&hyp3)
        .await;

    let report = reconciler(&pdc, &hyp3, false)
        .reconcile_all(vec![hazard("abc", 42)], NOW_MS)
        .await;

    assert_eq!(report.failed(), 1);
    match &report.outcomes[0].result {
        Err(ReconcileError::DuplicateSubscriptionNames { name, count }) => {
            assert_eq!(name, "PDC-hazard-abc");
            assert_eq!(*count, 2);
        }
        other => panic!("expected DuplicateSubscriptionNames, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dry_run_validates_creates_and_skips_updates() {
    let pdc = MockServer::start().await;
    let hyp3 = MockServer::start().await;

    mount_alert_geography(&pdc, 1, POLYGON).await;
    mount_alert_geography(&pdc, 2, POLYGON).await;

    // Hazard "new" has no subscription: expect a validate-only submit.
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", "PDC-hazard-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subscriptions": []})))
        .mount(&hyp3)
        .await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(body_json(json!({
            "subscription": {
                "search_parameters": desired_search_parameters(POLYGON),
                "job_specification": job_specification_json("PDC-hazard-new")
            },
            "validate_only": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscription": subscription_json(
                "validated",
                "PDC-hazard-new",
                "2022-04-19T15:08:31Z",
                POLYGON
            )
        })))
        .expect(1)
        .mount(&hyp3)
        .await;

    // Hazard "old" has one: the update must be skipped entirely.
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("name", "PDC-hazard-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscriptions": [
                subscription_json("s1", "PDC-hazard-old", "2022-04-19T15:08:31Z", POLYGON)
            ]
        })))
        .mount(&hyp3)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/subscriptions/s1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&hyp3)
        .await;

    let report = reconciler(&pdc, &hyp3, true)
        .reconcile_all(vec![hazard("new", 1), hazard("old", 2)], NOW_MS)
        .await;

    assert_eq!(report.created(), 1);
    assert_eq!(report.updated(), 1);
    assert_eq!(report.failed(), 0);
}
