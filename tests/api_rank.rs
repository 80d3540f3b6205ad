use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use collection_priority::api::{router, AppState};
use collection_priority::scoring::RegionCodeTable;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn build_router() -> axum::Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let regions = RegionCodeTable::from_entries([("110105", "北京")]);
    let state = AppState::new(handle, Arc::new(regions), false);
    state.mark_ready();
    router(state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json")
}

fn rank_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/scoring/rank")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_vec(&payload).expect("serialize payload"),
        ))
        .expect("request")
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let router = build_router();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status"), Some(&json!("ready")));
    assert_eq!(payload.get("region_table"), Some(&json!(true)));
}

#[tokio::test]
async fn rank_returns_top_rows_with_warnings_and_summary() {
    let csv = "证件号,账单地址,逾期期数\n\
               110105199501011234,北京市东城区,M1\n\
               110105199501011234,广州市,M40\n\
               110105199501011234,北京市西城区,M5\n";

    let response = build_router()
        .oneshot(rank_request(json!({
            "csv": csv,
            "file_name": "2025-06 在案.csv",
            "as_of": "2025-06-30",
            "top": 2,
            "include_summary": true,
        })))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;

    assert_eq!(payload["record_type"], json!("在案"));
    assert_eq!(payload["as_of"], json!("2025-06-30"));
    assert_eq!(payload["total_records"], json!(3));

    let rows = payload["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["row"], json!(0));
    assert_eq!(rows[0]["score"], json!(30.0));
    assert_eq!(rows[1]["row"], json!(2));
    assert_eq!(rows[1]["score"], json!(28.0));
    assert_eq!(rows[0]["cells"]["账单地址"], json!("北京市东城区"));

    let warnings = payload["warnings"].as_array().expect("warnings array");
    assert!(warnings.iter().any(|warning| {
        warning["kind"] == json!("missing_columns") && warning["rule"] == json!("debt_ratio")
    }));

    assert_eq!(payload["summary"]["scores"]["count"], json!(3));
    assert_eq!(payload["summary"]["top_regions"][0]["region"], json!("北京"));
}

#[tokio::test]
async fn unrecognized_record_type_scores_zero() {
    let response = build_router()
        .oneshot(rank_request(json!({
            "csv": "最新欠款\n9000\n",
            "record_type": "委外",
        })))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["rows"][0]["score"], json!(0.0));
    assert_eq!(
        payload["warnings"][0]["kind"],
        json!("unrecognized_record_type")
    );
    assert!(payload.get("summary").is_none());
}

#[tokio::test]
async fn malformed_as_of_is_rejected() {
    let response = build_router()
        .oneshot(rank_request(json!({
            "csv": "最新欠款\n9000\n",
            "as_of": "30/06/2025",
        })))
        .await
        .expect("router dispatch");

    assert!(response.status().is_client_error());
}
