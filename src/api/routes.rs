use super::infra::{deserialize_optional_date, AppState};
use crate::error::AppError;
use crate::report::{PortfolioReport, DEFAULT_TOP_REGIONS};
use crate::scoring::views::RankedRowView;
use crate::scoring::{DebtorTable, RecordType, ScoringWarning};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::Ordering;

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) file_name: Option<String>,
    #[serde(default)]
    pub(crate) record_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) top: Option<usize>,
    #[serde(default)]
    pub(crate) include_summary: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) record_type: String,
    pub(crate) as_of: NaiveDate,
    pub(crate) total_records: usize,
    pub(crate) rows: Vec<RankedRowView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) warnings: Vec<WarningView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<PortfolioReport>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WarningView {
    #[serde(flatten)]
    pub(crate) warning: ScoringWarning,
    pub(crate) message: String,
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({
            "status": "ready",
            "region_table": state.regions.available(),
        })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rank_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let RankRequest {
        csv,
        file_name,
        record_type,
        as_of,
        top,
        include_summary,
    } = payload;

    let table = DebtorTable::from_reader(Cursor::new(csv.into_bytes()))?;
    let record_type = RecordType::resolve(record_type.as_deref(), file_name.as_deref());
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let ranked = state.engine(as_of).run(table, &record_type);
    let summary = include_summary.then(|| PortfolioReport::build(&ranked, DEFAULT_TOP_REGIONS));
    let warnings = ranked
        .warnings
        .iter()
        .map(|warning| WarningView {
            warning: warning.clone(),
            message: warning.summary(),
        })
        .collect();

    Ok(Json(RankResponse {
        record_type: ranked.record_type.label().to_string(),
        as_of,
        total_records: ranked.len(),
        rows: ranked.row_views(top),
        warnings,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{RegionCodeTable, RuleKind};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Arc;

    fn state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let regions = RegionCodeTable::from_entries([("110105", "北京")]);
        AppState::new(handle, Arc::new(regions), false)
    }

    fn request(csv: &str) -> RankRequest {
        RankRequest {
            csv: csv.to_string(),
            file_name: None,
            record_type: None,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 30),
            top: None,
            include_summary: false,
        }
    }

    #[tokio::test]
    async fn rank_endpoint_orders_rows_by_score() {
        let csv = "证件号,账单地址,逾期期数\n\
                   110105199001011234,上海市,M30\n\
                   110105199001011234,北京市朝阳区,M2\n";

        let Json(body) = rank_endpoint(State(state()), Json(request(csv)))
            .await
            .expect("ranking succeeds");

        assert_eq!(body.record_type, "在案");
        assert_eq!(body.total_records, 2);
        assert_eq!(body.rows[0].row, 1);
        assert_eq!(body.rows[0].rank, 1);
        assert_eq!(body.rows[0].score, 30.0);
        assert_eq!(body.rows[1].score, 10.0);
        assert!(body.rows[0]
            .components
            .iter()
            .any(|component| component.rule == RuleKind::RegionConsistency
                && component.points == 10.0));
        assert!(body.summary.is_none());
    }

    #[tokio::test]
    async fn rank_endpoint_detects_pre_collection_from_file_name() {
        let mut payload = request("最新欠款,过期天数,留案\n25000,60,是\n800,10,否\n");
        payload.file_name = Some("0630前催.csv".to_string());
        payload.top = Some(1);
        payload.include_summary = true;

        let Json(body) = rank_endpoint(State(state()), Json(payload))
            .await
            .expect("ranking succeeds");

        assert_eq!(body.record_type, "前催");
        assert_eq!(body.total_records, 2);
        assert_eq!(body.rows.len(), 1);
        assert_eq!(body.rows[0].score, 35.0);
        let summary = body.summary.expect("summary requested");
        assert_eq!(summary.scores.count, 2);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_marked() {
        let state = state();
        let response = readiness_endpoint(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.mark_ready();
        let response = readiness_endpoint(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
