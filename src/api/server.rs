use super::{router, AppState};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::scoring::RegionCodeTable;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::Arc;
use tracing::info;

/// Binds the configured address and serves until the listener fails.
/// Telemetry must already be initialized.
pub async fn serve(config: AppConfig) -> Result<(), AppError> {
    let regions = RegionCodeTable::load_or_degrade(
        &config.scoring.region_table_path,
        config.scoring.region_table_required,
    )?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let state = AppState::new(
        prometheus_handle,
        Arc::new(regions),
        config.scoring.apply_city_tier,
    );

    let app = router(state.clone()).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    state.mark_ready();

    info!(
        ?config.environment,
        %addr,
        region_table = state.regions.available(),
        apply_city_tier = state.apply_city_tier,
        "collection priority service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
