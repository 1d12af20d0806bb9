use axum::Json;
use axum::extract::{Path, Query, State};
use kabu_core::common::TimeFrame;
use kabu_manager::dashboard::CHART_LOOKBACK_DAYS;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, CandleResponse, DashboardResponse, SymbolResponse};

/// 列出代码目录
#[utoipa::path(
    get,
    path = "/api/v1/symbols",
    tag = "行情 (Market)",
    responses(
        (status = 200, description = "代码目录 (按资源文件顺序)", body = ApiResponse<Vec<SymbolResponse>>)
    )
)]
pub async fn list_symbols(State(state): State<AppState>) -> Json<ApiResponse<Vec<SymbolResponse>>> {
    let symbols: Vec<SymbolResponse> = state.directory.entries().iter().map(Into::into).collect();
    Json(ApiResponse::ok(symbols))
}

/// 获取一个代码的完整仪表盘视图
///
/// 快照失败返回 502；其余区块失败体现在各自的 `available = false` 中。
#[utoipa::path(
    get,
    path = "/api/v1/market/{symbol}",
    tag = "行情 (Market)",
    params(
        ("symbol" = String, Path, description = "股票代码")
    ),
    responses(
        (status = 200, description = "视图获取成功", body = ApiResponse<DashboardResponse>),
        (status = 404, description = "代码不在目录中"),
        (status = 502, description = "行情快照获取失败")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let view = state.dashboard.load(&symbol).await?;
    Ok(Json(ApiResponse::ok((&view).into())))
}

#[derive(Deserialize, ToSchema)]
pub struct CandlesQuery {
    /// K 线周期 (1d, 1wk, 1mo)，默认 1d
    pub tf: Option<String>,
    /// 回溯天数，默认 365
    pub days: Option<i64>,
}

/// 获取历史 K 线
#[utoipa::path(
    get,
    path = "/api/v1/market/candles/{symbol}",
    tag = "行情 (Market)",
    params(
        ("symbol" = String, Path, description = "股票代码"),
        ("tf" = Option<String>, Query, description = "K 线周期 (1d, 1wk, 1mo)，默认 1d"),
        ("days" = Option<i64>, Query, description = "回溯天数 (1 到 3650)，默认 365")
    ),
    responses(
        (status = 200, description = "K 线获取成功", body = ApiResponse<Vec<CandleResponse>>),
        (status = 400, description = "周期或天数不合法"),
        (status = 404, description = "代码不在目录中"),
        (status = 502, description = "行情源错误")
    )
)]
pub async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<CandlesQuery>,
) -> Result<Json<ApiResponse<Vec<CandleResponse>>>, ApiError> {
    let timeframe = match query.tf.as_deref() {
        Some(tf) => tf.parse::<TimeFrame>().map_err(ApiError::BadRequest)?,
        None => TimeFrame::Day1,
    };
    let days = query.days.unwrap_or(CHART_LOOKBACK_DAYS);

    let candles = state
        .dashboard
        .load_candles(&symbol, timeframe, days)
        .await?;
    let data: Vec<CandleResponse> = candles.iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok(data)))
}
