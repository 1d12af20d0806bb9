use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use kabu_core::common::TimeFrame;
use kabu_core::trade::entity::{OrderOutcome, OrderSide};
use kabu_manager::dashboard::{CHART_LOOKBACK_DAYS, ViewError};
use kabu_trade::service;
use serde::Deserialize;

use crate::error::ApiError;
use crate::render::chart::candlestick_svg;
use crate::render::page::{PageContext, dashboard_page, message_page};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub symbol: Option<String>,
}

/// 页面下单表单
#[derive(Debug, Deserialize)]
pub struct TradeForm {
    pub symbol: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub side: String,
}

/// # Summary
/// 仪表盘首页。
///
/// # Logic
/// 1. 未指定代码时使用目录中的第一个代码。
/// 2. 加载视图并渲染；未知代码返回 404，快照失败只展示错误提示。
pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Response {
    let symbol = match query.symbol {
        Some(s) if !s.trim().is_empty() => s.trim().to_uppercase(),
        _ => default_symbol(&state),
    };
    render_dashboard(&state, &symbol, None).await
}

/// # Summary
/// 处理页面下单表单，然后重新渲染同一代码的仪表盘。
///
/// # Logic
/// 1. 方向不合法时直接生成失败结果，不调用券商。
/// 2. 否则交给下单台，最多向券商提交一次。
/// 3. 结果以横幅形式展示在页面顶部。
pub async fn trade(State(state): State<AppState>, Form(form): Form<TradeForm>) -> Response {
    let symbol = form.symbol.trim().to_uppercase();
    let outcome = match form.side.parse::<OrderSide>() {
        Ok(side) => state.order_desk.submit(&symbol, &form.quantity, side).await,
        Err(e) => service::failed(&e),
    };
    render_dashboard(&state, &symbol, Some(&outcome)).await
}

/// # Summary
/// 单独输出一年日线的 SVG 蜡烛图，路径形如 `/chart/AAPL.svg`。
pub async fn chart_svg(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let symbol = file
        .strip_suffix(".svg")
        .ok_or_else(|| ApiError::NotFound(file.clone()))?;

    let candles = state
        .dashboard
        .load_candles(symbol, TimeFrame::Day1, CHART_LOOKBACK_DAYS)
        .await?;
    let svg = candlestick_svg(&candles)
        .ok_or_else(|| ApiError::NotFound(format!("no price history for {}", symbol)))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

fn default_symbol(state: &AppState) -> String {
    state
        .directory
        .first()
        .map(|e| e.symbol.clone())
        .unwrap_or_default()
}

async fn render_dashboard(
    state: &AppState,
    symbol: &str,
    outcome: Option<&OrderOutcome>,
) -> Response {
    let ctx = PageContext {
        directory: &state.directory,
        selected: symbol,
        outcome,
    };

    let rendered = match state.dashboard.load(symbol).await {
        Ok(view) => dashboard_page(&ctx, &view).map(|html| (StatusCode::OK, html)),
        Err(e @ ViewError::UnknownSymbol(_)) => {
            message_page(&ctx, &e.to_string()).map(|html| (StatusCode::NOT_FOUND, html))
        }
        Err(e) => message_page(&ctx, &e.to_string()).map(|html| (StatusCode::OK, html)),
    };

    match rendered {
        Ok((status, html)) => (status, Html(html)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
