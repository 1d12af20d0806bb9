//! # HTTP 服务启动器
//!
//! 组装页面路由与 JSON 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 组装依赖后调用。

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use kabu_core::directory::SymbolDirectory;
use kabu_manager::dashboard::DashboardManager;
use kabu_trade::service::OrderDesk;

use crate::routes::{dashboard, market, trade};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 三者在服务启动前构造完毕，生命周期与进程等同，且都不持有可变行情状态。
#[derive(Clone)]
pub struct AppState {
    /// 仪表盘视图组装
    pub dashboard: Arc<DashboardManager>,
    /// 下单台
    pub order_desk: Arc<OrderDesk>,
    /// 启动时加载的只读代码目录
    pub directory: Arc<SymbolDirectory>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kabu Dashboard API",
        version = "0.1.0",
        description = "S&P 500 股票仪表盘的 JSON 接口：代码目录、行情视图、K 线与模拟盘下单。",
        license(name = "MIT")
    ),
    tags(
        (name = "行情 (Market)", description = "代码目录、仪表盘视图与历史 K 线"),
        (name = "订单交易 (Trade)", description = "向 Alpaca 模拟盘提交市价单")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的路由树。
///
/// # Logic
/// 1. JSON 接口走 `OpenApiRouter`，自动收集文档。
/// 2. 页面与 SVG 路由不进入文档，直接挂在普通 `Router` 上。
/// 3. 合并 Swagger UI 与 CORS。
pub fn build_router(state: AppState) -> Router {
    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(market::list_symbols))
        .routes(routes!(market::get_dashboard))
        .routes(routes!(market::get_candles))
        .routes(routes!(trade::place_order))
        .with_state(state.clone())
        .split_for_parts();

    let page_router = Router::new()
        .route("/", get(dashboard::index))
        .route("/trade", post(dashboard::trade))
        .route("/chart/{file}", get(dashboard::chart_svg))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    page_router
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 启动 HTTP 监听，直到进程退出。
///
/// # Arguments
/// * `state` - 由 `crates/app` 组装好的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"127.0.0.1:8501"`
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbols = state.directory.len();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        "Dashboard listening on http://{} ({} symbols)",
        listener.local_addr()?,
        symbols
    );
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
