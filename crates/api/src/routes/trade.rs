use axum::Json;
use axum::extract::State;
use kabu_core::trade::entity::OrderSide;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, OrderResponse, PlaceOrderRequest};

/// 提交市价 GTC 订单
///
/// 与页面表单共用校验：数量必须为正整数，代码必须在目录中。
/// 每次调用最多向券商发出一次请求，不做去重。
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "订单交易 (Trade)",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "券商已接受订单", body = ApiResponse<OrderResponse>),
        (status = 400, description = "数量或方向不合法"),
        (status = 404, description = "代码不在目录中"),
        (status = 502, description = "券商拒绝或网络错误"),
        (status = 503, description = "券商凭证未配置")
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let side: OrderSide = req.side.parse()?;
    let (request, ack) = state
        .order_desk
        .place(&req.symbol, &req.quantity, side)
        .await?;

    let message = format!(
        "{} order placed for {} shares of {}",
        side.label(),
        request.quantity(),
        request.symbol()
    );
    tracing::info!("{}", message);
    Ok(Json(ApiResponse::ok(OrderResponse::new(
        &request, &ack, message,
    ))))
}
