//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kabu_core::trade::port::TradeError;
use kabu_manager::dashboard::ViewError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 上游行情源或券商失败 (502)
    #[error("上游服务错误: {0}")]
    BadGateway(String),

    /// 服务未配置 (503)
    #[error("服务不可用: {0}")]
    Unavailable(String),

    /// 页面模板渲染失败 (500)
    #[error("页面渲染失败: {0}")]
    Render(#[from] askama::Error),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => {
                tracing::warn!("上游服务错误: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Render(e) => {
                tracing::error!("页面渲染失败: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `ViewError` 转换
impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        match &err {
            ViewError::UnknownSymbol(_) => ApiError::NotFound(err.to_string()),
            ViewError::InvalidRange(_) => ApiError::BadRequest(err.to_string()),
            ViewError::SnapshotUnavailable(_) | ViewError::Market(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

/// 从 `TradeError` 转换
impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match &err {
            TradeError::InvalidQuantity(_) | TradeError::InvalidSide(_) => {
                ApiError::BadRequest(err.to_string())
            }
            TradeError::UnknownSymbol(_) => ApiError::NotFound(err.to_string()),
            TradeError::NotConfigured(_) => ApiError::Unavailable(err.to_string()),
            TradeError::Rejected { .. } | TradeError::Network(_) | TradeError::Parse(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}
