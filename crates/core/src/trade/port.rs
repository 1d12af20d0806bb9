use super::entity::{OrderAck, OrderRequest};
use async_trait::async_trait;
use thiserror::Error;

/// # Summary
/// 下单环节中可能发生的错误。文本会原样展示在 "Order failed: ..." 提示中。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("invalid quantity '{0}': must be a whole number of at least 1")]
    InvalidQuantity(String),
    #[error("invalid side '{0}': expected buy or sell")]
    InvalidSide(String),
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("brokerage credentials not configured: {0}")]
    NotConfigured(String),
    #[error("broker rejected order (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("broker network error: {0}")]
    Network(String),
    #[error("unexpected broker response: {0}")]
    Parse(String),
}

/// # Summary
/// 券商下单端口。
/// 仪表盘通过此端口下发市价 GTC 订单，是业务逻辑接触券商 API 的唯一门户。
///
/// # Invariants
/// - 每次调用恰好发出一次下单请求，不做重试，不做幂等去重。
/// - 此接口必须是异步且线程安全的 (`Send + Sync`)。
#[async_trait]
pub trait BrokeragePort: Send + Sync {
    /// 提交一笔市价单
    ///
    /// # Arguments
    /// * `order` - 已通过校验的下单意图
    ///
    /// # Returns
    /// * `Ok(OrderAck)` - 券商回执
    /// * `Err(TradeError)` - 凭证缺失、券商拒绝或网络失败
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, TradeError>;
}
