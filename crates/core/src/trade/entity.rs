use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::port::TradeError;

/// # Summary
/// 券商分配的订单唯一标识。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// # Summary
/// 订单的交易方向定义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// 买入
    Buy,
    /// 卖出
    Sell,
}

impl OrderSide {
    /// 券商接口使用的小写形式
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }

    /// 页面展示用的首字母大写形式
    pub fn label(&self) -> &'static str {
        match self {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        }
    }
}

impl FromStr for OrderSide {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(TradeError::InvalidSide(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// # Summary
/// 市价、GTC 的下单意图。仅存在于一次提交动作期间。
///
/// # Invariants
/// - `quantity >= 1`，只能通过 [`OrderRequest::new`] 构造。
/// - `symbol` 已去除首尾空白并转为大写。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    symbol: String,
    quantity: u32,
    side: OrderSide,
}

impl OrderRequest {
    /// 订单类型固定为市价单
    pub const ORDER_TYPE: &'static str = "market";
    /// 订单有效期固定为撤销前有效
    pub const TIME_IN_FORCE: &'static str = "gtc";

    /// # Summary
    /// 构造并校验一笔下单意图。
    ///
    /// # Logic
    /// 1. 拒绝空白代码。
    /// 2. 拒绝数量为 0 的订单。
    ///
    /// # Returns
    /// 校验通过返回 `OrderRequest`，否则返回 `TradeError`。
    pub fn new(symbol: &str, quantity: u32, side: OrderSide) -> Result<Self, TradeError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TradeError::UnknownSymbol(symbol));
        }
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity("0".to_string()));
        }
        Ok(Self {
            symbol,
            quantity,
            side,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }
}

/// # Summary
/// 券商对下单请求的回执。
///
/// # Invariants
/// - `raw` 保存券商原始 JSON，页面按原样展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub id: OrderId,
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub qty: Option<Decimal>,
    pub filled_qty: Option<Decimal>,
    pub side: OrderSide,
    pub order_type: String,
    pub time_in_force: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

/// # Summary
/// 一次提交动作的最终结果，页面只关心消息文本与回执。
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    /// 券商已接受订单
    Placed { message: String, ack: OrderAck },
    /// 本地校验失败或券商拒绝
    Failed { message: String },
}

impl OrderOutcome {
    pub fn message(&self) -> &str {
        match self {
            OrderOutcome::Placed { message, .. } | OrderOutcome::Failed { message } => message,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, OrderOutcome::Placed { .. })
    }
}
