use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kabu_core::config::BrokerConfig;
use kabu_core::trade::entity::{OrderAck, OrderId, OrderRequest, OrderSide};
use kabu_core::trade::port::{BrokeragePort, TradeError};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

const KEY_ID_HEADER: &str = "APCA-API-KEY-ID";
const SECRET_KEY_HEADER: &str = "APCA-API-SECRET-KEY";

/// 券商 API 凭证，仅在内存中持有
#[derive(Clone)]
struct Credentials {
    key_id: String,
    secret_key: String,
}

/// # Summary
/// Alpaca paper trading 券商适配器。
///
/// # Invariants
/// - 凭证来自配置注入；缺失时不发出任何请求，直接返回 `NotConfigured`。
/// - 每次 `submit_order` 恰好一次 `POST /v2/orders`，不重试。
#[derive(Clone)]
pub struct AlpacaBroker {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

/// Alpaca 订单对象中本系统关心的字段
#[derive(Deserialize, Debug)]
struct AlpacaOrder {
    id: String,
    client_order_id: Option<String>,
    symbol: String,
    qty: Option<Decimal>,
    filled_qty: Option<Decimal>,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: String,
    time_in_force: String,
    status: String,
    created_at: Option<DateTime<Utc>>,
}

/// Alpaca 错误体：`{"code": 40310000, "message": "insufficient qty"}`
#[derive(Deserialize, Debug)]
struct AlpacaError {
    message: String,
}

impl AlpacaBroker {
    /// # Summary
    /// 按配置创建适配器。
    ///
    /// # Logic
    /// 1. 凭证任一缺失或为空白时记录告警，适配器仍可构建，但下单会失败。
    /// 2. 注册 TLS 加密后端后构建带超时的 HTTP 客户端。
    pub fn new(config: &BrokerConfig) -> Result<Self, TradeError> {
        kabu_core::install_crypto_provider();

        let credentials = match (&config.key_id, &config.secret_key) {
            (Some(key_id), Some(secret_key)) if config.has_credentials() => Some(Credentials {
                key_id: key_id.trim().to_string(),
                secret_key: secret_key.trim().to_string(),
            }),
            _ => {
                tracing::warn!(
                    "Brokerage credentials missing, order submission is disabled until KABU__BROKER__KEY_ID and KABU__BROKER__SECRET_KEY are set"
                );
                None
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TradeError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl BrokeragePort for AlpacaBroker {
    /// # Summary
    /// 提交市价 GTC 订单。
    ///
    /// # Logic
    /// 1. 检查凭证。
    /// 2. POST `{base_url}/v2/orders`，两个认证头携带凭证。
    /// 3. 非 2xx 时优先取错误体中的 `message`，否则使用原始响应文本。
    /// 4. 2xx 时解析回执并保留原始 JSON。
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, TradeError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            TradeError::NotConfigured(
                "set KABU__BROKER__KEY_ID and KABU__BROKER__SECRET_KEY".to_string(),
            )
        })?;

        let body = serde_json::json!({
            "symbol": order.symbol(),
            "qty": order.quantity(),
            "side": order.side().as_str(),
            "type": OrderRequest::ORDER_TYPE,
            "time_in_force": OrderRequest::TIME_IN_FORCE,
        });

        let url = format!("{}/v2/orders", self.base_url);
        tracing::debug!(
            "POST {} {} {} x{}",
            url,
            order.side().as_str(),
            order.symbol(),
            order.quantity()
        );
        let resp = self
            .client
            .post(&url)
            .header(KEY_ID_HEADER, &credentials.key_id)
            .header(SECRET_KEY_HEADER, &credentials.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TradeError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TradeError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AlpacaError>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| text.trim().to_string());
            return Err(TradeError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parse_ack(&text)
    }
}

/// 解析 2xx 响应为回执
fn parse_ack(text: &str) -> Result<OrderAck, TradeError> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|e| TradeError::Parse(e.to_string()))?;
    let order: AlpacaOrder =
        serde_json::from_value(raw.clone()).map_err(|e| TradeError::Parse(e.to_string()))?;

    Ok(OrderAck {
        id: OrderId(order.id),
        client_order_id: order.client_order_id,
        symbol: order.symbol,
        qty: order.qty,
        filled_qty: order.filled_qty,
        side: order.side,
        order_type: order.order_type,
        time_in_force: order.time_in_force,
        status: order.status,
        created_at: order.created_at,
        raw,
    })
}
