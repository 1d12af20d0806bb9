use kabu_core::directory::SymbolDirectory;
use kabu_core::trade::entity::{OrderAck, OrderOutcome, OrderRequest, OrderSide};
use kabu_core::trade::port::{BrokeragePort, TradeError};
use std::sync::Arc;

/// # Summary
/// 下单台：仪表盘表单与 JSON 接口共用的下单入口。
///
/// # Invariants
/// - 数量或代码不合法时不会调用券商端口。
/// - 合法输入恰好调用一次 `BrokeragePort::submit_order`。
pub struct OrderDesk {
    broker: Arc<dyn BrokeragePort>,
    directory: Arc<SymbolDirectory>,
}

impl OrderDesk {
    pub fn new(broker: Arc<dyn BrokeragePort>, directory: Arc<SymbolDirectory>) -> Self {
        Self { broker, directory }
    }

    /// # Summary
    /// 校验输入并提交订单。
    ///
    /// # Logic
    /// 1. 解析数量文本，必须是不小于 1 的整数。
    /// 2. 代码规范化为大写，必须在代码目录中。
    /// 3. 构造市价 GTC 请求并交给券商端口。
    ///
    /// # Arguments
    /// * `symbol` - 股票代码
    /// * `quantity_input` - 用户输入的数量原文
    /// * `side` - 买卖方向
    ///
    /// # Returns
    /// 券商回执或 `TradeError`。
    pub async fn place(
        &self,
        symbol: &str,
        quantity_input: &str,
        side: OrderSide,
    ) -> Result<(OrderRequest, OrderAck), TradeError> {
        let quantity = parse_quantity(quantity_input)?;
        let symbol = symbol.trim().to_uppercase();
        if !self.directory.contains(&symbol) {
            return Err(TradeError::UnknownSymbol(symbol));
        }

        let request = OrderRequest::new(&symbol, quantity, side)?;
        let ack = self.broker.submit_order(&request).await?;
        tracing::info!(
            "Order {} accepted: {} {} x{} ({})",
            ack.id.0,
            side.as_str(),
            request.symbol(),
            request.quantity(),
            ack.status
        );
        Ok((request, ack))
    }

    /// # Summary
    /// 提交订单并转换为页面提示。
    ///
    /// # Returns
    /// 成功为 `"<Buy|Sell> order placed for <qty> shares of <SYMBOL>"`，
    /// 失败为 `"Order failed: <原因>"`。
    pub async fn submit(&self, symbol: &str, quantity_input: &str, side: OrderSide) -> OrderOutcome {
        match self.place(symbol, quantity_input, side).await {
            Ok((request, ack)) => OrderOutcome::Placed {
                message: format!(
                    "{} order placed for {} shares of {}",
                    side.label(),
                    request.quantity(),
                    request.symbol()
                ),
                ack,
            },
            Err(e) => failed(&e),
        }
    }
}

/// 失败结果的统一文案
pub fn failed(err: &TradeError) -> OrderOutcome {
    tracing::warn!("Order failed: {}", err);
    OrderOutcome::Failed {
        message: format!("Order failed: {}", err),
    }
}

/// 数量只接受正整数文本 (允许首尾空白)
fn parse_quantity(input: &str) -> Result<u32, TradeError> {
    let trimmed = input.trim();
    match trimmed.parse::<u32>() {
        Ok(q) if q >= 1 => Ok(q),
        _ => Err(TradeError::InvalidQuantity(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 10 ").unwrap(), 10);
        assert_eq!(parse_quantity("1").unwrap(), 1);
        for bad in ["0", "-5", "2.5", "", "ten", "4294967296"] {
            assert!(
                matches!(parse_quantity(bad), Err(TradeError::InvalidQuantity(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
