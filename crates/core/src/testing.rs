//! # 测试替身
//!
//! 仅在 `test-utils` feature 下编译，供下游 crate 的集成测试注入。

use crate::common::TimeFrame;
use crate::market::entity::{
    Candle, CompanyProfile, FinancialStatement, HolderBreakdownRow, InstitutionalHolder, LineItem,
    MajorHolders, QuoteSnapshot, StatementKind, ValuationMultiples,
};
use crate::market::error::MarketError;
use crate::market::port::QuoteProvider;
use crate::trade::entity::{OrderAck, OrderId, OrderRequest};
use crate::trade::port::{BrokeragePort, TradeError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// # Summary
/// 可逐项设定成功或失败的行情源替身。
///
/// # Invariants
/// - 每个字段对应 `QuoteProvider` 的一个方法，`Err` 时该方法返回克隆的错误。
/// - `calls` 记录总调用次数，用于断言快照失败后不再发起其他请求。
pub struct StubQuoteProvider {
    pub snapshot: Result<QuoteSnapshot, MarketError>,
    pub profile: Result<CompanyProfile, MarketError>,
    pub candles: Result<Vec<Candle>, MarketError>,
    pub income: Result<FinancialStatement, MarketError>,
    pub balance_sheet: Result<FinancialStatement, MarketError>,
    pub cash_flow: Result<FinancialStatement, MarketError>,
    pub major_holders: Result<MajorHolders, MarketError>,
    pub institutional_holders: Result<Vec<InstitutionalHolder>, MarketError>,
    calls: AtomicUsize,
    statement_window: Mutex<Option<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl StubQuoteProvider {
    /// 全部数据可用的行情源
    pub fn healthy() -> Self {
        Self {
            snapshot: Ok(sample_snapshot()),
            profile: Ok(sample_profile()),
            candles: Ok(sample_candles(252)),
            income: Ok(sample_statement(StatementKind::Income)),
            balance_sheet: Ok(sample_statement(StatementKind::BalanceSheet)),
            cash_flow: Ok(sample_statement(StatementKind::CashFlow)),
            major_holders: Ok(sample_major_holders()),
            institutional_holders: Ok(sample_institutional_holders()),
            calls: AtomicUsize::new(0),
            statement_window: Mutex::new(None),
        }
    }

    /// 每个调用都失败的行情源
    pub fn failing() -> Self {
        let err = MarketError::Network("connection refused".into());
        Self {
            snapshot: Err(err.clone()),
            profile: Err(err.clone()),
            candles: Err(err.clone()),
            income: Err(err.clone()),
            balance_sheet: Err(err.clone()),
            cash_flow: Err(err.clone()),
            major_holders: Err(err.clone()),
            institutional_holders: Err(err),
            calls: AtomicUsize::new(0),
            statement_window: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 最近一次报表请求的时间窗口
    pub fn statement_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        *self
            .statement_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuoteProvider for StubQuoteProvider {
    async fn fetch_snapshot(&self, _symbol: &str) -> Result<QuoteSnapshot, MarketError> {
        self.hit();
        self.snapshot.clone()
    }

    async fn fetch_profile(&self, _symbol: &str) -> Result<CompanyProfile, MarketError> {
        self.hit();
        self.profile.clone()
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        _timeframe: TimeFrame,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MarketError> {
        self.hit();
        self.candles.clone()
    }

    async fn fetch_statement(
        &self,
        _symbol: &str,
        kind: StatementKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialStatement, MarketError> {
        self.hit();
        *self
            .statement_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((start, end));
        match kind {
            StatementKind::Income => self.income.clone(),
            StatementKind::BalanceSheet => self.balance_sheet.clone(),
            StatementKind::CashFlow => self.cash_flow.clone(),
        }
    }

    async fn fetch_major_holders(&self, _symbol: &str) -> Result<MajorHolders, MarketError> {
        self.hit();
        self.major_holders.clone()
    }

    async fn fetch_institutional_holders(
        &self,
        _symbol: &str,
    ) -> Result<Vec<InstitutionalHolder>, MarketError> {
        self.hit();
        self.institutional_holders.clone()
    }
}

/// # Summary
/// 记录所有下单请求的券商替身。
pub struct RecordingBroker {
    response: Result<(), TradeError>,
    orders: Mutex<Vec<OrderRequest>>,
}

impl RecordingBroker {
    /// 总是接受订单
    pub fn accepting() -> Self {
        Self {
            response: Ok(()),
            orders: Mutex::new(Vec::new()),
        }
    }

    /// 总是以给定错误拒绝订单
    pub fn rejecting(err: TradeError) -> Self {
        Self {
            response: Err(err),
            orders: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的订单 (按到达顺序)
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BrokeragePort for RecordingBroker {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, TradeError> {
        let seq = {
            let mut orders = self.orders.lock().unwrap_or_else(PoisonError::into_inner);
            orders.push(order.clone());
            orders.len()
        };
        self.response.clone()?;

        let raw = serde_json::json!({
            "id": format!("stub-order-{}", seq),
            "symbol": order.symbol(),
            "qty": order.quantity().to_string(),
            "side": order.side().as_str(),
            "type": OrderRequest::ORDER_TYPE,
            "time_in_force": OrderRequest::TIME_IN_FORCE,
            "status": "accepted",
        });
        Ok(OrderAck {
            id: OrderId(format!("stub-order-{}", seq)),
            client_order_id: None,
            symbol: order.symbol().to_string(),
            qty: Some(order.quantity().into()),
            filled_qty: Some(rust_decimal::Decimal::ZERO),
            side: order.side(),
            order_type: OrderRequest::ORDER_TYPE.to_string(),
            time_in_force: OrderRequest::TIME_IN_FORCE.to_string(),
            status: "accepted".to_string(),
            created_at: None,
            raw,
        })
    }
}

pub fn sample_snapshot() -> QuoteSnapshot {
    QuoteSnapshot {
        last_price: Some(189.84),
        year_high: Some(199.62),
        year_low: Some(164.08),
        last_volume: Some(53_665_600),
        market_cap: Some(2_952_053_932_032.0),
        currency: Some("USD".into()),
    }
}

pub fn sample_profile() -> CompanyProfile {
    CompanyProfile {
        long_name: Some("Apple Inc.".into()),
        sector: Some("Technology".into()),
        industry: Some("Consumer Electronics".into()),
        business_summary: Some(
            "Apple Inc. designs, manufactures, and markets smartphones & personal computers."
                .into(),
        ),
        valuation: ValuationMultiples {
            trailing_pe: Some(29.45),
            forward_pe: Some(26.1),
            price_to_sales: Some(7.67),
            price_to_book: Some(47.9),
            enterprise_to_revenue: Some(7.74),
            enterprise_to_ebitda: Some(22.3),
        },
    }
}

/// 生成 `count` 根连续日线，价格围绕 180 上下波动
pub fn sample_candles(count: usize) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).single();
    let Some(start) = start else {
        return Vec::new();
    };
    (0..count)
        .map(|i| {
            let step = f64::from(u32::try_from(i % 20).unwrap_or(0));
            let open = 180.0 + step;
            let close = if i % 2 == 0 { open + 1.5 } else { open - 1.5 };
            Candle {
                time: start + Duration::days(i64::try_from(i).unwrap_or(0)),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                adj_close: Some(close),
                volume: 50_000_000.0,
                is_final: true,
            }
        })
        .collect()
}

pub fn sample_statement(kind: StatementKind) -> FinancialStatement {
    let periods = vec![
        NaiveDate::from_ymd_opt(2023, 9, 30),
        NaiveDate::from_ymd_opt(2022, 9, 30),
    ]
    .into_iter()
    .flatten()
    .collect();
    let rows = match kind {
        StatementKind::Income => vec![
            LineItem {
                name: "Total Revenue".into(),
                values: vec![Some(383_285_000_000.0), Some(394_328_000_000.0)],
            },
            LineItem {
                name: "Net Income".into(),
                values: vec![Some(96_995_000_000.0), Some(99_803_000_000.0)],
            },
        ],
        StatementKind::BalanceSheet => vec![LineItem {
            name: "Total Assets".into(),
            values: vec![Some(352_583_000_000.0), Some(352_755_000_000.0)],
        }],
        StatementKind::CashFlow => vec![LineItem {
            name: "Free Cash Flow".into(),
            values: vec![Some(99_584_000_000.0), None],
        }],
    };
    FinancialStatement {
        kind,
        periods,
        rows,
    }
}

pub fn sample_major_holders() -> MajorHolders {
    MajorHolders {
        rows: vec![
            HolderBreakdownRow {
                label: "% of Shares Held by All Insider".into(),
                value: 0.0007,
                is_ratio: true,
            },
            HolderBreakdownRow {
                label: "% of Shares Held by Institutions".into(),
                value: 0.6127,
                is_ratio: true,
            },
            HolderBreakdownRow {
                label: "Number of Institutions Holding Shares".into(),
                value: 6_359.0,
                is_ratio: false,
            },
        ],
    }
}

pub fn sample_institutional_holders() -> Vec<InstitutionalHolder> {
    vec![InstitutionalHolder {
        holder: "Vanguard Group Inc".into(),
        shares: Some(1_315_506_854),
        date_reported: NaiveDate::from_ymd_opt(2023, 12, 31),
        pct_held: Some(0.0849),
        value: Some(249_743_958_323.0),
    }]
}
