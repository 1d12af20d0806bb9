//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use kabu_core::directory::SymbolEntry;
use kabu_core::market::entity::{
    Candle, CompanyProfile, FinancialStatement, HolderBreakdownRow, InstitutionalHolder,
    QuoteSnapshot,
};
use kabu_core::market::error::MarketError;
use kabu_core::trade::entity::{OrderAck, OrderRequest};
use kabu_manager::dashboard::{DashboardView, Section};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// 单个仪表盘区块：可用时带数据，不可用时带原因
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectionResponse<T: Serialize + ToSchema> {
    /// 区块名称
    #[schema(example = "Income Statement")]
    pub name: String,
    /// 是否抓取成功
    pub available: bool,
    pub data: Option<T>,
    /// 失败原因
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> SectionResponse<T> {
    /// 从区块结果转换，成功数据经过 `map` 变为 DTO
    pub fn from_section<S>(name: &str, section: &Section<S>, map: impl FnOnce(&S) -> T) -> Self {
        match section {
            Ok(value) => Self {
                name: name.to_string(),
                available: true,
                data: Some(map(value)),
                error: None,
            },
            Err(e) => Self::unavailable(name, e),
        }
    }

    fn unavailable(name: &str, err: &MarketError) -> Self {
        Self {
            name: name.to_string(),
            available: false,
            data: None,
            error: Some(err.to_string()),
        }
    }
}

// ============================================================
//  代码目录 DTO
// ============================================================

/// 代码目录条目 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymbolResponse {
    /// 股票代码
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 公司名称
    #[schema(example = "Apple Inc.")]
    pub name: String,
}

// ============================================================
//  行情相关 DTO
// ============================================================

/// K 线数据 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandleResponse {
    /// 时间戳 (ISO 8601)
    #[schema(example = "2026-03-01T14:30:00+00:00")]
    pub time: String,
    /// 开盘价
    #[schema(example = "150.5")]
    pub open: String,
    /// 最高价
    #[schema(example = "152.0")]
    pub high: String,
    /// 最低价
    #[schema(example = "149.0")]
    pub low: String,
    /// 收盘价
    #[schema(example = "151.0")]
    pub close: String,
    /// 复权收盘价
    #[schema(example = "150.2")]
    pub adj_close: Option<String>,
    /// 成交量
    #[schema(example = "1000000")]
    pub volume: String,
    /// 是否已收盘
    pub is_final: bool,
}

/// 行情快照 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    #[schema(example = 189.84)]
    pub last_price: Option<f64>,
    #[schema(example = 199.62)]
    pub year_high: Option<f64>,
    #[schema(example = 164.08)]
    pub year_low: Option<f64>,
    #[schema(example = 53665600)]
    pub last_volume: Option<u64>,
    #[schema(example = 2952053932032.0)]
    pub market_cap: Option<f64>,
    #[schema(example = "USD")]
    pub currency: Option<String>,
}

/// 公司档案 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(example = "Apple Inc.")]
    pub long_name: Option<String>,
    #[schema(example = "Technology")]
    pub sector: Option<String>,
    #[schema(example = "Consumer Electronics")]
    pub industry: Option<String>,
    pub business_summary: Option<String>,
}

/// 估值倍数表中的一行
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValuationRowResponse {
    #[schema(example = "P/E Ratio")]
    pub metric: String,
    #[schema(example = 29.45)]
    pub value: Option<f64>,
}

/// 财务报表中的一个科目
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineItemResponse {
    #[schema(example = "Total Revenue")]
    pub name: String,
    /// 与 `periods` 一一对应，缺失为 null
    pub values: Vec<Option<f64>>,
}

/// 财务报表 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatementResponse {
    /// 报告期 (YYYY-MM-DD，新在前)
    pub periods: Vec<String>,
    pub rows: Vec<LineItemResponse>,
}

/// 主要持有人分布中的一行
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HolderRowResponse {
    #[schema(example = "% of Shares Held by Institutions")]
    pub label: String,
    #[schema(example = 0.6127)]
    pub value: f64,
    /// 为 true 时 `value` 是 0 到 1 的比例
    pub is_ratio: bool,
}

/// 机构持有人 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionalHolderResponse {
    #[schema(example = "Vanguard Group Inc")]
    pub holder: String,
    #[schema(example = 1315506854)]
    pub shares: Option<u64>,
    #[schema(example = "2023-12-31")]
    pub date_reported: Option<String>,
    #[schema(example = 0.0849)]
    pub pct_held: Option<f64>,
    pub value: Option<f64>,
}

/// 完整仪表盘视图 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 代码目录中的名称
    #[schema(example = "Apple Inc.")]
    pub name: String,
    /// 页面标题 (公司全称或代码)
    pub heading: String,
    pub snapshot: SnapshotResponse,
    pub profile: SectionResponse<ProfileResponse>,
    pub valuation: SectionResponse<Vec<ValuationRowResponse>>,
    pub candles: SectionResponse<Vec<CandleResponse>>,
    pub statements: Vec<SectionResponse<StatementResponse>>,
    pub major_holders: SectionResponse<Vec<HolderRowResponse>>,
    pub institutional_holders: SectionResponse<Vec<InstitutionalHolderResponse>>,
    /// 视图生成时间 (ISO 8601)
    pub generated_at: String,
}

// ============================================================
//  下单 DTO
// ============================================================

/// 下单请求。数量以文本接收，与页面表单走同一套校验。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 正整数股数
    #[schema(example = "10")]
    pub quantity: String,
    /// buy 或 sell
    #[schema(example = "buy")]
    pub side: String,
}

/// 下单回执 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    /// 券商订单 ID
    #[schema(example = "61e69015-8549-4bfd-b9c3-01e75843f47d")]
    pub id: String,
    pub client_order_id: Option<String>,
    #[schema(example = "AAPL")]
    pub symbol: String,
    #[schema(example = 10)]
    pub quantity: u32,
    #[schema(example = "buy")]
    pub side: String,
    #[schema(example = "market")]
    pub order_type: String,
    #[schema(example = "gtc")]
    pub time_in_force: String,
    #[schema(example = "accepted")]
    pub status: String,
    /// 券商返回的已成交数量
    #[schema(example = "0")]
    pub filled_qty: Option<String>,
    pub created_at: Option<String>,
    /// 页面提示文案
    #[schema(example = "Buy order placed for 10 shares of AAPL")]
    pub message: String,
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

/// 浮点价格按最短十进制形式输出，`187.15` 不会展开成二进制近似值
fn decimal_text(v: f64) -> String {
    Decimal::from_f64(v)
        .map(|d| d.normalize().to_string())
        .unwrap_or_else(|| v.to_string())
}

impl From<&SymbolEntry> for SymbolResponse {
    fn from(e: &SymbolEntry) -> Self {
        Self {
            symbol: e.symbol.clone(),
            name: e.name.clone(),
        }
    }
}

impl From<&Candle> for CandleResponse {
    fn from(c: &Candle) -> Self {
        Self {
            time: c.time.to_rfc3339(),
            open: decimal_text(c.open),
            high: decimal_text(c.high),
            low: decimal_text(c.low),
            close: decimal_text(c.close),
            adj_close: c.adj_close.map(decimal_text),
            volume: decimal_text(c.volume),
            is_final: c.is_final,
        }
    }
}

impl From<&QuoteSnapshot> for SnapshotResponse {
    fn from(s: &QuoteSnapshot) -> Self {
        Self {
            last_price: s.last_price,
            year_high: s.year_high,
            year_low: s.year_low,
            last_volume: s.last_volume,
            market_cap: s.market_cap,
            currency: s.currency.clone(),
        }
    }
}

impl From<&CompanyProfile> for ProfileResponse {
    fn from(p: &CompanyProfile) -> Self {
        Self {
            long_name: p.long_name.clone(),
            sector: p.sector.clone(),
            industry: p.industry.clone(),
            business_summary: p.business_summary.clone(),
        }
    }
}

impl From<&FinancialStatement> for StatementResponse {
    fn from(s: &FinancialStatement) -> Self {
        Self {
            periods: s
                .periods
                .iter()
                .map(|p| p.format("%Y-%m-%d").to_string())
                .collect(),
            rows: s
                .rows
                .iter()
                .map(|r| LineItemResponse {
                    name: r.name.clone(),
                    values: r.values.clone(),
                })
                .collect(),
        }
    }
}

impl From<&HolderBreakdownRow> for HolderRowResponse {
    fn from(r: &HolderBreakdownRow) -> Self {
        Self {
            label: r.label.clone(),
            value: r.value,
            is_ratio: r.is_ratio,
        }
    }
}

impl From<&InstitutionalHolder> for InstitutionalHolderResponse {
    fn from(h: &InstitutionalHolder) -> Self {
        Self {
            holder: h.holder.clone(),
            shares: h.shares,
            date_reported: h.date_reported.map(|d| d.format("%Y-%m-%d").to_string()),
            pct_held: h.pct_held,
            value: h.value,
        }
    }
}

impl From<&DashboardView> for DashboardResponse {
    fn from(v: &DashboardView) -> Self {
        Self {
            symbol: v.symbol.clone(),
            name: v.directory_name.clone(),
            heading: v.heading().to_string(),
            snapshot: (&v.snapshot).into(),
            profile: SectionResponse::from_section("Company Profile", &v.profile, |p| p.into()),
            valuation: SectionResponse::from_section("Valuation Multiples", &v.profile, |p| {
                p.valuation
                    .rows()
                    .into_iter()
                    .map(|(metric, value)| ValuationRowResponse {
                        metric: metric.to_string(),
                        value,
                    })
                    .collect()
            }),
            candles: SectionResponse::from_section("Price Chart", &v.candles, |candles| {
                candles.iter().map(Into::into).collect()
            }),
            statements: v
                .statements
                .iter()
                .map(|(kind, section)| {
                    SectionResponse::from_section(kind.label(), section, |s| s.into())
                })
                .collect(),
            major_holders: SectionResponse::from_section("Major Holders", &v.major_holders, |h| {
                h.rows.iter().map(Into::into).collect()
            }),
            institutional_holders: SectionResponse::from_section(
                "Institutional Holders",
                &v.institutional_holders,
                |holders| holders.iter().map(Into::into).collect(),
            ),
            generated_at: v.generated_at.to_rfc3339(),
        }
    }
}

impl OrderResponse {
    /// 由下单意图、券商回执与提示文案组装
    pub fn new(request: &OrderRequest, ack: &OrderAck, message: String) -> Self {
        Self {
            id: ack.id.0.clone(),
            client_order_id: ack.client_order_id.clone(),
            symbol: ack.symbol.clone(),
            quantity: request.quantity(),
            side: ack.side.as_str().to_string(),
            order_type: ack.order_type.clone(),
            time_in_force: ack.time_in_force.clone(),
            status: ack.status.clone(),
            filled_qty: ack.filled_qty.map(|q| q.to_string()),
            created_at: ack.created_at.map(|t| t.to_rfc3339()),
            message,
        }
    }
}
