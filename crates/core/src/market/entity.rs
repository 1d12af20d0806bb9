use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `high` 必须大于或等于 `low`, `open`, `close`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    // K 线开始时间
    pub time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 调整后收盘价 (用于处理分红、拆股等复权情况)
    pub adj_close: Option<f64>,
    // 成交量
    pub volume: f64,
    // 是否为最终数据 (即该周期已收盘)
    pub is_final: bool,
}

impl Candle {
    /// 收盘价不低于开盘价即视为阳线
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// # Summary
/// 轻量行情快照：最新价、52 周高低、成交量与市值。
///
/// # Invariants
/// - 所有字段均可缺失；[`QuoteSnapshot::is_empty`] 为真时视作快照获取失败。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// 最新成交价
    pub last_price: Option<f64>,
    /// 52 周最高价
    pub year_high: Option<f64>,
    /// 52 周最低价
    pub year_low: Option<f64>,
    /// 最近一个交易日成交量
    pub last_volume: Option<u64>,
    /// 总市值
    pub market_cap: Option<f64>,
    /// 计价货币
    pub currency: Option<String>,
}

impl QuoteSnapshot {
    /// 价格、区间、成交量、市值全部缺失
    pub fn is_empty(&self) -> bool {
        self.last_price.is_none()
            && self.year_high.is_none()
            && self.year_low.is_none()
            && self.last_volume.is_none()
            && self.market_cap.is_none()
    }
}

/// # Summary
/// 估值倍数，全部来自公司档案接口。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationMultiples {
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_book: Option<f64>,
    pub enterprise_to_revenue: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
}

impl ValuationMultiples {
    /// # Summary
    /// 以固定顺序输出 (指标名, 值) 列表，供表格渲染与 JSON 输出共用。
    pub fn rows(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("P/E Ratio", self.trailing_pe),
            ("Forward P/E", self.forward_pe),
            ("P/S Ratio", self.price_to_sales),
            ("P/B Ratio", self.price_to_book),
            ("EV/Revenue", self.enterprise_to_revenue),
            ("EV/EBITDA", self.enterprise_to_ebitda),
        ]
    }
}

/// # Summary
/// 公司档案：名称、行业归属、业务简介与估值倍数。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub business_summary: Option<String>,
    pub valuation: ValuationMultiples,
}

/// # Summary
/// 财务报表种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// 利润表
    Income,
    /// 资产负债表
    BalanceSheet,
    /// 现金流量表
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::Income,
        StatementKind::BalanceSheet,
        StatementKind::CashFlow,
    ];

    /// 页面展示用标题
    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::Income => "Income Statement",
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::CashFlow => "Cash Flow",
        }
    }
}

/// # Summary
/// 报表中的单个科目 (行)。
///
/// # Invariants
/// - `values.len()` 等于所属报表的 `periods.len()`，缺失值为 `None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// # Summary
/// 财务报表表格：行为科目，列为报告期 (新在前)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub periods: Vec<NaiveDate>,
    pub rows: Vec<LineItem>,
}

impl FinancialStatement {
    /// 没有任何报告期或任何科目
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }
}

/// # Summary
/// 主要持有人分布中的一行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderBreakdownRow {
    /// 指标名称，例如 "% of Shares Held by Insiders"
    pub label: String,
    /// 原始数值 (比例以 0~1 表示，机构数量为整数值)
    pub value: f64,
    /// 是否为比例数据
    pub is_ratio: bool,
}

/// # Summary
/// 主要持有人分布表。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MajorHolders {
    pub rows: Vec<HolderBreakdownRow>,
}

/// # Summary
/// 机构持有人明细。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalHolder {
    pub holder: String,
    pub shares: Option<u64>,
    pub date_reported: Option<NaiveDate>,
    /// 占流通股比例 (0~1)
    pub pct_held: Option<f64>,
    pub value: Option<f64>,
}
