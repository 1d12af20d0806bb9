//! fundamentals-timeseries 接口：年度财务报表。
//!
//! 响应中每个科目是一个独立的 result，科目数组的键名等于请求的 type 名，
//! 因此这里用 `serde_json::Value` 做动态解析。

use chrono::NaiveDate;
use kabu_core::market::entity::{FinancialStatement, LineItem, StatementKind};
use kabu_core::market::error::MarketError;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

const ANNUAL_PREFIX: &str = "annual";

const INCOME_ITEMS: &[(&str, &str)] = &[
    ("TotalRevenue", "Total Revenue"),
    ("CostOfRevenue", "Cost Of Revenue"),
    ("GrossProfit", "Gross Profit"),
    ("OperatingExpense", "Operating Expense"),
    ("OperatingIncome", "Operating Income"),
    ("PretaxIncome", "Pretax Income"),
    ("TaxProvision", "Tax Provision"),
    ("NetIncome", "Net Income"),
    ("DilutedEPS", "Diluted EPS"),
    ("EBITDA", "EBITDA"),
];

const BALANCE_SHEET_ITEMS: &[(&str, &str)] = &[
    ("TotalAssets", "Total Assets"),
    ("CurrentAssets", "Current Assets"),
    ("CashAndCashEquivalents", "Cash And Cash Equivalents"),
    (
        "TotalLiabilitiesNetMinorityInterest",
        "Total Liabilities Net Minority Interest",
    ),
    ("CurrentLiabilities", "Current Liabilities"),
    ("LongTermDebt", "Long Term Debt"),
    ("StockholdersEquity", "Stockholders Equity"),
    ("RetainedEarnings", "Retained Earnings"),
];

const CASH_FLOW_ITEMS: &[(&str, &str)] = &[
    ("OperatingCashFlow", "Operating Cash Flow"),
    ("InvestingCashFlow", "Investing Cash Flow"),
    ("FinancingCashFlow", "Financing Cash Flow"),
    ("CapitalExpenditure", "Capital Expenditure"),
    ("FreeCashFlow", "Free Cash Flow"),
    ("RepurchaseOfCapitalStock", "Repurchase Of Capital Stock"),
    ("CashDividendsPaid", "Cash Dividends Paid"),
];

/// 报表对应的 (type 后缀, 展示名) 列表，决定行顺序
fn catalog(kind: StatementKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StatementKind::Income => INCOME_ITEMS,
        StatementKind::BalanceSheet => BALANCE_SHEET_ITEMS,
        StatementKind::CashFlow => CASH_FLOW_ITEMS,
    }
}

/// 请求参数 `type` 的取值，例如 `annualTotalRevenue,annualNetIncome`
pub(crate) fn type_param(kind: StatementKind) -> String {
    catalog(kind)
        .iter()
        .map(|(key, _)| format!("{}{}", ANNUAL_PREFIX, key))
        .collect::<Vec<_>>()
        .join(",")
}

/// # Summary
/// 将 timeseries 响应解析为报表表格。
///
/// # Logic
/// 1. 逐个 result 读取 `meta.type[0]`，再按该键取出 `{asOfDate, reportedValue.raw}` 数组。
/// 2. 所有出现过的 asOfDate 组成报告期列，新在前。
/// 3. 按目录顺序生成行，整行为空的科目不输出。
/// 4. 没有任何数据时返回 `NotFound`。
pub(crate) fn parse_statement(
    kind: StatementKind,
    body: &Value,
) -> Result<FinancialStatement, MarketError> {
    let timeseries = body
        .get("timeseries")
        .ok_or_else(|| MarketError::Parse("missing timeseries".into()))?;
    if let Some(description) = timeseries
        .get("error")
        .filter(|e| !e.is_null())
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
    {
        return Err(MarketError::Unknown(description.to_string()));
    }

    let results = timeseries
        .get("result")
        .and_then(Value::as_array)
        .ok_or(MarketError::NotFound)?;

    let mut series: HashMap<String, HashMap<NaiveDate, f64>> = HashMap::new();
    let mut periods = BTreeSet::new();
    for result in results {
        let Some(type_name) = result
            .pointer("/meta/type/0")
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Some(points) = result.get(type_name).and_then(Value::as_array) else {
            continue;
        };
        let key = type_name.strip_prefix(ANNUAL_PREFIX).unwrap_or(type_name);
        let values = series.entry(key.to_string()).or_default();
        for point in points {
            let date = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let value = point.pointer("/reportedValue/raw").and_then(Value::as_f64);
            if let (Some(date), Some(value)) = (date, value) {
                periods.insert(date);
                values.insert(date, value);
            }
        }
    }

    let periods: Vec<NaiveDate> = periods.into_iter().rev().collect();
    let rows: Vec<LineItem> = catalog(kind)
        .iter()
        .filter_map(|(key, label)| {
            let values = series.get(*key)?;
            if values.is_empty() {
                return None;
            }
            Some(LineItem {
                name: (*label).to_string(),
                values: periods.iter().map(|p| values.get(p).copied()).collect(),
            })
        })
        .collect();

    let statement = FinancialStatement {
        kind,
        periods,
        rows,
    };
    if statement.is_empty() {
        return Err(MarketError::NotFound);
    }
    Ok(statement)
}
