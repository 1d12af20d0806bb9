//! v7 quote 与 v10 quoteSummary 接口的响应结构。

use chrono::{DateTime, Utc};
use kabu_core::market::entity::{
    CompanyProfile, HolderBreakdownRow, InstitutionalHolder, MajorHolders, QuoteSnapshot,
    ValuationMultiples,
};
use kabu_core::market::error::MarketError;
use serde::Deserialize;

/// 档案与估值所需的 quoteSummary 模块
pub(crate) const PROFILE_MODULES: &str = "assetProfile,price,summaryDetail,defaultKeyStatistics";
pub(crate) const MAJOR_HOLDERS_MODULES: &str = "majorHoldersBreakdown";
pub(crate) const INSTITUTION_MODULES: &str = "institutionOwnership";

/// Yahoo 通用错误体
#[derive(Deserialize, Debug)]
pub(crate) struct YahooError {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

impl YahooError {
    fn into_market_error(self) -> MarketError {
        let description = self.description.unwrap_or_default();
        match self.code.as_deref() {
            Some("Not Found") => MarketError::NotFound,
            Some("Unauthorized") => MarketError::Unauthorized(description),
            _ => MarketError::Unknown(description),
        }
    }
}

/// `{"raw": 1.23, "fmt": "1.23"}` 形式的数值；缺失时 Yahoo 返回 `{}`
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub(crate) struct RawNumber {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(v: &Option<RawNumber>) -> Option<f64> {
    v.as_ref().and_then(|n| n.raw).filter(|x| x.is_finite())
}

// ============================================================
//  v7 quote
// ============================================================

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteResponse {
    quote_response: QuoteBody,
}

#[derive(Deserialize, Debug)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteRow>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QuoteRow {
    regular_market_price: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    regular_market_volume: Option<f64>,
    market_cap: Option<f64>,
    currency: Option<String>,
}

impl QuoteResponse {
    /// # Summary
    /// 转换为行情快照。
    ///
    /// # Logic
    /// 1. 透传 Yahoo 错误。
    /// 2. 结果为空或所有字段缺失时返回 `NotFound`。
    pub(crate) fn into_snapshot(self) -> Result<QuoteSnapshot, MarketError> {
        if let Some(err) = self.quote_response.error {
            return Err(err.into_market_error());
        }
        let row = self
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or(MarketError::NotFound)?;

        let snapshot = QuoteSnapshot {
            last_price: row.regular_market_price,
            year_high: row.fifty_two_week_high,
            year_low: row.fifty_two_week_low,
            last_volume: row.regular_market_volume.and_then(to_u64),
            market_cap: row.market_cap,
            currency: row.currency,
        };
        if snapshot.is_empty() {
            return Err(MarketError::NotFound);
        }
        Ok(snapshot)
    }
}

fn to_u64(v: f64) -> Option<u64> {
    if v.is_finite() && v >= 0.0 {
        format!("{:.0}", v).parse().ok()
    } else {
        None
    }
}

// ============================================================
//  v10 quoteSummary
// ============================================================

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryResponse {
    quote_summary: SummaryBody,
}

#[derive(Deserialize, Debug)]
struct SummaryBody {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooError>,
}

/// 一个证券的全部已请求模块，未请求的模块为 None
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryResult {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    major_holders_breakdown: Option<HoldersBreakdown>,
    institution_ownership: Option<InstitutionOwnership>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    long_business_summary: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    price_to_sales_trailing12_months: Option<RawNumber>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    price_to_book: Option<RawNumber>,
    enterprise_to_revenue: Option<RawNumber>,
    enterprise_to_ebitda: Option<RawNumber>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HoldersBreakdown {
    insiders_percent_held: Option<RawNumber>,
    institutions_percent_held: Option<RawNumber>,
    institutions_float_percent_held: Option<RawNumber>,
    institutions_count: Option<RawNumber>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InstitutionOwnership {
    #[serde(default)]
    ownership_list: Vec<OwnershipRow>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OwnershipRow {
    organization: Option<String>,
    report_date: Option<RawNumber>,
    pct_held: Option<RawNumber>,
    position: Option<RawNumber>,
    value: Option<RawNumber>,
}

impl SummaryResponse {
    /// 取出第一个结果，Yahoo 错误转换为 `MarketError`
    pub(crate) fn into_result(self) -> Result<SummaryResult, MarketError> {
        if let Some(err) = self.quote_summary.error {
            return Err(err.into_market_error());
        }
        self.quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or(MarketError::NotFound)
    }
}

impl SummaryResult {
    /// # Summary
    /// 组装公司档案。
    ///
    /// # Logic
    /// 1. 名称优先取 longName，其次 shortName。
    /// 2. 远期市盈率优先取 summaryDetail，缺失时回退到 defaultKeyStatistics。
    pub(crate) fn into_profile(self) -> CompanyProfile {
        let (sector, industry, business_summary) = match self.asset_profile {
            Some(p) => (p.sector, p.industry, p.long_business_summary),
            None => (None, None, None),
        };
        let long_name = self.price.and_then(|p| p.long_name.or(p.short_name));

        let detail = self.summary_detail;
        let stats = self.default_key_statistics;
        let valuation = ValuationMultiples {
            trailing_pe: detail.as_ref().and_then(|d| raw(&d.trailing_pe)),
            forward_pe: detail
                .as_ref()
                .and_then(|d| raw(&d.forward_pe))
                .or_else(|| stats.as_ref().and_then(|s| raw(&s.forward_pe))),
            price_to_sales: detail
                .as_ref()
                .and_then(|d| raw(&d.price_to_sales_trailing12_months)),
            price_to_book: stats.as_ref().and_then(|s| raw(&s.price_to_book)),
            enterprise_to_revenue: stats.as_ref().and_then(|s| raw(&s.enterprise_to_revenue)),
            enterprise_to_ebitda: stats.as_ref().and_then(|s| raw(&s.enterprise_to_ebitda)),
        };

        CompanyProfile {
            long_name,
            sector,
            industry,
            business_summary,
            valuation,
        }
    }

    /// 主要持有人分布；模块缺失或全部为空时返回 `NotFound`
    pub(crate) fn into_major_holders(self) -> Result<MajorHolders, MarketError> {
        let b = self.major_holders_breakdown.ok_or(MarketError::NotFound)?;
        let candidates = [
            ("% of Shares Held by All Insider", raw(&b.insiders_percent_held), true),
            ("% of Shares Held by Institutions", raw(&b.institutions_percent_held), true),
            ("% of Float Held by Institutions", raw(&b.institutions_float_percent_held), true),
            ("Number of Institutions Holding Shares", raw(&b.institutions_count), false),
        ];
        let rows: Vec<HolderBreakdownRow> = candidates
            .into_iter()
            .filter_map(|(label, value, is_ratio)| {
                value.map(|value| HolderBreakdownRow {
                    label: label.to_string(),
                    value,
                    is_ratio,
                })
            })
            .collect();
        if rows.is_empty() {
            return Err(MarketError::NotFound);
        }
        Ok(MajorHolders { rows })
    }

    /// 机构持有人明细；模块存在但列表为空时返回空列表
    pub(crate) fn into_institutional_holders(
        self,
    ) -> Result<Vec<InstitutionalHolder>, MarketError> {
        let ownership = self.institution_ownership.ok_or(MarketError::NotFound)?;
        Ok(ownership
            .ownership_list
            .into_iter()
            .filter_map(|row| {
                let holder = row.organization?;
                Some(InstitutionalHolder {
                    holder,
                    shares: raw(&row.position).and_then(to_u64),
                    date_reported: raw(&row.report_date)
                        .and_then(|ts| format!("{:.0}", ts).parse::<i64>().ok())
                        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
                        .map(|dt| dt.date_naive()),
                    pct_held: raw(&row.pct_held),
                    value: raw(&row.value),
                })
            })
            .collect())
    }
}
