//! 仪表盘 HTML 页面。
//!
//! 页面结构位于 `templates/`，由 askama 编译期生成渲染代码并自动转义所有插值；
//! 本模块只负责把领域对象整理成模板所需的展示文本。

use askama::Template;
use kabu_core::directory::SymbolDirectory;
use kabu_core::market::entity::{FinancialStatement, InstitutionalHolder, MajorHolders};
use kabu_core::trade::entity::OrderOutcome;
use kabu_manager::dashboard::{DashboardView, Section};

use super::chart::candlestick_svg;
use super::format::{
    NOT_AVAILABLE, decimal2, opt_thousands_f64, opt_thousands_u64, percent, text_or_na,
    thousands_f64,
};

const PAGE_TITLE: &str = "S&P 500 Dashboard";

/// # Summary
/// 每个页面共享的上下文：代码下拉框与最近一次下单结果。
pub struct PageContext<'a> {
    pub directory: &'a SymbolDirectory,
    /// 当前选中的代码
    pub selected: &'a str,
    /// 本次请求中刚刚提交的订单结果
    pub outcome: Option<&'a OrderOutcome>,
}

/// 代码下拉框中的一项
pub struct SymbolOption<'a> {
    pub symbol: &'a str,
    pub name: &'a str,
    pub selected: bool,
}

/// 下单结果横幅；成功时附带券商回执原文
pub struct Banner {
    /// `success` 或 `error`
    pub class: &'static str,
    pub message: String,
    pub receipt: Option<String>,
}

pub struct StatementBlock {
    pub label: &'static str,
    /// 报表缺失或为空时为 None
    pub table: Option<StatementTable>,
}

/// 报表表格：行为科目，列为报告期 (新在前)
pub struct StatementTable {
    pub periods: Vec<String>,
    pub rows: Vec<StatementRow>,
}

pub struct StatementRow {
    pub name: String,
    pub values: Vec<String>,
}

/// 两列表格的一行 (估值倍数、主要持股人)
pub struct ValueRow {
    pub label: String,
    pub value: String,
}

pub struct HolderRow {
    pub holder: String,
    pub shares: String,
    pub date_reported: String,
    pub pct_held: String,
    pub value: String,
}

/// # Summary
/// 完整仪表盘页面。
///
/// # Invariants
/// - 区块顺序固定：概览与图表、公司简介、财务报表、估值倍数、持股信息、下单表单。
/// - 任一区块数据缺失只影响该区块，展示对应占位文本。
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub title: String,
    pub options: Vec<SymbolOption<'a>>,
    pub outcome: Option<Banner>,
    pub symbol: &'a str,
    pub heading: &'a str,
    pub sector: &'a str,
    pub industry: &'a str,
    pub market_cap: String,
    pub year_high: String,
    pub year_low: String,
    pub volume: String,
    /// 内联 SVG，由图表模块生成，插入时不再转义
    pub chart: Option<String>,
    pub description: Option<&'a str>,
    pub statements: Vec<StatementBlock>,
    pub valuation: Option<Vec<ValueRow>>,
    pub major_holders: Option<Vec<ValueRow>>,
    /// Err 中为占位文本
    pub institutional: Result<Vec<HolderRow>, &'static str>,
}

/// # Summary
/// 无法展示仪表盘时的页面 (快照失败或未知代码)。
///
/// # Invariants
/// - 只包含标题、代码下拉框、下单结果 (若有) 与错误提示，不含任何行情区块标题。
#[derive(Template)]
#[template(path = "message.html")]
pub struct MessagePage<'a> {
    pub title: String,
    pub options: Vec<SymbolOption<'a>>,
    pub outcome: Option<Banner>,
    pub message: &'a str,
}

/// # Summary
/// 渲染完整仪表盘。
///
/// # Returns
/// 模板渲染失败时返回 askama 错误。
pub fn dashboard_page(ctx: &PageContext<'_>, view: &DashboardView) -> askama::Result<String> {
    let profile = view.profile.as_ref().ok();
    let snapshot = &view.snapshot;

    DashboardPage {
        title: format!("{} - {}", view.symbol, PAGE_TITLE),
        options: symbol_options(ctx),
        outcome: ctx.outcome.map(banner),
        symbol: &view.symbol,
        heading: view.heading(),
        sector: text_or_na(profile.and_then(|p| p.sector.as_deref())),
        industry: text_or_na(profile.and_then(|p| p.industry.as_deref())),
        market_cap: opt_thousands_f64(snapshot.market_cap),
        year_high: decimal2(snapshot.year_high),
        year_low: decimal2(snapshot.year_low),
        volume: opt_thousands_u64(snapshot.last_volume),
        chart: view.candles.as_deref().ok().and_then(candlestick_svg),
        description: profile
            .and_then(|p| p.business_summary.as_deref())
            .filter(|s| !s.trim().is_empty()),
        statements: view
            .statements
            .iter()
            .map(|(kind, section)| StatementBlock {
                label: kind.label(),
                table: section
                    .as_ref()
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(statement_table),
            })
            .collect(),
        valuation: profile.map(|p| {
            p.valuation
                .rows()
                .into_iter()
                .map(|(label, value)| ValueRow {
                    label: label.to_string(),
                    value: decimal2(value),
                })
                .collect()
        }),
        major_holders: major_holder_rows(&view.major_holders),
        institutional: institutional_rows(&view.institutional_holders),
    }
    .render()
}

/// 渲染错误提示页
pub fn message_page(ctx: &PageContext<'_>, message: &str) -> askama::Result<String> {
    MessagePage {
        title: PAGE_TITLE.to_string(),
        options: symbol_options(ctx),
        outcome: ctx.outcome.map(banner),
        message,
    }
    .render()
}

fn symbol_options<'a>(ctx: &PageContext<'a>) -> Vec<SymbolOption<'a>> {
    ctx.directory
        .entries()
        .iter()
        .map(|entry| SymbolOption {
            symbol: &entry.symbol,
            name: &entry.name,
            selected: entry.symbol == ctx.selected,
        })
        .collect()
}

fn banner(outcome: &OrderOutcome) -> Banner {
    match outcome {
        OrderOutcome::Placed { message, ack } => Banner {
            class: "success",
            message: message.clone(),
            receipt: Some(
                serde_json::to_string_pretty(&ack.raw).unwrap_or_else(|_| ack.raw.to_string()),
            ),
        },
        OrderOutcome::Failed { message } => Banner {
            class: "error",
            message: message.clone(),
            receipt: None,
        },
    }
}

fn statement_table(statement: &FinancialStatement) -> StatementTable {
    StatementTable {
        periods: statement
            .periods
            .iter()
            .map(|p| p.format("%Y-%m-%d").to_string())
            .collect(),
        rows: statement
            .rows
            .iter()
            .map(|row| StatementRow {
                name: row.name.clone(),
                values: row.values.iter().map(|v| opt_thousands_f64(*v)).collect(),
            })
            .collect(),
    }
}

/// 比例行展示为百分比，其余按千分位整数展示
fn major_holder_rows(section: &Section<MajorHolders>) -> Option<Vec<ValueRow>> {
    let holders = section.as_ref().ok()?;
    Some(
        holders
            .rows
            .iter()
            .map(|row| ValueRow {
                label: row.label.clone(),
                value: if row.is_ratio {
                    percent(row.value)
                } else {
                    thousands_f64(row.value)
                },
            })
            .collect(),
    )
}

fn institutional_rows(
    section: &Section<Vec<InstitutionalHolder>>,
) -> Result<Vec<HolderRow>, &'static str> {
    match section {
        Err(_) => Err("Institutional holders data not available."),
        Ok(holders) if holders.is_empty() => Err("No institutional holders data."),
        Ok(holders) => Ok(holders
            .iter()
            .map(|h| HolderRow {
                holder: h.holder.clone(),
                shares: opt_thousands_u64(h.shares),
                date_reported: h.date_reported.map_or_else(
                    || NOT_AVAILABLE.to_string(),
                    |d| d.format("%Y-%m-%d").to_string(),
                ),
                pct_held: h.pct_held.map_or_else(|| NOT_AVAILABLE.to_string(), percent),
                value: opt_thousands_f64(h.value),
            })
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kabu_core::market::entity::{QuoteSnapshot, StatementKind};
    use kabu_core::market::error::MarketError;
    use kabu_core::testing::{
        sample_candles, sample_institutional_holders, sample_major_holders, sample_profile,
        sample_snapshot, sample_statement,
    };

    fn directory() -> SymbolDirectory {
        SymbolDirectory::from_entries(vec![
            ("AAPL".to_string(), "Apple Inc.".to_string()),
            ("T".to_string(), "AT&T Inc.".to_string()),
        ])
        .unwrap()
    }

    fn full_view() -> DashboardView {
        DashboardView {
            symbol: "AAPL".into(),
            directory_name: "Apple Inc.".into(),
            snapshot: sample_snapshot(),
            profile: Ok(sample_profile()),
            candles: Ok(sample_candles(30)),
            statements: StatementKind::ALL
                .into_iter()
                .map(|k| (k, Ok(sample_statement(k))))
                .collect(),
            major_holders: Ok(sample_major_holders()),
            institutional_holders: Ok(sample_institutional_holders()),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_page_sections() {
        let dir = directory();
        let ctx = PageContext {
            directory: &dir,
            selected: "AAPL",
            outcome: None,
        };
        let html = dashboard_page(&ctx, &full_view()).unwrap();
        for heading in [
            "Company Overview",
            "Price Chart",
            "Business Description",
            "Income Statement",
            "Balance Sheet",
            "Cash Flow",
            "Valuation Multiples",
            "Major Holders",
            "Institutional Holders",
            "Trade with Alpaca (Paper Trading)",
        ] {
            assert!(html.contains(heading), "missing {heading}");
        }
        assert!(html.contains("<h3>Apple Inc.</h3>"));
        assert!(html.contains("2,952,053,932,032"));
        assert!(html.contains("53,665,600"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<option value=\"AAPL\" selected>AAPL - Apple Inc.</option>"));
        assert!(html.contains("AT&amp;T Inc."));
        assert!(html.contains("P/E Ratio"));
    }

    #[test]
    fn test_failed_sections_show_placeholders() {
        let dir = directory();
        let ctx = PageContext {
            directory: &dir,
            selected: "AAPL",
            outcome: None,
        };
        let mut view = full_view();
        view.profile = Err(MarketError::NotFound);
        view.candles = Ok(Vec::new());
        view.statements[1].1 = Err(MarketError::Network("timeout".into()));
        view.major_holders = Err(MarketError::NotFound);
        view.institutional_holders = Ok(Vec::new());
        view.snapshot = QuoteSnapshot {
            market_cap: None,
            ..sample_snapshot()
        };

        let html = dashboard_page(&ctx, &view).unwrap();
        assert!(html.contains("<h3>AAPL</h3>"));
        assert!(html.contains("<strong>Sector:</strong> N/A"));
        assert!(html.contains("<strong>Market Cap:</strong> N/A"));
        assert!(html.contains("Price chart not available."));
        assert!(html.contains("Description not available."));
        assert!(html.contains("Balance Sheet not available."));
        assert!(!html.contains("Income Statement not available."));
        assert!(html.contains("Valuation data unavailable."));
        assert!(html.contains("Major holders data not available."));
        assert!(html.contains("No institutional holders data."));
    }

    #[test]
    fn test_institutional_failure_placeholder() {
        let section: Section<Vec<InstitutionalHolder>> = Err(MarketError::NotFound);
        assert_eq!(
            institutional_rows(&section).err(),
            Some("Institutional holders data not available.")
        );
    }

    #[test]
    fn test_message_page_has_no_sections() {
        let dir = directory();
        let outcome = OrderOutcome::Failed {
            message: "Order failed: <boom>".into(),
        };
        let ctx = PageContext {
            directory: &dir,
            selected: "AAPL",
            outcome: Some(&outcome),
        };
        let html = message_page(
            &ctx,
            "Failed to fetch price/volume info. Please try another stock.",
        )
        .unwrap();
        assert!(html.contains("Failed to fetch price/volume info. Please try another stock."));
        assert!(html.contains("Order failed: &lt;boom&gt;"));
        assert!(!html.contains("<h2>"));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn test_feed_text_is_escaped() {
        let dir = directory();
        let ctx = PageContext {
            directory: &dir,
            selected: "AAPL",
            outcome: None,
        };
        let mut view = full_view();
        if let Ok(profile) = view.profile.as_mut() {
            profile.business_summary = Some("<script>alert(1)</script> & more".into());
            profile.sector = Some("Tech <b>".into());
        }

        let html = dashboard_page(&ctx, &view).unwrap();
        assert!(html.contains("<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; more</p>"));
        assert!(html.contains("<strong>Sector:</strong> Tech &lt;b&gt;"));
        assert!(!html.contains("<script>"));
        // 图表 SVG 原样嵌入
        assert!(html.contains("<svg"));
        assert!(html.contains("<title>AAPL - S&amp;P 500 Dashboard</title>"));
    }

    #[test]
    fn test_placed_order_shows_receipt() {
        let dir = directory();
        let ack = kabu_core::trade::entity::OrderAck {
            id: kabu_core::trade::entity::OrderId("ord-1".into()),
            client_order_id: None,
            symbol: "AAPL".into(),
            qty: None,
            filled_qty: None,
            side: kabu_core::trade::entity::OrderSide::Buy,
            order_type: "market".into(),
            time_in_force: "gtc".into(),
            status: "accepted".into(),
            created_at: None,
            raw: serde_json::json!({"id": "ord-1", "status": "accepted"}),
        };
        let outcome = OrderOutcome::Placed {
            message: "Buy order placed for 1 shares of AAPL".into(),
            ack,
        };
        let ctx = PageContext {
            directory: &dir,
            selected: "AAPL",
            outcome: Some(&outcome),
        };
        let html = dashboard_page(&ctx, &full_view()).unwrap();
        assert!(html.contains("<div class=\"banner success\">Buy order placed for 1 shares of AAPL</div>"));
        assert!(html.contains("&quot;status&quot;: &quot;accepted&quot;"));
        let trade_at = html.find("<section id=\"trade\">").unwrap();
        assert!(html.find("banner success").unwrap() > trade_at);
    }
}
