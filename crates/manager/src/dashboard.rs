use chrono::{DateTime, Duration, Utc};
use kabu_core::common::TimeFrame;
use kabu_core::common::time::TimeProvider;
use kabu_core::directory::SymbolDirectory;
use kabu_core::market::entity::{
    Candle, CompanyProfile, FinancialStatement, InstitutionalHolder, MajorHolders, QuoteSnapshot,
    StatementKind,
};
use kabu_core::market::error::MarketError;
use kabu_core::market::port::QuoteProvider;
use std::sync::Arc;
use thiserror::Error;

/// 仪表盘默认展示的历史窗口 (天)
pub const CHART_LOOKBACK_DAYS: i64 = 365;
/// K 线接口允许的最大窗口 (天)
pub const MAX_LOOKBACK_DAYS: i64 = 3650;
/// 年报回溯窗口 (天)，约五个财年
pub const STATEMENT_LOOKBACK_DAYS: i64 = 365 * 5;

/// 单个页面区块的抓取结果，失败只影响该区块
pub type Section<T> = Result<T, MarketError>;

/// # Summary
/// 视图组装失败。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    /// 快照失败时整页只显示这句提示
    #[error("Failed to fetch price/volume info. Please try another stock.")]
    SnapshotUnavailable(#[source] MarketError),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("market data error: {0}")]
    Market(#[from] MarketError),
}

/// # Summary
/// 一次页面渲染所需的全部数据。
///
/// # Invariants
/// - 只有快照成功时才会被构造，因此 `snapshot` 不是 `Section`。
/// - `statements` 固定按利润表、资产负债表、现金流量表顺序排列。
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub symbol: String,
    /// 代码目录中的公司名称
    pub directory_name: String,
    pub snapshot: QuoteSnapshot,
    pub profile: Section<CompanyProfile>,
    pub candles: Section<Vec<Candle>>,
    pub statements: Vec<(StatementKind, Section<FinancialStatement>)>,
    pub major_holders: Section<MajorHolders>,
    pub institutional_holders: Section<Vec<InstitutionalHolder>>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    /// 页面标题：优先公司全称，否则退回代码
    pub fn heading(&self) -> &str {
        self.profile
            .as_ref()
            .ok()
            .and_then(|p| p.long_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.symbol)
    }

    pub fn statement(&self, kind: StatementKind) -> Option<&Section<FinancialStatement>> {
        self.statements
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, section)| section)
    }
}

/// # Summary
/// 仪表盘管理器，页面与 JSON 接口共用的数据组装门面。
/// 编译期仅依赖 `kabu-core` 中的 Trait 定义，具体实现通过构造函数注入。
///
/// # Invariants
/// - 每次 `load` 内的行情调用严格顺序执行，不并发。
/// - 不缓存任何行情数据，每次请求都重新抓取。
pub struct DashboardManager {
    provider: Arc<dyn QuoteProvider>,
    directory: Arc<SymbolDirectory>,
    clock: Arc<dyn TimeProvider>,
}

impl DashboardManager {
    /// # Summary
    /// 创建 DashboardManager 实例。
    ///
    /// # Arguments
    /// * `provider` - 行情端口实现。
    /// * `directory` - 启动时加载的只读代码目录。
    /// * `clock` - 时钟，用于计算历史窗口。
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        directory: Arc<SymbolDirectory>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            provider,
            directory,
            clock,
        }
    }

    pub fn directory(&self) -> &SymbolDirectory {
        &self.directory
    }

    /// 规范化并校验代码必须在目录中
    fn resolve<'a>(&'a self, symbol: &str) -> Result<(String, &'a str), ViewError> {
        let symbol = symbol.trim().to_uppercase();
        match self.directory.name_of(&symbol) {
            Some(name) => Ok((symbol, name)),
            None => Err(ViewError::UnknownSymbol(symbol)),
        }
    }

    /// # Summary
    /// 组装一个代码的完整仪表盘视图。
    ///
    /// # Logic
    /// 1. 校验代码。
    /// 2. 抓取快照；失败立即返回 `SnapshotUnavailable`，不再发起其他请求。
    /// 3. 依次抓取档案、一年日线、三张报表、主要持有人、机构持有人，
    ///    每一项失败都只记录在各自区块中。
    ///
    /// # Returns
    /// 成功返回 `DashboardView`；未知代码或快照失败返回 `ViewError`。
    pub async fn load(&self, symbol: &str) -> Result<DashboardView, ViewError> {
        let (symbol, directory_name) = self.resolve(symbol)?;

        let snapshot = self.provider.fetch_snapshot(&symbol).await.map_err(|e| {
            tracing::warn!("Snapshot unavailable for {}: {}", symbol, e);
            ViewError::SnapshotUnavailable(e)
        })?;

        let now = self.clock.now();
        let profile = section(&symbol, "profile", self.provider.fetch_profile(&symbol).await);
        let candles = section(
            &symbol,
            "price history",
            self.provider
                .fetch_candles(
                    &symbol,
                    TimeFrame::Day1,
                    now - Duration::days(CHART_LOOKBACK_DAYS),
                    now,
                )
                .await,
        );

        let statement_start = now - Duration::days(STATEMENT_LOOKBACK_DAYS);
        let mut statements = Vec::with_capacity(StatementKind::ALL.len());
        for kind in StatementKind::ALL {
            let result = self
                .provider
                .fetch_statement(&symbol, kind, statement_start, now)
                .await;
            statements.push((kind, section(&symbol, kind.label(), result)));
        }

        let major_holders = section(
            &symbol,
            "major holders",
            self.provider.fetch_major_holders(&symbol).await,
        );
        let institutional_holders = section(
            &symbol,
            "institutional holders",
            self.provider.fetch_institutional_holders(&symbol).await,
        );

        tracing::debug!("Dashboard view assembled for {}", symbol);
        Ok(DashboardView {
            directory_name: directory_name.to_string(),
            symbol,
            snapshot,
            profile,
            candles,
            statements,
            major_holders,
            institutional_holders,
            generated_at: now,
        })
    }

    /// # Summary
    /// 单独抓取一段 K 线，供图表与 K 线接口使用。
    ///
    /// # Arguments
    /// * `days` - 自当前时钟向前回溯的天数，范围 1 到 `MAX_LOOKBACK_DAYS`。
    pub async fn load_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        days: i64,
    ) -> Result<Vec<Candle>, ViewError> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(ViewError::InvalidRange(format!(
                "days must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, days
            )));
        }
        let (symbol, _) = self.resolve(symbol)?;
        let now = self.clock.now();
        Ok(self
            .provider
            .fetch_candles(&symbol, timeframe, now - Duration::days(days), now)
            .await?)
    }
}

/// 记录失败区块并原样返回
fn section<T>(symbol: &str, name: &str, result: Section<T>) -> Section<T> {
    if let Err(e) = &result {
        tracing::warn!("{} section unavailable for {}: {}", name, symbol, e);
    }
    result
}
