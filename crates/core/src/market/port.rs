use crate::common::TimeFrame;
use crate::market::entity::{
    Candle, CompanyProfile, FinancialStatement, InstitutionalHolder, MajorHolders, QuoteSnapshot,
    StatementKind,
};
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// # Summary
/// 行情与基本面数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 每个方法都是独立的失败边界：任意一个调用失败不得影响其他调用的结果。
/// - 实现者不得缓存行情数据，每次调用都应反映数据源的当前状态。
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// # Summary
    /// 获取轻量行情快照。
    ///
    /// # Returns
    /// 成功返回快照；所有字段均缺失时实现应返回 `MarketError::NotFound`。
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, MarketError>;

    /// # Summary
    /// 获取公司档案与估值倍数。
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketError>;

    /// # Summary
    /// 获取特定证券在指定时间范围内的 K 线数据。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `timeframe`: K 线周期。
    /// * `start`: 开始时间。
    /// * `end`: 结束时间。
    ///
    /// # Returns
    /// 成功返回按时间升序排列的 K 线列表。
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MarketError>;

    /// # Summary
    /// 获取一张年度财务报表。
    ///
    /// # Arguments
    /// * `start` / `end`: 报告期截止日落在此区间内的年报才会返回。
    async fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialStatement, MarketError>;

    /// # Summary
    /// 获取主要持有人分布。
    async fn fetch_major_holders(&self, symbol: &str) -> Result<MajorHolders, MarketError>;

    /// # Summary
    /// 获取机构持有人明细。数据源无记录时返回空列表而非错误。
    async fn fetch_institutional_holders(
        &self,
        symbol: &str,
    ) -> Result<Vec<InstitutionalHolder>, MarketError>;
}
