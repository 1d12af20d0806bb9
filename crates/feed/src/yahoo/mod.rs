mod chart;
mod summary;
mod timeseries;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kabu_core::common::TimeFrame;
use kabu_core::config::FeedConfig;
use kabu_core::market::entity::{
    Candle, CompanyProfile, FinancialStatement, InstitutionalHolder, MajorHolders, QuoteSnapshot,
    StatementKind,
};
use kabu_core::market::error::MarketError;
use kabu_core::market::port::QuoteProvider;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use chart::ChartResponse;
use summary::{QuoteResponse, SummaryResponse, SummaryResult};

/// # Summary
/// Yahoo Finance 行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，开启 cookie 存储以维持会话。
/// - quote / quoteSummary 需要会话 crumb：首次使用时获取，收到 401 后丢弃，下一次调用重新获取。
/// - 不缓存任何行情数据。
#[derive(Clone)]
pub struct YahooProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 端点配置
    endpoints: Arc<FeedConfig>,
    /// 会话 crumb
    crumb: Arc<RwLock<Option<String>>>,
}

impl YahooProvider {
    /// # Summary
    /// 创建一个新的 YahooProvider 实例。
    ///
    /// # Logic
    /// 1. 注册 TLS 加密后端，重复调用无副作用。
    /// 2. 按配置设置超时，替代无限期挂起。
    /// 3. 设置浏览器 User-Agent 以减少被拦截风险。
    /// 4. 开启 cookie 存储。
    ///
    /// # Returns
    /// 成功返回 YahooProvider；HTTP 客户端构建失败返回 `MarketError::Unknown`。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        kabu_core::install_crypto_provider();

        let mut headers = reqwest::header::HeaderMap::new();
        let user_agent = reqwest::header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| MarketError::Unknown(format!("invalid user agent: {}", e)))?;
        headers.insert(reqwest::header::USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| MarketError::Unknown(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoints: Arc::new(config.clone()),
            crumb: Arc::new(RwLock::new(None)),
        })
    }

    /// # Summary
    /// 获取 (必要时建立) 会话 crumb。
    ///
    /// # Logic
    /// 1. 读锁命中直接返回。
    /// 2. 写锁内二次检查，避免并发请求重复建会话。
    /// 3. 访问 cookie 地址拿到会话 cookie (该地址通常返回 404，状态码忽略)。
    /// 4. 请求 getcrumb，返回体即 crumb 文本。
    async fn crumb(&self) -> Result<String, MarketError> {
        if let Some(crumb) = self.crumb.read().await.clone() {
            return Ok(crumb);
        }

        let mut guard = self.crumb.write().await;
        if let Some(crumb) = guard.clone() {
            return Ok(crumb);
        }

        tracing::debug!("Establishing Yahoo session via {}", self.endpoints.cookie_url);
        self.client
            .get(&self.endpoints.cookie_url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let resp = self
            .client
            .get(format!(
                "{}/v1/test/getcrumb",
                self.endpoints.query_base_url
            ))
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(MarketError::Unauthorized(format!(
                "crumb request returned HTTP {}",
                resp.status()
            )));
        }
        let crumb = resp
            .text()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?
            .trim()
            .to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(MarketError::Unauthorized("empty crumb".into()));
        }

        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.write().await = None;
    }

    /// # Summary
    /// 发起 GET 请求并把 JSON 解码为 `T`。
    ///
    /// # Logic
    /// 1. 401 → 丢弃 crumb 并返回 `Unauthorized`。
    /// 2. 404 → `NotFound`。
    /// 3. 其他非 2xx → `Network`。
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketError> {
        tracing::debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                self.invalidate_crumb().await;
                Err(MarketError::Unauthorized(format!("HTTP 401 from {}", url)))
            }
            StatusCode::NOT_FOUND => Err(MarketError::NotFound),
            status if !status.is_success() => {
                Err(MarketError::Network(format!("HTTP {}", status)))
            }
            _ => resp
                .json::<T>()
                .await
                .map_err(|e| MarketError::Parse(e.to_string())),
        }
    }

    /// 请求 quoteSummary 的指定模块
    async fn quote_summary(
        &self,
        symbol: &str,
        modules: &str,
    ) -> Result<SummaryResult, MarketError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.endpoints.query_base_url, symbol
        );
        let resp: SummaryResponse = self
            .get_json(
                &url,
                &[("modules", modules.to_string()), ("crumb", crumb)],
            )
            .await?;
        resp.into_result()
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    /// # Summary
    /// 通过 v7 quote 接口读取快照。
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, MarketError> {
        let crumb = self.crumb().await?;
        let url = format!("{}/v7/finance/quote", self.endpoints.query_base_url);
        let resp: QuoteResponse = self
            .get_json(&url, &[("symbols", symbol.to_string()), ("crumb", crumb)])
            .await?;
        resp.into_snapshot()
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketError> {
        Ok(self
            .quote_summary(symbol, summary::PROFILE_MODULES)
            .await?
            .into_profile())
    }

    /// # Summary
    /// 从 Yahoo Finance 抓取 K 线历史数据。
    ///
    /// # Logic
    /// 1. 映射 TimeFrame 周期为 Yahoo 识别的 interval。
    /// 2. 构建包含 period1, period2 的 API URL (chart 接口不需要 crumb)。
    /// 3. 解析嵌套的 JSON 数据，合并 adjclose。
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MarketError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.endpoints.query_base_url, symbol
        );
        let resp: ChartResponse = self
            .get_json(
                &url,
                &[
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                    ("interval", timeframe.as_interval().to_string()),
                    ("includeAdjustedClose", "true".to_string()),
                ],
            )
            .await?;
        resp.into_candles()
    }

    async fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinancialStatement, MarketError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.endpoints.timeseries_base_url, symbol
        );
        let body: serde_json::Value = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("type", timeseries::type_param(kind)),
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                ],
            )
            .await?;
        timeseries::parse_statement(kind, &body)
    }

    async fn fetch_major_holders(&self, symbol: &str) -> Result<MajorHolders, MarketError> {
        self.quote_summary(symbol, summary::MAJOR_HOLDERS_MODULES)
            .await?
            .into_major_holders()
    }

    async fn fetch_institutional_holders(
        &self,
        symbol: &str,
    ) -> Result<Vec<InstitutionalHolder>, MarketError> {
        self.quote_summary(symbol, summary::INSTITUTION_MODULES)
            .await?
            .into_institutional_holders()
    }
}
