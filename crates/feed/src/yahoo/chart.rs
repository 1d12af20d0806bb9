//! v8 chart 接口的响应结构与 K 线转换。

use chrono::{TimeZone, Utc};
use kabu_core::market::entity::Candle;
use kabu_core::market::error::MarketError;
use serde::Deserialize;

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
pub(crate) struct ChartResponse {
    chart: ChartBody,
}

/// # Summary
/// Yahoo API 图表数据部分。
#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// # Summary
/// Yahoo API 错误详情。
#[derive(Deserialize, Debug)]
struct ChartError {
    description: String,
}

/// # Summary
/// Yahoo API 单个时间序列结果。
///
/// # Invariants
/// - 无交易日的区间中 Yahoo 会省略 `timestamp`，此时视为空序列。
#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

/// # Summary
/// Yahoo API 指标容器。
#[derive(Deserialize, Debug)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
    // 调整后的价格数据
    adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Deserialize, Debug)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// # Summary
/// Yahoo API 原始报价数据。
#[derive(Deserialize, Debug)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// # Summary
    /// 将 chart 响应转换为 K 线列表。
    ///
    /// # Logic
    /// 1. 优先透传 Yahoo 返回的错误描述。
    /// 2. 提取 adjclose 并与基础 OHLCV 合并。
    /// 3. 任一 OHLCV 字段为空的采样点 (停牌、盘中缺口) 直接丢弃。
    /// 4. 历史数据一律标记为 is_final = true。
    ///
    /// # Returns
    /// 成功返回按时间升序的 K 线列表，可能为空。
    pub(crate) fn into_candles(self) -> Result<Vec<Candle>, MarketError> {
        if let Some(err) = self.chart.error {
            return Err(MarketError::Unknown(err.description));
        }

        let result = self
            .chart
            .result
            .ok_or(MarketError::NotFound)?
            .pop()
            .ok_or(MarketError::NotFound)?;

        let quote = result
            .indicators
            .quote
            .first()
            .ok_or(MarketError::Parse("No quote data".into()))?;

        let adj_close_list = result
            .indicators
            .adjclose
            .as_ref()
            .and_then(|v| v.first())
            .map(|v| &v.adjclose);

        let mut candles = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(time) = Utc.timestamp_opt(ts, 0).single() else {
                continue;
            };
            if let (Some(o), Some(h), Some(l), Some(c), Some(v)) = (
                quote.open.get(i).and_then(|x| *x),
                quote.high.get(i).and_then(|x| *x),
                quote.low.get(i).and_then(|x| *x),
                quote.close.get(i).and_then(|x| *x),
                quote.volume.get(i).and_then(|x| *x),
            ) {
                let adj_c = adj_close_list.and_then(|list| list.get(i)).and_then(|x| *x);

                candles.push(Candle {
                    time,
                    open: o,
                    high: h,
                    low: l,
                    close: c,
                    adj_close: adj_c,
                    volume: v,
                    is_final: true,
                });
            }
        }

        Ok(candles)
    }
}
