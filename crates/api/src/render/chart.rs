//! 日 K 线蜡烛图 SVG 渲染。

use kabu_core::market::entity::Candle;

const CHART_WIDTH: f64 = 900.0;
const CHART_HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 32.0;
/// 价格轴刻度数
const PRICE_TICKS: u32 = 5;

const UP_COLOR: &str = "#3D9970";
const DOWN_COLOR: &str = "#FF4136";
const AXIS_COLOR: &str = "#ccc";
const LABEL_COLOR: &str = "#666";

fn index_to_f64(i: usize) -> f64 {
    f64::from(u32::try_from(i).unwrap_or(u32::MAX))
}

/// # Summary
/// 生成蜡烛图 SVG 文档。
///
/// # Logic
/// 1. 纵轴覆盖全部 K 线的最低价到最高价。
/// 2. 每根 K 线占一个等宽槽位，实体宽度为槽位的 70%。
/// 3. 收盘不低于开盘为上涨 (绿色)，否则下跌 (红色)；影线连接最高价与最低价。
/// 4. 左侧输出等距价格刻度，底部输出首尾日期。
///
/// # Returns
/// 序列为空时返回 `None`，由调用方展示占位文本。
pub fn candlestick_svg(candles: &[Candle]) -> Option<String> {
    let first = candles.first()?;
    let last = candles.last()?;

    let min_low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let max_high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !min_low.is_finite() || !max_high.is_finite() {
        return None;
    }
    let range = if max_high > min_low {
        max_high - min_low
    } else {
        1.0
    };

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = plot_width / index_to_f64(candles.len());
    let body_width = (slot * 0.7).max(1.0);

    let y_scale = |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_low) / range) * plot_height };

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg class="candles" width="100%" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid meet" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    // 价格刻度与网格线
    for tick in 0..=PRICE_TICKS {
        let value = min_low + range * f64::from(tick) / f64::from(PRICE_TICKS);
        let y = y_scale(value);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"0.5\"/>\n",
            MARGIN_LEFT,
            y,
            CHART_WIDTH - MARGIN_RIGHT,
            y,
            AXIS_COLOR
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"{}\">{:.2}</text>\n",
            MARGIN_LEFT - 6.0,
            y + 3.0,
            LABEL_COLOR,
            value
        ));
    }

    for (i, candle) in candles.iter().enumerate() {
        let color = if candle.is_bullish() { UP_COLOR } else { DOWN_COLOR };
        let center = MARGIN_LEFT + slot * (index_to_f64(i) + 0.5);
        let body_top = y_scale(candle.open.max(candle.close));
        let body_bottom = y_scale(candle.open.min(candle.close));
        svg.push_str(&format!(
            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
            center,
            y_scale(candle.high),
            center,
            y_scale(candle.low),
            color
        ));
        svg.push_str(&format!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
            center - body_width / 2.0,
            body_top,
            body_width,
            (body_bottom - body_top).max(1.0),
            color
        ));
    }

    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"start\" font-size=\"10\" fill=\"{}\">{}</text>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - 10.0,
        LABEL_COLOR,
        first.time.format("%Y-%m-%d")
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"{}\">{}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - 10.0,
        LABEL_COLOR,
        last.time.format("%Y-%m-%d")
    ));
    svg.push_str("</svg>\n");
    Some(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(day: u32, open: f64, close: f64) -> Candle {
        Candle {
            time: Utc.with_ymd_and_hms(2024, 3, day, 14, 30, 0).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            adj_close: Some(close),
            volume: 1_000.0,
            is_final: true,
        }
    }

    #[test]
    fn test_empty_series_has_no_chart() {
        assert!(candlestick_svg(&[]).is_none());
    }

    #[test]
    fn test_candles_are_colored_by_direction() {
        let svg = candlestick_svg(&[candle(1, 100.0, 105.0), candle(4, 105.0, 101.0)]).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(UP_COLOR).count(), 2);
        assert_eq!(svg.matches(DOWN_COLOR).count(), 2);
        assert!(svg.contains("2024-03-01"));
        assert!(svg.contains("2024-03-04"));
        // 价格轴覆盖 99 到 106
        assert!(svg.contains(">99.00<"));
        assert!(svg.contains(">106.00<"));
    }

    #[test]
    fn test_flat_series_still_renders() {
        let mut flat = candle(1, 50.0, 50.0);
        flat.high = 50.0;
        flat.low = 50.0;
        let svg = candlestick_svg(&[flat]).unwrap();
        assert_eq!(svg.matches("<rect").count(), 2);
    }
}
