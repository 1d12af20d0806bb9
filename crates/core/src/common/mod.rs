use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod time;

/// # Summary
/// K 线时间周期枚举，决定向行情源请求的采样间隔。
///
/// # Invariants
/// - 仪表盘价格图固定使用 `Day1`，其余周期仅供 JSON 接口按需查询。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 1日
    Day1,
    // 1周
    Week1,
    // 1月
    Month1,
}

impl TimeFrame {
    /// 行情源识别的 interval 参数
    pub fn as_interval(&self) -> &'static str {
        match self {
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1wk",
            TimeFrame::Month1 => "1mo",
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" | "day1" => Ok(TimeFrame::Day1),
            "1wk" | "1w" | "week1" => Ok(TimeFrame::Week1),
            "1mo" | "month1" => Ok(TimeFrame::Month1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_interval())
    }
}
