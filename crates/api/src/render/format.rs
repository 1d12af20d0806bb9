//! 页面数值与文本格式化。

/// 缺失值的统一展示文本
pub const NOT_AVAILABLE: &str = "N/A";

/// 为十进制数字串插入千位分隔符，`digits` 只能包含 ASCII 数字
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 整数千分位，例如 `53665600` → `53,665,600`
pub fn thousands_u64(value: u64) -> String {
    group_digits(&value.to_string())
}

/// # Summary
/// 浮点数四舍五入到整数后加千分位，等价于 `{:,.0f}`。
///
/// # Returns
/// 非有限值返回 `N/A`。
pub fn thousands_f64(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let digits = format!("{:.0}", value.abs());
    let grouped = group_digits(&digits);
    if value < 0.0 && digits != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn opt_thousands_f64(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), thousands_f64)
}

pub fn opt_thousands_u64(value: Option<u64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), thousands_u64)
}

/// 价格与倍数保留两位小数
pub fn decimal2(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// 比例 (0.61) 转为百分比文本 (61.00%)
pub fn percent(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{:.2}%", ratio * 100.0)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// 空白或缺失的文本统一回退为 `N/A`
pub fn text_or_na(value: Option<&str>) -> &str {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(thousands_u64(0), "0");
        assert_eq!(thousands_u64(999), "999");
        assert_eq!(thousands_u64(1_000), "1,000");
        assert_eq!(thousands_u64(53_665_600), "53,665,600");
        assert_eq!(thousands_f64(2_952_053_932_032.0), "2,952,053,932,032");
        assert_eq!(thousands_f64(-10_958_000_000.4), "-10,958,000,000");
        assert_eq!(thousands_f64(-0.2), "0");
        assert_eq!(thousands_f64(f64::NAN), "N/A");
    }

    #[test]
    fn test_optional_values() {
        assert_eq!(opt_thousands_f64(None), "N/A");
        assert_eq!(decimal2(Some(199.624)), "199.62");
        assert_eq!(decimal2(None), "N/A");
        assert_eq!(percent(0.6127), "61.27%");
        assert_eq!(text_or_na(Some("  ")), "N/A");
        assert_eq!(text_or_na(Some("Technology")), "Technology");
    }
}
