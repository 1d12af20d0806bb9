use std::io::Read;
use std::path::Path;

use kabu_core::directory::{DirectoryError, SymbolDirectory};
use serde::Deserialize;

const SYMBOL_COLUMN: &str = "Symbol";
const NAME_COLUMN: &str = "Name";

/// 资源表中的一行，多余的列被忽略
#[derive(Deserialize)]
struct DirectoryRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Name")]
    name: String,
}

/// # Summary
/// 从磁盘读取代码目录。
///
/// # Logic
/// 1. 打开 CSV 文件，失败返回 `DirectoryError::Io`。
/// 2. 交给 [`parse_directory`] 解析。
///
/// # Arguments
/// * `path` - 资源文件路径。
///
/// # Returns
/// 成功返回不可变目录；任何错误都应当终止启动。
pub fn load_directory(path: &Path) -> Result<SymbolDirectory, DirectoryError> {
    let file = std::fs::File::open(path).map_err(|e| DirectoryError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let directory = parse_directory(file)?;
    tracing::info!(
        "Loaded {} symbols from {}",
        directory.len(),
        path.display()
    );
    Ok(directory)
}

/// # Summary
/// 从任意字节流解析代码目录。
///
/// # Logic
/// 1. 校验表头同时包含 `Symbol` 与 `Name` 列。
/// 2. 逐行反序列化，跳过代码与名称均为空的行。
/// 3. 交给 `SymbolDirectory::from_entries` 校验唯一性。
pub fn parse_directory<R: Read>(reader: R) -> Result<SymbolDirectory, DirectoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DirectoryError::Malformed(e.to_string()))?;
    for column in [SYMBOL_COLUMN, NAME_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(DirectoryError::Malformed(format!(
                "missing '{}' column",
                column
            )));
        }
    }

    let mut entries = Vec::new();
    for (line, row) in csv_reader.deserialize::<DirectoryRow>().enumerate() {
        let row = row.map_err(|e| DirectoryError::Malformed(format!("row {}: {}", line + 1, e)))?;
        if row.symbol.is_empty() && row.name.is_empty() {
            continue;
        }
        entries.push((row.symbol, row.name));
    }

    SymbolDirectory::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_extra_columns() {
        let data = "Symbol,Name,Sector\nAAPL,Apple Inc.,Technology\nMSFT,Microsoft,Technology\n";
        let dir = parse_directory(data.as_bytes()).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.name_of("MSFT"), Some("Microsoft"));
    }

    #[test]
    fn test_parse_skips_blank_rows_and_trims() {
        let data = "Name,Symbol\n Apple Inc. , AAPL \n,\n";
        let dir = parse_directory(data.as_bytes()).unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.name_of("AAPL"), Some("Apple Inc."));
    }

    #[test]
    fn test_parse_missing_column_is_malformed() {
        let data = "Ticker,Name\nAAPL,Apple Inc.\n";
        let err = parse_directory(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing 'Symbol' column"));
    }
}
