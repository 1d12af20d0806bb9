use std::collections::HashMap;
use thiserror::Error;

/// # Summary
/// 代码目录加载错误。任意一种都会导致启动失败。
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read symbol directory {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("malformed symbol directory: {0}")]
    Malformed(String),
}

/// # Summary
/// 目录中的一条记录：代码与公司展示名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub symbol: String,
    pub name: String,
}

/// # Summary
/// 股票代码 → 公司名称的只读映射表。
///
/// # Invariants
/// - 代码唯一且非空。
/// - 保留资源文件中的原始顺序，下拉框按此顺序展示。
/// - 构造后不可变，通过 `Arc` 在进程内共享。
#[derive(Debug, Clone, Default)]
pub struct SymbolDirectory {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolDirectory {
    /// # Summary
    /// 从 (代码, 名称) 序列构建目录。
    ///
    /// # Logic
    /// 1. 去除首尾空白，拒绝空代码。
    /// 2. 拒绝重复代码。
    /// 3. 拒绝空目录。
    pub fn from_entries<I>(entries: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut directory = Self::default();
        for (position, (symbol, name)) in entries.into_iter().enumerate() {
            let symbol = symbol.trim().to_string();
            if symbol.is_empty() {
                return Err(DirectoryError::Malformed(format!(
                    "empty symbol in row {}",
                    position + 1
                )));
            }
            if directory.index.contains_key(&symbol) {
                return Err(DirectoryError::Malformed(format!(
                    "duplicate symbol {}",
                    symbol
                )));
            }
            directory.index.insert(symbol.clone(), directory.entries.len());
            directory.entries.push(SymbolEntry {
                symbol,
                name: name.trim().to_string(),
            });
        }

        if directory.entries.is_empty() {
            return Err(DirectoryError::Malformed("no symbols listed".into()));
        }
        Ok(directory)
    }

    /// 按代码查找公司名称
    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.index
            .get(symbol)
            .and_then(|&i| self.entries.get(i))
            .map(|e| e.name.as_str())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// 资源文件中的第一条记录，作为页面默认选中项
    pub fn first(&self) -> Option<&SymbolEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
