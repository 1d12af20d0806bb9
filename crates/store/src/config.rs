use std::path::PathBuf;
use std::sync::OnceLock;

static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 内置资源文件名
pub const DIRECTORY_FILE: &str = "sp500_stocks.csv";

/// 设置内置资源的根目录。
///
/// # Logic
/// 1. 尝试将指定的路径保存到全局静态变量中。
/// 2. 如果已经设置过，则本次设置无效。
///
/// # Arguments
/// * `path` - 资源根目录路径。
pub fn set_root_dir(path: PathBuf) {
    if ROOT_DIR.set(path).is_err() {
        tracing::debug!("data root dir already set, ignoring");
    }
}

/// 获取当前配置的资源根目录，未设置时为 "data"。
pub fn get_root_dir() -> PathBuf {
    ROOT_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// 代码目录资源的完整路径
pub fn directory_path() -> PathBuf {
    get_root_dir().join(DIRECTORY_FILE)
}
