use kabu_core::directory::DirectoryError;
use kabu_store::config::{directory_path, DIRECTORY_FILE};
use kabu_store::directory::load_directory;
use std::io::Write;

/// # Summary
/// 从真实文件加载目录。
///
/// # Logic
/// 1. 在临时目录写入一份小型资源表。
/// 2. 加载并断言顺序与名称。
#[test]
fn test_load_directory_from_file() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join(DIRECTORY_FILE);
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "Symbol,Name")?;
    writeln!(file, "AAPL,Apple Inc.")?;
    writeln!(file, "\"BRK.B\",\"Berkshire Hathaway Inc. Class B\"")?;
    drop(file);

    let dir = load_directory(&path)?;
    assert_eq!(dir.len(), 2);
    assert_eq!(dir.first().map(|e| e.symbol.as_str()), Some("AAPL"));
    assert_eq!(dir.name_of("BRK.B"), Some("Berkshire Hathaway Inc. Class B"));
    Ok(())
}

/// 资源缺失属于致命错误，必须返回 Io 而不是空目录
#[test]
fn test_missing_file_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let result = load_directory(&tmp.path().join("nope.csv"));
    assert!(matches!(result, Err(DirectoryError::Io { .. })));
}

#[test]
fn test_duplicate_symbol_is_malformed() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(DIRECTORY_FILE);
    std::fs::write(&path, "Symbol,Name\nAAPL,Apple\nAAPL,Apple again\n").unwrap();
    assert!(matches!(
        load_directory(&path),
        Err(DirectoryError::Malformed(_))
    ));
}

/// 仓库内置的资源表必须可以被解析
#[test]
fn test_bundled_directory_is_valid() {
    let bundled = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(DIRECTORY_FILE);
    let dir = load_directory(&bundled).unwrap();
    assert!(dir.contains("AAPL"));
    assert!(dir.len() >= 500);
    assert!(dir.contains("BRK.B"));
}

#[test]
fn test_default_directory_path() {
    assert!(directory_path().ends_with(DIRECTORY_FILE));
}
