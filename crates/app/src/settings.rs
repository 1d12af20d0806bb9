use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use kabu_core::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认配置文件位置 (可选)
pub const CONFIG_FILE: &str = "config/kabu.toml";
/// 环境变量前缀，层级以 `__` 分隔，如 `KABU__BROKER__KEY_ID`
pub const ENV_PREFIX: &str = "KABU";

/// # Summary
/// 按优先级合并配置。
///
/// # Logic
/// 1. 内置默认值。
/// 2. 可选的 TOML 文件，不存在时跳过。
/// 3. `KABU__` 前缀的环境变量，优先级最高。
pub fn load_config(file: &Path) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. 过滤规则取 `RUST_LOG`，不存在时取配置中的 `log.level`。
/// 2. 标准输出始终开启；配置了 `log.dir` 时额外按天滚动写文件。
///
/// # Returns
/// 非阻塞写入器的 guard，必须存活到进程退出，否则尾部日志会丢失。
pub fn init_tracing(level: &str, dir: Option<&str>) -> Vec<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];

    let file_layer = dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "kabu.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout))
        .with(file_layer)
        .init();

    guards
}
