use std::path::{Path, PathBuf};
use std::sync::Arc;

use kabu_api::server::{AppState, start_server};
use kabu_core::common::time::RealTimeProvider;
use kabu_feed::yahoo::YahooProvider;
use kabu_manager::dashboard::DashboardManager;
use kabu_trade::alpaca::AlpacaBroker;
use kabu_trade::service::OrderDesk;
use tracing::{error, info};

mod settings;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 `Arc<dyn Trait>` 注入到服务层。
///
/// # Logic
/// 1. 加载配置并初始化全局日志。
/// 2. 加载代码目录，失败直接退出。
/// 3. 实例化基础设施层（Yahoo 行情源、Alpaca 券商）。
/// 4. 构造服务层（DashboardManager、OrderDesk）。
/// 5. 启动 HTTP 服务。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = settings::load_config(Path::new(settings::CONFIG_FILE))?;
    let _guards = settings::init_tracing(&config.log.level, config.log.dir.as_deref());
    info!("Kabu dashboard starting...");
    tracing::debug!("Loaded config: {:?}", config);

    kabu_core::install_crypto_provider();

    // 2. 代码目录
    kabu_store::config::set_root_dir(PathBuf::from(&config.data.root_dir));
    let path = kabu_store::config::directory_path();
    let directory = match kabu_store::directory::load_directory(&path) {
        Ok(directory) => Arc::new(directory),
        Err(e) => {
            error!("Failed to load symbol directory {}: {}", path.display(), e);
            return Err(e.into());
        }
    };

    // 3. 基础设施层
    let feed = Arc::new(YahooProvider::new(&config.feed)?);
    let broker = Arc::new(AlpacaBroker::new(&config.broker)?);

    // 4. 服务层
    let dashboard = Arc::new(DashboardManager::new(
        feed,
        directory.clone(),
        Arc::new(RealTimeProvider),
    ));
    let order_desk = Arc::new(OrderDesk::new(broker, directory.clone()));

    let state = AppState {
        dashboard,
        order_desk,
        directory,
    };

    // 5. 启动服务
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr).await
}
