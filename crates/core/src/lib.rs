//! # `kabu-core` - 领域内核
//!
//! 仪表盘各层共享的实体、错误枚举与端口 (Port) 定义。
//! 本 crate 不包含任何网络或文件 IO，具体实现位于 `kabu-feed`、`kabu-trade`、`kabu-store`。

pub mod common;
pub mod config;
pub mod directory;
pub mod market;
pub mod trade;

#[cfg(feature = "test-utils")]
pub mod testing;

/// # Summary
/// 安装进程级的 rustls 加密后端 (ring)。
///
/// # Logic
/// 1. reqwest 以 `rustls-no-provider` 方式编译，发起任何请求前必须先注册后端。
/// 2. 重复安装会返回 Err，此处忽略，保证可被多次调用 (测试中每个用例都会调用)。
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}
