//! # `kabu-api` - HTTP 网关
//!
//! 本 crate 是 Kabu 股票仪表盘的 HTTP 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 浏览器页面：代码选择、行情各区块、下单表单 (服务端渲染 HTML)
//! - 独立的 SVG K 线图
//! - JSON 接口：代码目录、仪表盘视图、K 线、下单
//! - 将领域模型转换为 DTO 返回给前端

pub mod error;
pub mod render;
pub mod routes;
pub mod server;
pub mod types;
