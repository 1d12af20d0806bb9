//! # 路由控制器
//!
//! - `dashboard`: 浏览器页面与 SVG 图表
//! - `market`: 代码目录、仪表盘视图与 K 线 JSON 接口
//! - `trade`: JSON 下单接口

pub mod dashboard;
pub mod market;
pub mod trade;
