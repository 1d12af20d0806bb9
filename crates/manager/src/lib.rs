//! # kabu-manager
//!
//! 应用服务层：把行情端口的多次调用组装为一张仪表盘视图。

pub mod dashboard;
