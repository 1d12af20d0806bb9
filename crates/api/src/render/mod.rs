//! # 服务端渲染
//!
//! 纯展示逻辑，不发起任何 I/O。

pub mod chart;
pub mod format;
pub mod page;
