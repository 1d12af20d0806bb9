//! # kabu-trade
//!
//! 下单链路：`alpaca` 负责与券商 REST 接口通讯，`service` 负责输入校验与结果文案。

pub mod alpaca;
pub mod service;
