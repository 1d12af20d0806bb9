//! # `kabu-feed` - 行情数据源
//!
//! `QuoteProvider` 的 Yahoo Finance 实现。

pub mod yahoo;
