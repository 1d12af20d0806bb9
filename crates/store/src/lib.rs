//! # `kabu-store` - 内置资源加载
//!
//! 负责在启动时一次性读取随程序分发的代码目录表。

pub mod config;
pub mod directory;
