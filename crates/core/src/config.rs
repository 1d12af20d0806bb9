use serde::{Deserialize, Serialize};

/// 全局应用配置
///
/// 每个字段都带 `#[serde(default)]`，配置文件与环境变量只需覆盖关心的键。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub broker: BrokerConfig,
    pub data: DataConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 行情源 (Yahoo Finance) 端点与超时
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub query_base_url: String,
    pub timeseries_base_url: String,
    pub cookie_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// 券商 (Alpaca paper) 端点与凭证
///
/// 凭证没有默认值，必须由配置文件或 `KABU__BROKER__KEY_ID` / `KABU__BROKER__SECRET_KEY` 注入。
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub base_url: String,
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// 代码目录等内置资源所在目录
    pub root_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` 语法，`RUST_LOG` 存在时以其为准
    pub level: String,
    /// 若设置则额外按天滚动写入该目录
    pub dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            query_base_url: "https://query1.finance.yahoo.com".to_string(),
            timeseries_base_url: "https://query2.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://paper-api.alpaca.markets".to_string(),
            key_id: None,
            secret_key: None,
            timeout_secs: 10,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl BrokerConfig {
    /// 两个凭证均已配置且非空
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.key_id) && present(&self.secret_key)
    }
}

// 手写 Debug，避免密钥出现在日志中
impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("BrokerConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &mask(&self.key_id))
            .field("secret_key", &mask(&self.secret_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.broker.base_url, "https://paper-api.alpaca.markets");
        assert!(!config.broker.has_credentials());
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.feed.timeout_secs, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "server": { "port": 9000 }, "broker": { "key_id": "K", "secret_key": "S" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.broker.has_credentials());
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_broker_debug_masks_secrets() {
        let broker = BrokerConfig {
            key_id: Some("PKTEST".into()),
            secret_key: Some("supersecret".into()),
            ..BrokerConfig::default()
        };
        let printed = format!("{:?}", broker);
        assert!(!printed.contains("supersecret"));
        assert!(!printed.contains("PKTEST"));
    }
}
