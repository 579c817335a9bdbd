use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::service::OfferFormat;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub offer: OfferConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// 报价文件的列名与分隔符
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferConfig {
    pub article_column: String,
    pub quantity_column: String,
    /// 不设置时自动识别
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// 缓存条目过期时间 (秒)
    pub ttl_secs: u64,
    /// 每个缓存最多保留的条目数
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/anfrage".to_string(),
                max_connections: 5,
                acquire_timeout_secs: 10,
            },
            offer: OfferConfig {
                article_column: "article_id".to_string(),
                quantity_column: "quantity".to_string(),
                delimiter: None,
            },
            cache: CacheConfig {
                enabled: true,
                ttl_secs: 300,
                max_entries: 64,
            },
        }
    }
}

impl OfferConfig {
    pub fn format(&self) -> OfferFormat {
        OfferFormat {
            article_column: self.article_column.clone(),
            quantity_column: self.quantity_column.clone(),
            delimiter: self.delimiter.filter(char::is_ascii).map(|c| c as u8),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> reconcile.toml (可选) -> RECONCILE__* 环境变量
    /// -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("reconcile")
    }

    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();

        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("RECONCILE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env("DATABASE_URL"))?
            .set_override_option("server.host", env("SERVER_HOST"))?
            .set_override_option(
                "server.port",
                env("SERVER_PORT").and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()?
            .try_deserialize()
    }
}
