//! 環境変数による設定

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/car_rental";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 設定の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// 予約・車両データの保存先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL（本番）
    Postgres,
    /// プロセス内メモリ（ローカル実行・デモ用、再起動で消える）
    Memory,
}

/// サーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub storage: StorageBackend,
}

impl AppConfig {
    /// プロセスの環境変数から設定を読み込む
    ///
    /// - `DATABASE_URL`（既定値 `postgres://localhost/car_rental`）
    /// - `PORT`（既定値 3000）
    /// - `DATABASE_MAX_CONNECTIONS`（既定値 5）
    /// - `STORAGE_BACKEND` = `postgres` | `memory`（既定値 `postgres`）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                name: "DATABASE_MAX_CONNECTIONS",
                value,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url,
            port,
            max_connections,
            storage,
        })
    }

    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// ログ出力用の接続先（`host:port/database`、資格情報は含まない）
    pub fn database_target(&self) -> String {
        match self.database_url.parse::<PgConnectOptions>() {
            Ok(options) => format!(
                "{}:{}/{}",
                options.get_host(),
                options.get_port(),
                options.get_database().unwrap_or_default()
            ),
            Err(_) => "<invalid database url>".to_string(),
        }
    }
}
