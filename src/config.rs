/*
 * Responsibility
 * - 環境変数や設定の読み込み (FRAMERAUTH_PUBLIC_KEY, FRAMER_SITE_URL, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

use crate::services::auth::PublicKeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    PublicKey(PublicKeyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::PublicKey(e) => {
                write!(f, "invalid configuration: FRAMERAUTH_PUBLIC_KEY ({})", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::PublicKey(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PublicKeyError> for ConfigError {
    fn from(e: PublicKeyError) -> Self {
        ConfigError::PublicKey(e)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,

    /// base64 エンコードされた RSA 公開鍵 (PEM)。デコードは AuthGate 側で行う。
    pub framerauth_public_key: String,
    /// 期待する `aud` (Framer サイトの URL)
    pub framer_site_url: String,
    pub token_leeway_seconds: u64,

    /// `WWW-Authenticate` の realm を組み立てるための外部公開 URL (reverse proxy 配下用)
    pub public_base_url: Option<Url>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` から設定を組み立てる (テストでは HashMap を渡す)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(30);

        let framerauth_public_key = lookup("FRAMERAUTH_PUBLIC_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("FRAMERAUTH_PUBLIC_KEY"))?;

        let framer_site_url = lookup("FRAMER_SITE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("FRAMER_SITE_URL"))?;

        let token_leeway_seconds = lookup("TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(60);

        let public_base_url = match lookup("PUBLIC_BASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(v) => Some(
                Url::parse(v.trim()).map_err(|_| ConfigError::Invalid("PUBLIC_BASE_URL"))?,
            ),
            None => None,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout_seconds,
            framerauth_public_key,
            framer_site_url,
            token_leeway_seconds,
            public_base_url,
        })
    }
}
