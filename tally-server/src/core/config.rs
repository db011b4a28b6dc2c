//! 服务器配置
//!
//! 所有配置在进程启动时从环境变量读取一次，构造成显式的 [`Config`]
//! 对象，由 [`super::ServerState`] 持有传递 — 业务逻辑内部不再读取
//! 环境变量。
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/tally | 工作目录 (数据库、上传、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | FRONTEND_URL | http://localhost:5173 | 邀请/重置链接的前端地址 |
//! | JWT_SECRET | (开发环境自动生成) | JWT 密钥，至少 32 字节 |
//! | ACCESS_TOKEN_EXPIRE_MINUTES | 30 | Access 令牌 TTL |
//! | REFRESH_TOKEN_EXPIRE_MINUTES | 1440 | Refresh 令牌 TTL |
//! | INVITATION_TOKEN_EXPIRE_MINUTES | 30 | 邀请/重置令牌 TTL |
//! | MAIL_RELAY_URL | (未设置则不发信) | 邮件 HTTP 中继地址 |
//! | MAIL_FROM | no-reply@tally.local | 发件地址 |
//! | MAIL_FROM_NAME | Tally | 发件人名称 |

use std::path::PathBuf;

use crate::auth::{JwtConfig, jwt::generate_secure_printable_secret};
use crate::services::MailConfig;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 前端基础地址 (邀请/重置链接)
    pub frontend_url: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 邮件中继配置
    pub mail: MailConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let jwt = JwtConfig {
            secret: load_jwt_secret(&environment),
            access_expiration_minutes: env_i64("ACCESS_TOKEN_EXPIRE_MINUTES", 30),
            refresh_expiration_minutes: env_i64("REFRESH_TOKEN_EXPIRE_MINUTES", 1440),
            invitation_expiration_minutes: env_i64("INVITATION_TOKEN_EXPIRE_MINUTES", 30),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tally-server".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tally-clients".into()),
        };

        let mail = MailConfig {
            relay_url: std::env::var("MAIL_RELAY_URL").ok(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@tally.local".into()),
            from_name: std::env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Tally".into()),
        };

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/tally".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            jwt,
            mail,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads/images")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 从环境变量安全地加载 JWT 密钥
///
/// 生产环境缺失或过短直接终止进程；开发环境生成临时密钥并告警。
fn load_jwt_secret(environment: &str) -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            if environment == "production" {
                panic!("FATAL: JWT_SECRET must be at least 32 characters long in production");
            }
            tracing::warn!("JWT_SECRET too short, generating temporary key for development");
            generate_secure_printable_secret()
        }
        Err(_) => {
            if environment == "production" {
                panic!("FATAL: JWT_SECRET environment variable must be set in production");
            }
            tracing::warn!("JWT_SECRET not set! Generating secure temporary key for development.");
            generate_secure_printable_secret()
        }
    }
}
