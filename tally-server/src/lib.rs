//! Tally Back-Office Server - 多租户零售后台 API
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，店铺员工上下文解析
//! - **领域服务** (`services`): 权限解析、店铺/员工入职、邮件、图片资产
//! - **数据库** (`db`): 嵌入式 SQLite (sqlx)，迁移与种子数据
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! tally-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、提取器、中间件
//! ├── services/      # 权限、入职、邮件、资产
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (连接池、迁移、仓储)
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置进程环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ______      ____
 /_  __/___ _/ / /_  __
  / / / __ `/ / / / / /
 / / / /_/ / / / /_/ /
/_/  \__,_/_/_/\__, /
              /____/
    "#
    );
}
