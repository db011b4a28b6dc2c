//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是后台服务的核心数据结构，持有配置、数据库连接池和
//! 各领域服务的共享引用。使用 Arc / 连接池实现浅拷贝，克隆成本极低。

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::token_blacklist;
use crate::services::{
    AssetService, MailerService, OnboardingService, PermissionService, SalesService,
};
use shared::error::AppError;
use shared::util::now_millis;

/// Interval between administrative sweeps (expired overrides, stale
/// blacklist rows)
const SWEEP_INTERVAL_SECS: u64 = 3600;

/// 服务器状态
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 令牌服务 |
/// | permissions | 权限解析服务 |
/// | onboarding | 店铺/员工入职服务 |
/// | mailer | 邮件派发服务 |
/// | assets | 图片资产存储 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    permissions: PermissionService,
    onboarding: OnboardingService,
    sales: SalesService,
    mailer: MailerService,
    assets: AssetService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/tally.db，含迁移和种子数据)
    /// 3. 各服务 (JWT, Permission, Onboarding, Mailer, Assets)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("tally.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::with_db(config.clone(), db))
    }

    /// 使用已初始化的数据库构造状态 (测试用内存数据库走这里)
    pub fn with_db(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let mailer = MailerService::new(config.mail.clone());
        let permissions = PermissionService::new(db.pool.clone());
        let onboarding = OnboardingService::new(
            db.pool.clone(),
            jwt_service.clone(),
            mailer.clone(),
            config.frontend_url.clone(),
        );
        let sales = SalesService::new(db.pool.clone());
        let assets = AssetService::new(config.images_dir());

        Self {
            config,
            pool: db.pool,
            jwt_service,
            permissions,
            onboarding,
            sales,
            mailer,
            assets,
        }
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 权限解析服务
    pub fn permissions(&self) -> &PermissionService {
        &self.permissions
    }

    /// 入职/员工生命周期服务
    pub fn onboarding(&self) -> &OnboardingService {
        &self.onboarding
    }

    /// 销售记录服务
    pub fn sales(&self) -> &SalesService {
        &self.sales
    }

    /// 邮件派发服务
    pub fn mailer(&self) -> &MailerService {
        &self.mailer
    }

    /// 图片资产服务
    pub fn assets(&self) -> &AssetService {
        &self.assets
    }

    /// 启动后台任务
    ///
    /// 定期清理过期的权限覆盖行和已过自然有效期的吊销令牌。
    /// 两个清理都是幂等的，首个 tick 立即执行一次。
    pub fn start_background_tasks(&self) {
        let permissions = self.permissions.clone();
        let pool = self.pool.clone();
        let refresh_ttl_ms = self.config.jwt.refresh_expiration_minutes * 60_000;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                match permissions.cleanup_expired().await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::info!(removed, "Swept expired permission overrides");
                    }
                    Err(e) => tracing::warn!(error = %e, "Override sweep failed"),
                }

                let cutoff = now_millis() - refresh_ttl_ms;
                match token_blacklist::prune_older_than(&pool, cutoff).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Pruned stale revoked tokens"),
                    Err(e) => tracing::warn!(error = %e, "Revoked token prune failed"),
                }
            }
        });
    }
}
