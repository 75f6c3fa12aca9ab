use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::core::tasks::BackgroundTasks;
use crate::courier::{CourierClient, DelhiveryCourier, MockCourier};
use crate::db::DbService;
use crate::orders::{DeliveryReconciler, ShipmentDispatcher};
use crate::payments::{MockGateway, PaymentGateway, RazorpayGateway};
use crate::pricing::PriceAuthority;
use crate::utils::{AppError, AppResult};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝；每个 HTTP handler 克隆一份。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | price_authority | 单价权威来源 |
/// | courier | 承运商客户端 (mock 或 Delhivery，构造时选定) |
/// | gateway | 支付网关 (mock 或 Razorpay，构造时选定) |
/// | dispatcher | 发货服务 (book-once 保证) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库连接池
    pub pool: SqlitePool,
    /// 单价权威来源
    pub price_authority: Arc<PriceAuthority>,
    /// 承运商客户端
    pub courier: Arc<dyn CourierClient>,
    /// 支付网关
    pub gateway: Arc<dyn PaymentGateway>,
    /// 发货服务
    pub dispatcher: Arc<ShipmentDispatcher>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("courier", &"<CourierClient>")
            .field("gateway", &"<PaymentGateway>")
            .finish()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/store.db) 并应用迁移
    /// 3. 外部集成 — 有凭证用真实客户端，否则用确定性 mock；
    ///    选择只发生在这里，业务逻辑只见 trait
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("store.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Self::with_pool(config.clone(), db.pool)
    }

    /// 基于已有连接池组装状态（集成测试直接使用）
    pub fn with_pool(config: Config, pool: SqlitePool) -> AppResult<Self> {
        let courier: Arc<dyn CourierClient> = match &config.delhivery_api_key {
            Some(key) => Arc::new(
                DelhiveryCourier::new(
                    key.clone(),
                    config.delhivery_production,
                    config.pickup.clone(),
                )
                .map_err(|e| AppError::internal(e.to_string()))?,
            ),
            None => {
                tracing::warn!("DELHIVERY_API_KEY not configured — using mock courier");
                Arc::new(MockCourier::new())
            }
        };

        let gateway: Arc<dyn PaymentGateway> =
            match (&config.razorpay_key_id, &config.razorpay_key_secret) {
                (Some(id), Some(secret)) => Arc::new(
                    RazorpayGateway::new(id.clone(), secret.clone())
                        .map_err(|e| AppError::internal(e.to_string()))?,
                ),
                _ => {
                    tracing::warn!("Razorpay credentials not configured — using mock gateway");
                    Arc::new(MockGateway::new())
                }
            };

        let price_authority = Arc::new(PriceAuthority::new(pool.clone()));
        let dispatcher = Arc::new(ShipmentDispatcher::new(pool.clone(), courier.clone()));

        Ok(Self {
            config,
            pool,
            price_authority,
            courier,
            gateway,
            dispatcher,
        })
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 送达对账 (DeliveryReconciler)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let reconciler = DeliveryReconciler::new(
            self.pool.clone(),
            self.courier.clone(),
            Duration::from_secs(self.config.reconcile_interval_secs),
        );
        let token = tasks.shutdown_token();
        tasks.spawn("delivery_reconciler", reconciler.run(token));
    }
}
