use std::path::PathBuf;

/// 仓库取件地址 — 随承运商预订一起发送
#[derive(Debug, Clone)]
pub struct PickupLocation {
    pub name: String,
    pub address: String,
    pub pincode: String,
    pub phone: String,
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录（数据库、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | ADMIN_TOKEN | (未设置) | 管理接口令牌；未设置时管理接口全部拒绝 |
/// | RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET | (未设置) | 支付网关凭证；缺失时使用 mock 网关 |
/// | DELHIVERY_API_KEY | (未设置) | 承运商凭证；缺失时使用 mock 承运商 |
/// | DELHIVERY_MODE | staging | production 时使用生产环境地址 |
/// | PICKUP_NAME / PICKUP_ADDRESS / PICKUP_PINCODE / PICKUP_PHONE | 仓库默认值 | 取件地址 |
/// | RECONCILE_INTERVAL_SECS | 600 | 送达对账轮询间隔（秒） |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 管理接口共享令牌（空 = 管理接口不可用）
    pub admin_token: String,
    /// 支付网关凭证
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    /// 承运商凭证
    pub delhivery_api_key: Option<String>,
    /// 承运商生产环境开关
    pub delhivery_production: bool,
    /// 仓库取件地址
    pub pickup: PickupLocation,
    /// 送达对账轮询间隔（秒）
    pub reconcile_interval_secs: u64,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            admin_token: std::env::var("ADMIN_TOKEN").unwrap_or_default(),
            razorpay_key_id: non_empty_var("RAZORPAY_KEY_ID"),
            razorpay_key_secret: non_empty_var("RAZORPAY_KEY_SECRET"),
            delhivery_api_key: non_empty_var("DELHIVERY_API_KEY"),
            delhivery_production: std::env::var("DELHIVERY_MODE")
                .map(|m| m == "production")
                .unwrap_or(false),
            pickup: PickupLocation {
                name: std::env::var("PICKUP_NAME").unwrap_or_else(|_| "Store Warehouse".into()),
                address: std::env::var("PICKUP_ADDRESS")
                    .unwrap_or_else(|_| "Mahabaleshwar, Maharashtra".into()),
                pincode: std::env::var("PICKUP_PINCODE").unwrap_or_else(|_| "412806".into()),
                phone: std::env::var("PICKUP_PHONE").unwrap_or_else(|_| "9876543210".into()),
            },
            reconcile_interval_secs: std::env::var("RECONCILE_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(600),
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

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
