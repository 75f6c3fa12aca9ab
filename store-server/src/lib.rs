//! Store Server - 单品类食品品牌电商后端
//!
//! # 架构概述
//!
//! 本模块是订单履约管线的主入口，提供以下核心功能：
//!
//! - **价格权威** (`pricing`): 单价唯一来源，客户端价格一律丢弃
//! - **运费引擎** (`shipping`): 邮编分区 + 0.5kg 计费段
//! - **订单台账** (`db`, `orders`): 幂等下单、CAS 状态转移
//! - **支付核验** (`payments`): 网关回调签名与金额校验
//! - **承运商集成** (`courier`): 预订 / 轨迹 / 面单，mock 与真实实现
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── auth/          # 管理令牌中间件
//! ├── db/            # 数据库层 (SQLite + 迁移)
//! ├── orders/        # 订单履约管线
//! ├── payments/      # 支付网关
//! ├── courier/       # 承运商
//! ├── pricing/       # 价格权威
//! ├── shipping/      # 运费引擎
//! └── utils/         # 错误、日志、验证
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod courier;
pub mod db;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod shipping;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let logs_dir = config.logs_dir();
    init_logger_with_file(log_level.as_deref(), logs_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
