//! Gangway Server - 观光船票务边缘节点
//!
//! Seat inventory & financial ledger engine for walk-up and pre-booked
//! boat-trip ticketing.
//!
//! # 模块结构
//!
//! ```text
//! gangway-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── sales/         # 售票引擎 (预售、支付、取消、转移)
//! ├── reports/       # 船东读层 (汇总、对账、上座率)
//! ├── db/            # 数据库层 (SQLite + 仓储)
//! └── utils/         # 错误、时间、验证、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod reports;
pub mod sales;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/___ _____  ____ __      ______ ___  __
 / / __/ __ `/ __ \/ __ `/ | /| / / __ `/ / / /
/ /_/ / /_/ / / / / /_/ /| |/ |/ / /_/ / /_/ /
\____/\__,_/_/ /_/\__, / |__/|__/\__,_/\__, /
                 /____/               /____/
    "#
    );
}
