//! Mesa Floor - 餐厅楼面订单与桌台协调
//!
//! # 模块结构
//!
//! ```text
//! mesa-floor/src/
//! ├── core/          # 配置、时钟
//! ├── orders/        # 购物车、订单状态机、作废恢复窗口
//! ├── tables/        # 桌台状态推导、布局
//! ├── reconcile/     # 协调入口、读请求排序、会话状态
//! └── utils/         # 日志
//! ```

pub mod core;
pub mod error;
pub mod orders;
pub mod reconcile;
pub mod tables;
pub mod utils;

pub use crate::core::{Clock, Config, ManualClock, SystemClock};
pub use error::{FloorError, FloorResult};
pub use reconcile::{FloorSession, FloorState, ReconciliationFacade};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
