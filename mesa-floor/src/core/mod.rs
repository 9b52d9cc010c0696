//! Core: configuration and time source

pub mod clock;
pub mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;

/// 设置环境: 加载 .env, 读取配置, 初始化日志
pub fn setup_environment() -> Config {
    // .env 文件可选
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    crate::utils::logger::init_logger_with_file(
        Some(config.log_level.as_str()),
        config.log_dir.as_deref(),
    );
    config
}
