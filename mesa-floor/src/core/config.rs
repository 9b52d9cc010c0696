use mesa_client::ClientConfig;
use std::path::PathBuf;

use crate::tables::layout::LAYOUT_FILE;

/// 楼面监控配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | MESA_API_URL | http://localhost:8080 | 订单后端地址 |
/// | MESA_TOKEN | (无) | 会话令牌 |
/// | MESA_RESTAURANT_ID | (无) | 餐厅 ID |
/// | MESA_WORK_DIR | . | 工作目录 (桌台布局文件) |
/// | MESA_TICK_SECS | 10 | 刷新间隔(秒) |
/// | MESA_REQUEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
///
/// # 示例
///
/// ```ignore
/// MESA_RESTAURANT_ID=r-1 MESA_TOKEN=... cargo run --bin floor-watch
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 订单后端 URL
    pub api_url: String,
    /// 会话令牌
    pub token: Option<String>,
    /// 餐厅 ID
    pub restaurant_id: Option<String>,
    /// 工作目录
    pub work_dir: String,
    /// 刷新间隔 (秒)
    pub tick_secs: u64,
    /// 请求超时 (秒)
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            api_url: non_empty("MESA_API_URL").unwrap_or_else(|| "http://localhost:8080".into()),
            token: non_empty("MESA_TOKEN"),
            restaurant_id: non_empty("MESA_RESTAURANT_ID"),
            work_dir: non_empty("MESA_WORK_DIR").unwrap_or_else(|| ".".into()),
            tick_secs: std::env::var("MESA_TICK_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(10),
            request_timeout_secs: std::env::var("MESA_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty("LOG_DIR"),
        }
    }

    /// HTTP 客户端配置
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_url).with_timeout(self.request_timeout_secs);
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        if let Some(restaurant_id) = &self.restaurant_id {
            config = config.with_restaurant_id(restaurant_id);
        }
        config
    }

    /// 桌台布局文件路径
    pub fn layout_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(LAYOUT_FILE)
    }

    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
