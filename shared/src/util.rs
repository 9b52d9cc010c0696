use crate::types::{MINUTE_MS, Timestamp};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Whole minutes elapsed between two timestamps, never negative
pub fn elapsed_minutes(since: Timestamp, now: Timestamp) -> i64 {
    (now - since).max(0) / MINUTE_MS
}
