//! 提醒配置模型

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 環境變數：是否啟用定期提醒
pub const ENV_TICKER_ENABLED: &str = "ENABLE_ALERT_TICKER";
/// 環境變數：提醒間隔（例如 `24h`、`30m`）
pub const ENV_TICKER_INTERVAL: &str = "ALERT_TICKER_INTERVAL";
/// 環境變數：外部呼叫逾時（未設定則不限時）
pub const ENV_CALL_TIMEOUT: &str = "ALERT_CALL_TIMEOUT";

/// 低庫存提醒配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// 剩餘天數小於等於此值時提醒
    pub threshold_days: i64,

    /// 定期檢查間隔
    pub check_interval: Duration,

    /// 是否啟用定期檢查
    pub ticker_enabled: bool,

    /// 每日用量為 0 時，預計斷藥日期往後推的年數
    pub never_depletes_years: u32,

    /// 單次儲存端/通知呼叫的逾時
    /// - None: 不限時，外部呼叫卡住時整個排程器跟著卡住（預設）
    /// - Some: 逾時視為該次呼叫失敗
    pub call_timeout: Option<Duration>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_days: 10,
            check_interval: Duration::from_secs(24 * 60 * 60),
            ticker_enabled: false,
            never_depletes_years: 100,
            call_timeout: None,
        }
    }
}

impl AlertConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置提醒門檻（天）
    pub fn with_threshold_days(mut self, days: i64) -> Self {
        self.threshold_days = days;
        self
    }

    /// 建構器模式：設置檢查間隔
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// 建構器模式：設置是否啟用定期檢查
    pub fn with_ticker_enabled(mut self, enabled: bool) -> Self {
        self.ticker_enabled = enabled;
        self
    }

    /// 建構器模式：設置外部呼叫逾時
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// 剩餘天數是否進入提醒範圍（含門檻值）
    pub fn within_threshold(&self, days_left: i64) -> bool {
        days_left <= self.threshold_days
    }

    /// 從環境變數讀取配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 從任意鍵值來源讀取配置，無法解析的值沿用預設並記錄警告
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TICKER_ENABLED) {
            config.ticker_enabled = raw.trim() == "true";
        }

        if let Some(raw) = lookup(ENV_TICKER_INTERVAL) {
            match parse_positive_duration(&raw) {
                Some(interval) => config.check_interval = interval,
                None => tracing::warn!(
                    key = ENV_TICKER_INTERVAL,
                    value = %raw,
                    "無法解析提醒間隔，使用預設值"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_CALL_TIMEOUT) {
            match parse_positive_duration(&raw) {
                Some(timeout) => config.call_timeout = Some(timeout),
                None => tracing::warn!(
                    key = ENV_CALL_TIMEOUT,
                    value = %raw,
                    "無法解析呼叫逾時，不限時"
                ),
            }
        }

        config
    }
}

fn parse_positive_duration(raw: &str) -> Option<Duration> {
    humantime::parse_duration(raw.trim())
        .ok()
        .filter(|d| !d.is_zero())
}
