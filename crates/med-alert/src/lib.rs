//! # Med Alert
//!
//! 低庫存提醒：單次檢查、定期排程與查詢服務

pub mod engine;
pub mod message;
pub mod scheduler;
pub mod service;

// Re-export 主要類型
pub use engine::{AlertEngine, PassReport};
pub use scheduler::{AlertScheduler, SchedulerHandle, SchedulerState};
pub use service::{FinancialReportService, StockQueryService};

use std::time::Duration;

use med_adapters::{NotifyError, StoreError};
use med_core::MedError;

/// 提醒錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("讀取藥品失敗: {0}")]
    FetchMedicines(#[source] StoreError),

    #[error("讀取補藥記錄失敗: {0}")]
    FetchEntries(#[source] StoreError),

    #[error("找不到藥品: {0}")]
    MedicineNotFound(String),

    #[error("儲存端錯誤: {0}")]
    Store(#[from] StoreError),

    #[error("通知錯誤: {0}")]
    Notify(#[from] NotifyError),

    #[error("外部呼叫逾時: {operation}（上限 {timeout:?}）")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("排程間隔必須大於 0")]
    InvalidInterval,

    #[error(transparent)]
    Invalid(#[from] MedError),
}

impl AlertError {
    /// 是否為一開始讀取資料時的失敗（排程器會在下一個間隔重試）
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AlertError::FetchMedicines(_) | AlertError::FetchEntries(_) | AlertError::Timeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
