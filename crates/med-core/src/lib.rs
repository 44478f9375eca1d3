//! # Med Core
//!
//! 核心資料模型與類型定義

pub mod clock;
pub mod config;
pub mod fields;
pub mod financial;
pub mod medicine;
pub mod stock_entry;

// Re-export 主要類型
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::AlertConfig;
pub use financial::{ContributorAmount, FinancialEntry, MonthlyFinancialReport, NeedReportBlock};
pub use medicine::Medicine;
pub use stock_entry::{StockEntry, StockUnit};

/// 核心錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MedError {
    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("無效的單位: {0}（僅支援 box 或 pill）")]
    InvalidUnit(String),

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),
}

pub type Result<T> = std::result::Result<T, MedError>;
