//! # Med Calculation Engine
//!
//! 庫存、斷藥預測與分攤報表計算（純函數，無 I/O）

pub mod financial;
pub mod forecast;
pub mod stock;

// Re-export 主要類型
pub use financial::FinancialReportCalculator;
pub use forecast::{ForecastCalculator, ForecastRow};
pub use stock::StockCalculator;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一藥品庫存快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// 初始庫存
    pub initial_stock: Decimal,

    /// 已消耗（初始 - 目前，不小於 0）
    pub consumed_stock: Decimal,

    /// 目前庫存（顆）
    pub current_stock: Decimal,

    /// 預計斷藥時間
    pub out_of_stock_date: DateTime<Utc>,
}
