//! 藥品模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::StockUnit;

/// 藥品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    /// 藥品ID（儲存端記錄ID）
    pub id: String,

    /// 顯示名稱
    pub name: String,

    /// 每日用量（顆/天），0 表示永不耗盡
    pub daily_dose: Decimal,

    /// 開始服用日期（只看日期，不看時間）
    #[serde(with = "crate::fields::flexible_date")]
    pub start_date: NaiveDate,

    /// 開始日期當天的庫存
    pub initial_stock: Decimal,

    /// 每盒顆數
    pub unit_per_box: Decimal,

    /// 最近一次送出低庫存提醒的日期
    #[serde(
        default,
        with = "crate::fields::optional_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_alerted_date: Option<NaiveDate>,

    /// 儲存端記錄的預計斷藥日期
    #[serde(
        default,
        with = "crate::fields::optional_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub forecast_out_of_stock_date: Option<NaiveDate>,
}

impl Medicine {
    /// 創建新的藥品（每盒 1 顆）
    pub fn new(
        id: String,
        name: String,
        daily_dose: Decimal,
        start_date: NaiveDate,
        initial_stock: Decimal,
    ) -> Self {
        Self {
            id,
            name,
            daily_dose,
            start_date,
            initial_stock,
            unit_per_box: Decimal::ONE,
            last_alerted_date: None,
            forecast_out_of_stock_date: None,
        }
    }

    /// 建構器模式：設置每盒顆數
    pub fn with_unit_per_box(mut self, unit_per_box: Decimal) -> Self {
        self.unit_per_box = unit_per_box;
        self
    }

    /// 建構器模式：設置最近提醒日期
    pub fn with_last_alerted_date(mut self, date: NaiveDate) -> Self {
        self.last_alerted_date = Some(date);
        self
    }

    /// 建構器模式：設置已儲存的預計斷藥日期
    pub fn with_forecast_date(mut self, date: NaiveDate) -> Self {
        self.forecast_out_of_stock_date = Some(date);
        self
    }

    /// 每日用量不為正，庫存永遠不會耗盡
    pub fn never_depletes(&self) -> bool {
        self.daily_dose <= Decimal::ZERO
    }

    /// 指定日期是否已經提醒過
    pub fn alerted_on(&self, day: NaiveDate) -> bool {
        self.last_alerted_date == Some(day)
    }

    /// 換算為顆數（超出範圍時飽和）
    pub fn to_pills(&self, quantity: Decimal, unit: StockUnit) -> Decimal {
        match unit {
            StockUnit::Box => quantity.saturating_mul(self.unit_per_box),
            StockUnit::Pill => quantity,
        }
    }
}
