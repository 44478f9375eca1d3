//! 補藥記錄模型

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MedError;

/// 補藥單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockUnit {
    /// 整盒（需乘上每盒顆數）
    Box,
    /// 單顆
    Pill,
}

impl StockUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockUnit::Box => "box",
            StockUnit::Pill => "pill",
        }
    }
}

impl fmt::Display for StockUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockUnit {
    type Err = MedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(StockUnit::Box),
            "pill" => Ok(StockUnit::Pill),
            other => Err(MedError::InvalidUnit(other.to_string())),
        }
    }
}

/// 補藥記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    /// 記錄ID
    #[serde(default)]
    pub id: String,

    /// 對應的藥品ID
    #[serde(with = "crate::fields::linked_id")]
    pub medicine_id: String,

    /// 數量
    pub quantity: Decimal,

    /// 單位
    pub unit: StockUnit,

    /// 生效時間（晚於評估時間點的記錄不計入庫存）
    #[serde(with = "crate::fields::flexible_datetime")]
    pub date: DateTime<Utc>,
}

impl StockEntry {
    /// 創建新的補藥記錄
    pub fn new(medicine_id: String, quantity: Decimal, unit: StockUnit, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            medicine_id,
            quantity,
            unit,
            date,
        }
    }

    /// 建構器模式：設置記錄ID
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    /// 是否屬於指定藥品
    pub fn belongs_to(&self, medicine_id: &str) -> bool {
        self.medicine_id == medicine_id
    }

    /// 在評估時間點是否已生效（含當下）
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }

    /// 是否落在指定日期
    pub fn falls_on(&self, day: NaiveDate) -> bool {
        self.date.date_naive() == day
    }
}
