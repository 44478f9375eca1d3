//! 斷藥預測總表

use chrono::{DateTime, NaiveDate, Utc};
use med_core::{Medicine, StockEntry};
use rust_decimal::Decimal;

use crate::StockCalculator;

/// 預測總表中的一列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRow {
    pub medicine_id: String,
    pub name: String,
    pub current_stock: Decimal,
    pub forecast_date: NaiveDate,
    /// 與儲存端記錄的預測日期不同，需要回寫
    pub needs_update: bool,
}

/// 預測總表計算器
pub struct ForecastCalculator;

impl ForecastCalculator {
    /// 計算所有會耗盡的藥品的斷藥日期，依日期由近到遠排序
    ///
    /// 已經沒有庫存或每日用量為 0 的藥品不列入。
    pub fn summarize(
        medicines: &[Medicine],
        entries: &[StockEntry],
        now: DateTime<Utc>,
    ) -> Vec<ForecastRow> {
        let mut rows: Vec<ForecastRow> = medicines
            .iter()
            .filter(|m| !m.never_depletes())
            .filter_map(|m| {
                let stock = StockCalculator::current_stock_at(m, entries, now);
                if stock <= Decimal::ZERO {
                    tracing::debug!(medicine_id = %m.id, "已無庫存，不列入預測");
                    return None;
                }

                let forecast_date =
                    StockCalculator::out_of_stock_date_at(m, stock, now).date_naive();

                Some(ForecastRow {
                    medicine_id: m.id.clone(),
                    name: m.name.clone(),
                    current_stock: stock,
                    forecast_date,
                    needs_update: m.forecast_out_of_stock_date != Some(forecast_date),
                })
            })
            .collect();

        // 穩定排序：同一天的藥品維持儲存端順序
        rows.sort_by_key(|row| row.forecast_date);
        rows
    }
}
