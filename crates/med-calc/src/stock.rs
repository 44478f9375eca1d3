//! 庫存計算

use chrono::{DateTime, Months, NaiveDate, TimeDelta, Utc};
use med_core::{Medicine, StockEntry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::StockInfo;

/// 每日用量為 0 時的預設推算年數
pub const NEVER_DEPLETES_YEARS: u32 = 100;

/// 庫存計算器
pub struct StockCalculator;

impl StockCalculator {
    /// 計算評估時間點的目前庫存
    ///
    /// 庫存 = 初始庫存 - 經過天數 × 每日用量 + 已生效的補藥（換算成顆），
    /// 不小於 0，最後才四捨五入到小數兩位。
    /// 超出 `Decimal` 範圍的中間結果會飽和，不會 panic。
    pub fn current_stock_at(
        medicine: &Medicine,
        entries: &[StockEntry],
        now: DateTime<Utc>,
    ) -> Decimal {
        let mut stock = medicine.initial_stock;

        let days_passed = Self::days_passed(medicine.start_date, now);
        if days_passed > 0 {
            let consumed = Decimal::from(days_passed).saturating_mul(medicine.daily_dose);
            stock = stock.saturating_sub(consumed);
        }

        // 只計入評估時間點之前（含）的補藥
        let refilled = entries
            .iter()
            .filter(|e| e.belongs_to(&medicine.id) && e.is_effective_at(now))
            .map(|e| medicine.to_pills(e.quantity, e.unit))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        stock = stock.saturating_add(refilled);

        stock
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// 推算斷藥時間（假設之後不再補藥）
    pub fn out_of_stock_date_at(
        medicine: &Medicine,
        stock: Decimal,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        Self::out_of_stock_date_with_horizon(medicine, stock, now, NEVER_DEPLETES_YEARS)
    }

    /// 推算斷藥時間，每日用量為 0 時回傳 `never_years` 年後
    pub fn out_of_stock_date_with_horizon(
        medicine: &Medicine,
        stock: Decimal,
        now: DateTime<Utc>,
        never_years: u32,
    ) -> DateTime<Utc> {
        if medicine.never_depletes() {
            return Self::years_after(now, never_years);
        }

        let days_left = stock
            .checked_div(medicine.daily_dose)
            .and_then(|days| days.floor().to_i64());
        match days_left.and_then(TimeDelta::try_days) {
            Some(delta) => now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// 兩個時間點之間相差的日曆天數（忽略時分秒）
    pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (target.date_naive() - now.date_naive()).num_days()
    }

    /// 從開始日期到評估時間點經過的日曆天數，可能為負
    pub fn days_passed(start_date: NaiveDate, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - start_date).num_days()
    }

    /// 單一藥品的庫存快照
    pub fn snapshot(
        medicine: &Medicine,
        entries: &[StockEntry],
        now: DateTime<Utc>,
        never_years: u32,
    ) -> StockInfo {
        let current_stock = Self::current_stock_at(medicine, entries, now);
        let out_of_stock_date =
            Self::out_of_stock_date_with_horizon(medicine, current_stock, now, never_years);

        StockInfo {
            initial_stock: medicine.initial_stock,
            consumed_stock: medicine
                .initial_stock
                .saturating_sub(current_stock)
                .max(Decimal::ZERO),
            current_stock,
            out_of_stock_date,
        }
    }

    fn years_after(now: DateTime<Utc>, years: u32) -> DateTime<Utc> {
        years
            .checked_mul(12)
            .and_then(|months| now.checked_add_months(Months::new(months)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
