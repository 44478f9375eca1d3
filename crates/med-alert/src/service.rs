//! 即時查詢服務

use chrono::{DateTime, Utc};
use med_adapters::{FinancialStore, StockStore};
use med_calc::{FinancialReportCalculator, ForecastCalculator, StockCalculator, StockInfo};
use med_core::{AlertConfig, MedError, Medicine, MonthlyFinancialReport, StockEntry, StockUnit};
use rust_decimal::Decimal;

use crate::message::forecast_message;
use crate::{AlertError, Result};

/// 藥品庫存查詢
#[derive(Clone)]
pub struct StockQueryService<S> {
    store: S,
    config: AlertConfig,
}

impl<S: StockStore> StockQueryService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: AlertConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AlertConfig) -> Self {
        self.config = config;
        self
    }

    /// 單一藥品的庫存快照
    pub async fn get_stock_info(&self, medicine_id: &str, now: DateTime<Utc>) -> Result<StockInfo> {
        let medicine = self.find_medicine(medicine_id).await?;
        let entries = self
            .store
            .fetch_stock_entries()
            .await
            .map_err(AlertError::FetchEntries)?;

        Ok(StockCalculator::snapshot(
            &medicine,
            &entries,
            now,
            self.config.never_depletes_years,
        ))
    }

    /// 斷藥預測總表
    ///
    /// 預測日期有變動的藥品會寫回儲存端，寫回失敗不影響回傳的總表。
    pub async fn forecast_summary(&self, now: DateTime<Utc>) -> Result<String> {
        let medicines = self
            .store
            .fetch_medicines()
            .await
            .map_err(AlertError::FetchMedicines)?;
        let entries = self
            .store
            .fetch_stock_entries()
            .await
            .map_err(AlertError::FetchEntries)?;

        let rows = ForecastCalculator::summarize(&medicines, &entries, now);
        let today = now.date_naive();

        for row in rows.iter().filter(|r| r.needs_update) {
            match self
                .store
                .update_forecast_date(&row.medicine_id, row.forecast_date, today)
                .await
            {
                Ok(()) => tracing::info!(
                    medicine_id = %row.medicine_id,
                    forecast = %row.forecast_date,
                    "預計斷藥日期已更新"
                ),
                Err(e) => tracing::warn!(
                    medicine_id = %row.medicine_id,
                    error = %e,
                    "預計斷藥日期寫回失敗"
                ),
            }
        }

        Ok(forecast_message(&rows))
    }

    /// 新增補藥記錄
    pub async fn record_refill(
        &self,
        medicine_id: &str,
        quantity: Decimal,
        unit: StockUnit,
        date: DateTime<Utc>,
    ) -> Result<StockEntry> {
        if quantity <= Decimal::ZERO {
            return Err(MedError::InvalidQuantity(quantity.to_string()).into());
        }

        let medicine = self.find_medicine(medicine_id).await?;
        let entry = StockEntry::new(medicine.id, quantity, unit, date);
        self.store.create_stock_entry(entry.clone()).await?;

        tracing::info!(
            medicine_id,
            entry_id = %entry.id,
            %quantity,
            %unit,
            "補藥記錄已新增"
        );
        Ok(entry)
    }

    async fn find_medicine(&self, medicine_id: &str) -> Result<Medicine> {
        self.store
            .fetch_medicines()
            .await
            .map_err(AlertError::FetchMedicines)?
            .into_iter()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| AlertError::MedicineNotFound(medicine_id.to_string()))
    }
}

/// 分攤月報表
#[derive(Clone)]
pub struct FinancialReportService<F> {
    store: F,
}

impl<F: FinancialStore> FinancialReportService<F> {
    pub fn new(store: F) -> Self {
        Self { store }
    }

    pub async fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyFinancialReport> {
        if !(1..=12).contains(&month) {
            return Err(MedError::InvalidDate(format!("{year}-{month}")).into());
        }

        let entries = self.store.fetch_financial_entries(year, month).await?;
        Ok(FinancialReportCalculator::aggregate(year, month, &entries))
    }
}
