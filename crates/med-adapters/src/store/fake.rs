//! 測試用儲存端

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use med_core::{Medicine, StockEntry};

use super::{StockStore, StoreError};

/// 記錄下來的呼叫
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FetchMedicines,
    FetchStockEntries,
    UpdateLastAlertedDate {
        medicine_id: String,
        date: NaiveDate,
    },
    UpdateForecastDate {
        medicine_id: String,
        forecast_date: NaiveDate,
        updated_at: NaiveDate,
    },
    CreateStockEntry {
        entry: StockEntry,
    },
}

#[derive(Default)]
struct FakeStoreState {
    medicines: Vec<Medicine>,
    entries: Vec<StockEntry>,
    calls: Vec<StoreCall>,
    fetch_failure: Option<StoreError>,
    update_failure: Option<StoreError>,
}

/// 記憶體內的儲存端，更新會套用到自己的快照上
#[derive(Clone, Default)]
pub struct FakeStockStore {
    state: Arc<Mutex<FakeStoreState>>,
}

impl FakeStockStore {
    pub fn new(medicines: Vec<Medicine>, entries: Vec<StockEntry>) -> Self {
        let store = Self::default();
        {
            let mut state = store.lock();
            state.medicines = medicines;
            state.entries = entries;
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeStoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 目前的藥品快照
    pub fn medicines(&self) -> Vec<Medicine> {
        self.lock().medicines.clone()
    }

    /// 目前的補藥記錄快照
    pub fn entries(&self) -> Vec<StockEntry> {
        self.lock().entries.clone()
    }

    /// 替換藥品快照
    pub fn set_medicines(&self, medicines: Vec<Medicine>) {
        self.lock().medicines = medicines;
    }

    /// 所有呼叫記錄
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// `fetch_medicines` 被呼叫的次數（含失敗）
    pub fn fetch_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::FetchMedicines))
            .count()
    }

    /// 所有 `update_last_alerted_date` 呼叫
    pub fn alert_date_updates(&self) -> Vec<(String, NaiveDate)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::UpdateLastAlertedDate { medicine_id, date } => {
                    Some((medicine_id.clone(), *date))
                }
                _ => None,
            })
            .collect()
    }

    /// 讓之後的讀取全部失敗（None 恢復正常）
    pub fn set_fetch_failure(&self, failure: Option<StoreError>) {
        self.lock().fetch_failure = failure;
    }

    /// 讓之後的寫入全部失敗（None 恢復正常）
    pub fn set_update_failure(&self, failure: Option<StoreError>) {
        self.lock().update_failure = failure;
    }
}

#[async_trait]
impl StockStore for FakeStockStore {
    async fn fetch_medicines(&self) -> Result<Vec<Medicine>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FetchMedicines);
        match &state.fetch_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.medicines.clone()),
        }
    }

    async fn fetch_stock_entries(&self) -> Result<Vec<StockEntry>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FetchStockEntries);
        match &state.fetch_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.entries.clone()),
        }
    }

    async fn update_last_alerted_date(
        &self,
        medicine_id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::UpdateLastAlertedDate {
            medicine_id: medicine_id.to_string(),
            date,
        });
        if let Some(err) = &state.update_failure {
            return Err(err.clone());
        }
        let medicine = state
            .medicines
            .iter_mut()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| StoreError::RecordNotFound(medicine_id.to_string()))?;
        medicine.last_alerted_date = Some(date);
        Ok(())
    }

    async fn update_forecast_date(
        &self,
        medicine_id: &str,
        forecast_date: NaiveDate,
        updated_at: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::UpdateForecastDate {
            medicine_id: medicine_id.to_string(),
            forecast_date,
            updated_at,
        });
        if let Some(err) = &state.update_failure {
            return Err(err.clone());
        }
        let medicine = state
            .medicines
            .iter_mut()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| StoreError::RecordNotFound(medicine_id.to_string()))?;
        medicine.forecast_out_of_stock_date = Some(forecast_date);
        Ok(())
    }

    async fn create_stock_entry(&self, entry: StockEntry) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::CreateStockEntry {
            entry: entry.clone(),
        });
        if let Some(err) = &state.update_failure {
            return Err(err.clone());
        }
        state.entries.push(entry);
        Ok(())
    }
}
