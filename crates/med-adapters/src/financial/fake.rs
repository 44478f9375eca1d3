//! 測試用分攤記錄儲存端

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use med_core::FinancialEntry;

use super::{month_tag, FinancialStore};
use crate::StoreError;

#[derive(Default)]
struct FakeFinancialState {
    entries: Vec<FinancialEntry>,
    failure: Option<StoreError>,
    requests: Vec<(i32, u32)>,
}

/// 依月份標記過濾的記憶體儲存端
#[derive(Clone, Default)]
pub struct FakeFinancialStore {
    state: Arc<Mutex<FakeFinancialState>>,
}

impl FakeFinancialStore {
    pub fn new(entries: Vec<FinancialEntry>) -> Self {
        let store = Self::default();
        store.lock().entries = entries;
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeFinancialState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_failure(&self, failure: Option<StoreError>) {
        self.lock().failure = failure;
    }

    /// 被查詢過的月份
    pub fn requests(&self) -> Vec<(i32, u32)> {
        self.lock().requests.clone()
    }
}

#[async_trait]
impl FinancialStore for FakeFinancialStore {
    async fn fetch_financial_entries(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<FinancialEntry>, StoreError> {
        let mut state = self.lock();
        state.requests.push((year, month));
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }

        let tag = month_tag(year, month);
        Ok(state
            .entries
            .iter()
            .filter(|e| e.month_tag == tag)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn entry(y: i32, m: u32, d: u32) -> FinancialEntry {
        FinancialEntry::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            "Pharmacy".to_string(),
            "Alice".to_string(),
            Decimal::from(10),
        )
    }

    #[tokio::test]
    async fn test_filters_by_month() {
        let store = FakeFinancialStore::new(vec![
            entry(2025, 5, 31),
            entry(2025, 6, 1),
            entry(2025, 6, 30),
            entry(2024, 6, 15),
        ]);

        let june = store.fetch_financial_entries(2025, 6).await.unwrap();

        assert_eq!(june.len(), 2);
        assert_eq!(store.requests(), vec![(2025, 6)]);
    }

    #[tokio::test]
    async fn test_failure() {
        let store = FakeFinancialStore::new(vec![]);
        store.set_failure(Some(StoreError::Request("offline".to_string())));

        assert!(store.fetch_financial_entries(2025, 6).await.is_err());
    }

    #[test]
    fn test_month_tag_padding() {
        assert_eq!(month_tag(2025, 6), "2025-06");
        assert_eq!(month_tag(2025, 12), "2025-12");
    }
}
