//! 加上 tracing 的外部呼叫包裝

use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use med_core::{Medicine, StockEntry};
use tracing::Instrument;

use crate::notify::{Notifier, NotifyError};
use crate::store::{StockStore, StoreError};

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// 為任何 `StockStore` 加上 span 與耗時記錄
#[derive(Clone)]
pub struct TracedStockStore<S> {
    inner: S,
}

impl<S> TracedStockStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: StockStore> StockStore for TracedStockStore<S> {
    async fn fetch_medicines(&self) -> Result<Vec<Medicine>, StoreError> {
        let span = tracing::info_span!("store.fetch_medicines");
        async {
            let start = Instant::now();
            let result = self.inner.fetch_medicines().await;
            match &result {
                Ok(medicines) => tracing::debug!(
                    count = medicines.len(),
                    elapsed_ms = elapsed_ms(start),
                    "已讀取藥品"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed_ms(start),
                    error = %e,
                    "讀取藥品失敗"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn fetch_stock_entries(&self) -> Result<Vec<StockEntry>, StoreError> {
        let span = tracing::info_span!("store.fetch_stock_entries");
        async {
            let start = Instant::now();
            let result = self.inner.fetch_stock_entries().await;
            match &result {
                Ok(entries) => tracing::debug!(
                    count = entries.len(),
                    elapsed_ms = elapsed_ms(start),
                    "已讀取補藥記錄"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed_ms(start),
                    error = %e,
                    "讀取補藥記錄失敗"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn update_last_alerted_date(
        &self,
        medicine_id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.update_last_alerted_date", medicine_id, %date);
        async {
            let result = self.inner.update_last_alerted_date(medicine_id, date).await;
            match &result {
                Ok(()) => tracing::debug!("已更新"),
                Err(e) => tracing::error!(error = %e, "更新失敗"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn update_forecast_date(
        &self,
        medicine_id: &str,
        forecast_date: NaiveDate,
        updated_at: NaiveDate,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "store.update_forecast_date",
            medicine_id,
            %forecast_date,
            %updated_at
        );
        async {
            let result = self
                .inner
                .update_forecast_date(medicine_id, forecast_date, updated_at)
                .await;
            match &result {
                Ok(()) => tracing::debug!("已更新"),
                Err(e) => tracing::error!(error = %e, "更新失敗"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn create_stock_entry(&self, entry: StockEntry) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "store.create_stock_entry",
            medicine_id = %entry.medicine_id,
            entry_id = %entry.id
        );
        async {
            tracing::info!(quantity = %entry.quantity, unit = %entry.unit, "新增補藥記錄");
            let result = self.inner.create_stock_entry(entry).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "新增失敗");
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// 為任何 `Notifier` 加上 span 與耗時記錄
#[derive(Clone)]
pub struct TracedNotifier<N> {
    inner: N,
}

impl<N> TracedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: Notifier> Notifier for TracedNotifier<N> {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify.send", message_len = message.len());
        async {
            let start = Instant::now();
            let result = self.inner.send(message).await;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed_ms(start), "已送出"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed_ms(start),
                    error = %e,
                    "傳送失敗"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}
