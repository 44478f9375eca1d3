//! 資料表儲存端介面

use async_trait::async_trait;
use chrono::NaiveDate;
use med_core::{Medicine, StockEntry};
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStockStore, StoreCall};

/// 儲存端錯誤
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("儲存端請求失敗: {0}")]
    Request(String),

    #[error("儲存端回應錯誤 (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("找不到記錄: {0}")]
    RecordNotFound(String),
}

/// 藥品與補藥記錄的儲存端
///
/// 每次呼叫都回傳遠端的最新快照，不做快取。
#[async_trait]
pub trait StockStore: Clone + Send + Sync + 'static {
    /// 取得所有藥品（維持儲存端順序）
    async fn fetch_medicines(&self) -> Result<Vec<Medicine>, StoreError>;

    /// 取得所有補藥記錄
    async fn fetch_stock_entries(&self) -> Result<Vec<StockEntry>, StoreError>;

    /// 記錄最近一次低庫存提醒日期
    async fn update_last_alerted_date(
        &self,
        medicine_id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError>;

    /// 記錄預計斷藥日期
    async fn update_forecast_date(
        &self,
        medicine_id: &str,
        forecast_date: NaiveDate,
        updated_at: NaiveDate,
    ) -> Result<(), StoreError>;

    /// 新增補藥記錄
    async fn create_stock_entry(&self, entry: StockEntry) -> Result<(), StoreError>;
}
