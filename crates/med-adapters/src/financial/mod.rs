//! 分攤記錄儲存端介面

use async_trait::async_trait;
use med_core::FinancialEntry;

use crate::StoreError;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFinancialStore;

/// 分攤記錄的儲存端
#[async_trait]
pub trait FinancialStore: Clone + Send + Sync + 'static {
    /// 取得指定月份的分攤記錄
    async fn fetch_financial_entries(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<FinancialEntry>, StoreError>;
}

/// 月份標記，例如 `2025-06`
pub fn month_tag(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}
