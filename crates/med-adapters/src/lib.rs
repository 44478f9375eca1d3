//! # Med Adapters
//!
//! 外部系統介面：資料表儲存端、訊息通知、分攤記錄

pub mod financial;
pub mod notify;
pub mod store;
pub mod traced;

// Re-export 主要類型
pub use financial::FinancialStore;
pub use notify::{Notifier, NotifyError};
pub use store::{StockStore, StoreError};
pub use traced::{TracedNotifier, TracedStockStore};

// 測試輔助：只在測試或啟用 test-support 時編譯
#[cfg(any(test, feature = "test-support"))]
pub use financial::FakeFinancialStore;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStockStore, StoreCall};
