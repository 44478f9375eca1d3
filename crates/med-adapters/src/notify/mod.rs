//! 訊息通知介面

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;

/// 通知錯誤
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("通知傳送失敗: {0}")]
    Send(String),

    #[error("通知服務拒絕訊息 (status {status}): {description}")]
    Rejected { status: u16, description: String },
}

/// 訊息通知管道
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    /// 傳送一則 MarkdownV2 訊息
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
