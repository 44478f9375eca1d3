//! 測試用通知管道

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Notifier, NotifyError};

#[derive(Default)]
struct FakeNotifierState {
    sent: Vec<String>,
    attempts: usize,
    fail_all: bool,
    fail_containing: Vec<String>,
}

/// 記錄所有訊息的通知管道
#[derive(Clone, Default)]
pub struct FakeNotifier {
    state: Arc<Mutex<FakeNotifierState>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeNotifierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 成功送出的訊息
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// 傳送次數（含失敗）
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// 讓所有傳送失敗（連線層錯誤）
    pub fn set_fail_all(&self, fail: bool) {
        self.lock().fail_all = fail;
    }

    /// 讓內容包含指定字串的訊息被通知服務拒絕（status 400）
    pub fn fail_when_contains(&self, pattern: impl Into<String>) {
        self.lock().fail_containing.push(pattern.into());
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.sent.clear();
        state.attempts = 0;
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let mut state = self.lock();
        state.attempts += 1;

        if state.fail_all {
            return Err(NotifyError::Send("connection refused".to_string()));
        }
        if let Some(pattern) = state
            .fail_containing
            .iter()
            .find(|p| message.contains(p.as_str()))
        {
            return Err(NotifyError::Rejected {
                status: 400,
                description: format!("Bad Request: message contains {pattern:?}"),
            });
        }

        state.sent.push(message.to_string());
        Ok(())
    }
}
