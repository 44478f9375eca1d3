//! 定期提醒排程器

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use med_adapters::{Notifier, StockStore};
use med_core::Clock;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

use crate::engine::AlertEngine;
use crate::{AlertError, Result};

/// 排程器狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

#[derive(Debug)]
struct Shared {
    stopped: AtomicBool,
    wake: Notify,
}

impl Shared {
    fn state(&self) -> SchedulerState {
        if self.stopped.load(Ordering::SeqCst) {
            SchedulerState::Stopped
        } else {
            SchedulerState::Running
        }
    }
}

/// 定期執行 [`AlertEngine::run_pass`]
///
/// - 檢查成功：等下一個間隔或停止訊號
/// - 讀取失敗：固定等一個完整間隔後重試
/// - 停止是協作式的，進行中的檢查會先跑完
pub struct AlertScheduler<S, N, C> {
    engine: AlertEngine<S, N>,
    clock: C,
    interval: Duration,
    shared: Arc<Shared>,
}

impl<S: StockStore, N: Notifier, C: Clock> AlertScheduler<S, N, C> {
    /// 創建排程器（初始狀態為 Stopped）
    pub fn new(engine: AlertEngine<S, N>, clock: C, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AlertError::InvalidInterval);
        }

        Ok(Self {
            engine,
            clock,
            interval,
            shared: Arc::new(Shared {
                stopped: AtomicBool::new(true),
                wake: Notify::new(),
            }),
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.state()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 在背景 task 開始排程，必須在 tokio runtime 內呼叫
    pub fn start(self) -> SchedulerHandle {
        self.shared.stopped.store(false, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(self.run());
        SchedulerHandle { shared, task }
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一個 tick 立即完成
        ticker.tick().await;

        tracing::info!(
            interval = %humantime::format_duration(self.interval),
            "提醒排程器啟動"
        );

        while !self.shared.stopped.load(Ordering::SeqCst) {
            let now = self.clock.now();
            match self.engine.run_pass(now).await {
                Ok(_) => {
                    tokio::select! {
                        _ = ticker.tick() => {}
                        _ = self.shared.wake.notified() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in = %humantime::format_duration(self.interval),
                        "檢查失敗，等待一個間隔後重試"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {}
                        _ = self.shared.wake.notified() => {}
                    }
                    ticker.reset();
                }
            }
        }

        tracing::info!("提醒排程器已停止");
    }
}

/// 執行中排程器的控制代碼
///
/// 丟棄代碼不會停止排程，需要明確呼叫 [`SchedulerHandle::stop`]。
#[must_use = "dropping the handle leaves the scheduler running with no way to stop it"]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// 發出停止訊號，迴圈在下一個檢查點結束
    pub fn stop(&self) {
        if !self.shared.stopped.swap(true, Ordering::SeqCst) {
            tracing::info!("收到停止訊號");
        }
        self.shared.wake.notify_one();
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// 等待背景 task 結束（需先呼叫 `stop`）
    pub async fn join(self) -> std::result::Result<(), JoinError> {
        self.task.await
    }
}
