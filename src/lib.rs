//! # Medtrack
//!
//! 家用藥品庫存追蹤：庫存計算、斷藥預測與低庫存提醒

pub use med_adapters as adapters;
pub use med_alert as alert;
pub use med_calc as calc;
pub use med_core as model;

use med_adapters::{Notifier, StockStore};
use med_alert::{AlertEngine, AlertScheduler, SchedulerHandle};
use med_core::{AlertConfig, Clock};
use tracing_subscriber::EnvFilter;

/// 預設 log 過濾條件（可用 `RUST_LOG` 覆寫）
pub const DEFAULT_LOG_FILTER: &str = "info,med_alert=info,med_adapters=info";

/// 初始化全域 tracing subscriber，已初始化過則略過
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber 已初始化，略過");
    }
}

/// 依配置啟動定期提醒
///
/// `ticker_enabled` 為 false 時回傳 `None`，不啟動任何背景 task。
pub fn start_alert_ticker<S, N, C>(
    config: &AlertConfig,
    store: S,
    notifier: N,
    clock: C,
) -> med_alert::Result<Option<SchedulerHandle>>
where
    S: StockStore,
    N: Notifier,
    C: Clock,
{
    if !config.ticker_enabled {
        tracing::info!("未啟用定期提醒");
        return Ok(None);
    }

    let engine = AlertEngine::new(store, notifier).with_config(config.clone());
    let scheduler = AlertScheduler::new(engine, clock, config.check_interval)?;
    Ok(Some(scheduler.start()))
}
