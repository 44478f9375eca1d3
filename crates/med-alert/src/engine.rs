//! 單次提醒檢查

use std::future::Future;

use chrono::{DateTime, Utc};
use med_adapters::{Notifier, StockStore};
use med_calc::StockCalculator;
use med_core::{AlertConfig, Medicine, StockEntry};
use rust_decimal::Decimal;

use crate::message::{low_stock_message, refill_message};
use crate::{AlertError, Result};

/// 單次檢查的統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// 有庫存且會耗盡、實際評估過的藥品數
    pub medicines_checked: usize,
    pub alerts_sent: usize,
    /// 今天已提醒過而略過
    pub alerts_skipped: usize,
    pub alert_failures: usize,
    /// 訊息已送出但提醒日期寫回失敗
    pub marker_failures: usize,
    pub refills_sent: usize,
    pub refill_failures: usize,
}

/// 單一藥品的低庫存判斷結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LowStockOutcome {
    /// 不會耗盡或已經沒有庫存
    NotApplicable,
    Healthy,
    AlreadyAlerted,
    Alerted { marker_saved: bool },
}

/// 低庫存提醒引擎
///
/// 每次檢查都重新讀取藥品與補藥記錄，依儲存端順序逐一處理。
/// 單一藥品的失敗只記錄 log，不影響其他藥品。
#[derive(Clone)]
pub struct AlertEngine<S, N> {
    store: S,
    notifier: N,
    config: AlertConfig,
}

impl<S: StockStore, N: Notifier> AlertEngine<S, N> {
    /// 使用預設配置創建引擎
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            config: AlertConfig::default(),
        }
    }

    /// 設定配置
    pub fn with_config(mut self, config: AlertConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 執行一次完整檢查
    ///
    /// 只有一開始讀取藥品或補藥記錄失敗時回傳錯誤。
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<PassReport> {
        tracing::info!(%now, "開始低庫存檢查");

        let medicines = self
            .bounded("fetch_medicines", self.store.fetch_medicines())
            .await?
            .map_err(AlertError::FetchMedicines)?;
        let entries = self
            .bounded("fetch_stock_entries", self.store.fetch_stock_entries())
            .await?
            .map_err(AlertError::FetchEntries)?;

        let mut report = PassReport::default();

        for medicine in &medicines {
            match self.check_low_stock(medicine, &entries, now).await {
                Ok(LowStockOutcome::NotApplicable) => {}
                Ok(LowStockOutcome::Healthy) => report.medicines_checked += 1,
                Ok(LowStockOutcome::AlreadyAlerted) => {
                    report.medicines_checked += 1;
                    report.alerts_skipped += 1;
                }
                Ok(LowStockOutcome::Alerted { marker_saved }) => {
                    report.medicines_checked += 1;
                    report.alerts_sent += 1;
                    if !marker_saved {
                        report.marker_failures += 1;
                    }
                }
                Err(e) => {
                    report.medicines_checked += 1;
                    report.alert_failures += 1;
                    tracing::error!(
                        medicine_id = %medicine.id,
                        error = %e,
                        "低庫存提醒失敗"
                    );
                }
            }
        }

        self.notify_refills(&medicines, &entries, now, &mut report).await;

        tracing::info!(
            medicines = medicines.len(),
            entries = entries.len(),
            alerts_sent = report.alerts_sent,
            alerts_skipped = report.alerts_skipped,
            alert_failures = report.alert_failures,
            refills_sent = report.refills_sent,
            refill_failures = report.refill_failures,
            "低庫存檢查完成"
        );

        Ok(report)
    }

    async fn check_low_stock(
        &self,
        medicine: &Medicine,
        entries: &[StockEntry],
        now: DateTime<Utc>,
    ) -> Result<LowStockOutcome> {
        if medicine.never_depletes() {
            tracing::debug!(medicine_id = %medicine.id, "每日用量為 0，略過");
            return Ok(LowStockOutcome::NotApplicable);
        }

        let stock = StockCalculator::current_stock_at(medicine, entries, now);
        if stock <= Decimal::ZERO {
            tracing::debug!(medicine_id = %medicine.id, "已無庫存，略過");
            return Ok(LowStockOutcome::NotApplicable);
        }

        let forecast = StockCalculator::out_of_stock_date_with_horizon(
            medicine,
            stock,
            now,
            self.config.never_depletes_years,
        );
        let days_left = StockCalculator::days_until(forecast, now);

        tracing::debug!(
            medicine_id = %medicine.id,
            %stock,
            days_left,
            forecast = %forecast.date_naive(),
            "庫存評估"
        );

        if !self.config.within_threshold(days_left) {
            return Ok(LowStockOutcome::Healthy);
        }

        let today = now.date_naive();
        if medicine.alerted_on(today) {
            tracing::info!(medicine_id = %medicine.id, "今天已提醒過，略過");
            return Ok(LowStockOutcome::AlreadyAlerted);
        }

        let message = low_stock_message(&medicine.name, days_left, forecast.date_naive(), stock);
        self.dispatch(&message).await?;

        // 訊息送出後才寫回，寫回失敗只會讓下一次檢查重送
        let saved = self
            .bounded(
                "update_last_alerted_date",
                self.store.update_last_alerted_date(&medicine.id, today),
            )
            .await
            .and_then(|r| r.map_err(AlertError::from));
        let marker_saved = match saved {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(medicine_id = %medicine.id, error = %e, "提醒日期寫回失敗");
                false
            }
        };

        tracing::info!(medicine_id = %medicine.id, days_left, "低庫存提醒已送出");
        Ok(LowStockOutcome::Alerted { marker_saved })
    }

    /// 今天的補藥記錄，依藥品分組，每個藥品一則通知（沒有去重）
    async fn notify_refills(
        &self,
        medicines: &[Medicine],
        entries: &[StockEntry],
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) {
        let today = now.date_naive();
        let todays: Vec<&StockEntry> = entries.iter().filter(|e| e.falls_on(today)).collect();
        if todays.is_empty() {
            return;
        }

        let orphans = todays
            .iter()
            .filter(|e| !medicines.iter().any(|m| e.belongs_to(&m.id)))
            .count();
        if orphans > 0 {
            tracing::debug!(orphans, "補藥記錄找不到對應藥品，略過");
        }

        for medicine in medicines {
            let group: Vec<&StockEntry> = todays
                .iter()
                .copied()
                .filter(|e| e.belongs_to(&medicine.id))
                .collect();
            if group.is_empty() {
                continue;
            }

            let message = refill_message(medicine, &group);
            match self.dispatch(&message).await {
                Ok(()) => {
                    report.refills_sent += 1;
                    tracing::info!(
                        medicine_id = %medicine.id,
                        entries = group.len(),
                        "補藥通知已送出"
                    );
                }
                Err(e) => {
                    report.refill_failures += 1;
                    tracing::error!(
                        medicine_id = %medicine.id,
                        error = %e,
                        "補藥通知失敗"
                    );
                }
            }
        }
    }

    async fn dispatch(&self, message: &str) -> Result<()> {
        self.bounded("notify.send", self.notifier.send(message))
            .await?
            .map_err(AlertError::from)
    }

    /// 套用 `call_timeout`（未設定則直接等待）
    async fn bounded<F: Future>(&self, operation: &'static str, fut: F) -> Result<F::Output> {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| AlertError::Timeout {
                    operation,
                    timeout: limit,
                }),
            None => Ok(fut.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use med_adapters::{FakeNotifier, FakeStockStore, StoreError};
    use med_core::StockUnit;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 9, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    /// 今天開始、庫存可用 `days` 天的藥品
    fn medicine(id: &str, name: &str, days: i64) -> Medicine {
        Medicine::new(
            id.to_string(),
            name.to_string(),
            Decimal::ONE,
            today(),
            Decimal::from(days),
        )
    }

    fn engine(
        medicines: Vec<Medicine>,
        entries: Vec<StockEntry>,
    ) -> (AlertEngine<FakeStockStore, FakeNotifier>, FakeStockStore, FakeNotifier) {
        let store = FakeStockStore::new(medicines, entries);
        let notifier = FakeNotifier::new();
        let engine = AlertEngine::new(store.clone(), notifier.clone());
        (engine, store, notifier)
    }

    #[tokio::test]
    async fn test_low_stock_alert_sent_once_per_day() {
        let (engine, store, notifier) = engine(vec![medicine("A", "Aspirin", 5)], vec![]);

        let first = engine.run_pass(now()).await.unwrap();
        assert_eq!(first.alerts_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert!(notifier.sent()[0].contains("Aspirin"));
        assert!(notifier.sent()[0].contains("5 day"));
        assert_eq!(store.medicines()[0].last_alerted_date, Some(today()));

        let second = engine.run_pass(now()).await.unwrap();
        assert_eq!(second.alerts_sent, 0);
        assert_eq!(second.alerts_skipped, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_alerted_again_next_day() {
        let (engine, _store, notifier) = engine(vec![medicine("A", "Aspirin", 5)], vec![]);

        engine.run_pass(now()).await.unwrap();
        engine.run_pass(now() + Duration::days(1)).await.unwrap();

        assert_eq!(notifier.sent().len(), 2);
        assert!(notifier.sent()[1].contains("4 day"));
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let (engine, _store, notifier) = engine(
            vec![medicine("TEN", "Ten", 10), medicine("ELEVEN", "Eleven", 11)],
            vec![],
        );

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.medicines_checked, 2);
        assert_eq!(report.alerts_sent, 1);
        assert!(notifier.sent()[0].contains("Ten"));
    }

    #[tokio::test]
    async fn test_skips_never_depleting_and_empty() {
        let mut never = medicine("NEVER", "Never", 5);
        never.daily_dose = Decimal::ZERO;
        let empty = medicine("EMPTY", "Empty", 0);
        let (engine, store, notifier) = engine(vec![never, empty], vec![]);

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report, PassReport::default());
        assert!(notifier.sent().is_empty());
        assert!(store.alert_date_updates().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_isolated() {
        let (engine, store, notifier) = engine(
            vec![medicine("A", "Aspirin", 3), medicine("B", "Biotin", 4)],
            vec![],
        );
        notifier.fail_when_contains("Aspirin");

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.alert_failures, 1);
        assert_eq!(report.alerts_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert!(notifier.sent()[0].contains("Biotin"));
        // 失敗的藥品不寫回，下次會重試
        assert_eq!(store.alert_date_updates(), vec![("B".to_string(), today())]);
        assert_eq!(store.medicines()[0].last_alerted_date, None);
    }

    #[tokio::test]
    async fn test_malformed_dose_does_not_abort_pass() {
        let mut broken = medicine("X", "Broken", 30);
        broken.daily_dose = Decimal::from_i128_with_scale(10_i128.pow(25), 0);
        broken.start_date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let (engine, store, notifier) = engine(vec![broken, medicine("A", "Aspirin", 5)], vec![]);

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert!(notifier.sent()[0].contains("Aspirin"));
        assert_eq!(store.alert_date_updates(), vec![("A".to_string(), today())]);
    }

    #[tokio::test]
    async fn test_marker_failure_counted() {
        let (engine, store, notifier) = engine(vec![medicine("A", "Aspirin", 3)], vec![]);
        store.set_update_failure(Some(StoreError::Request("offline".to_string())));

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(report.marker_failures, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let (engine, store, notifier) = engine(vec![medicine("A", "Aspirin", 3)], vec![]);
        store.set_fetch_failure(Some(StoreError::Request("offline".to_string())));

        let err = engine.run_pass(now()).await.unwrap_err();

        assert!(matches!(err, AlertError::FetchMedicines(_)));
        assert!(err.is_fetch_failure());
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn test_refill_notice_not_deduplicated() {
        let m = medicine("M", "Metformin", 30).with_unit_per_box(Decimal::from(10));
        let entry = StockEntry::new("M".to_string(), Decimal::ONE, StockUnit::Box, now());
        let (engine, _store, notifier) = engine(vec![m], vec![entry]);

        let first = engine.run_pass(now()).await.unwrap();
        let second = engine.run_pass(now()).await.unwrap();

        assert_eq!(first.refills_sent, 1);
        assert_eq!(second.refills_sent, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("10"));
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn test_refills_grouped_in_medicine_order() {
        let at = now();
        let entries = vec![
            StockEntry::new("B".to_string(), Decimal::from(5), StockUnit::Pill, at),
            StockEntry::new("A".to_string(), Decimal::from(2), StockUnit::Pill, at),
            StockEntry::new("B".to_string(), Decimal::from(6), StockUnit::Pill, at),
            StockEntry::new("GHOST".to_string(), Decimal::ONE, StockUnit::Pill, at),
            StockEntry::new("A".to_string(), Decimal::ONE, StockUnit::Pill, at - Duration::days(1)),
        ];
        let (engine, _store, notifier) = engine(
            vec![medicine("A", "Aspirin", 30), medicine("B", "Biotin", 30)],
            entries,
        );

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.refills_sent, 2);
        let sent = notifier.sent();
        assert!(sent[0].contains("Aspirin"));
        assert_eq!(sent[0].matches('•').count(), 1);
        assert!(sent[1].contains("Biotin"));
        assert_eq!(sent[1].matches('•').count(), 2);
    }

    #[tokio::test]
    async fn test_refill_failure_isolated() {
        let at = now();
        let entries = vec![
            StockEntry::new("A".to_string(), Decimal::ONE, StockUnit::Pill, at),
            StockEntry::new("B".to_string(), Decimal::ONE, StockUnit::Pill, at),
        ];
        let (engine, _store, notifier) = engine(
            vec![medicine("A", "Aspirin", 30), medicine("B", "Biotin", 30)],
            entries,
        );
        notifier.fail_when_contains("Aspirin");

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.refill_failures, 1);
        assert_eq!(report.refills_sent, 1);
        assert!(notifier.sent()[0].contains("Biotin"));
    }

    #[tokio::test]
    async fn test_future_refill_not_counted_nor_announced() {
        let entry = StockEntry::new(
            "A".to_string(),
            Decimal::from(100),
            StockUnit::Pill,
            now() + Duration::days(1),
        );
        let (engine, _store, notifier) = engine(vec![medicine("A", "Aspirin", 5)], vec![entry]);

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(report.refills_sent, 0);
        assert_eq!(notifier.sent().len(), 1);
    }

    /// 永遠不回應的通知管道
    #[derive(Clone)]
    struct HangingNotifier;

    #[async_trait::async_trait]
    impl Notifier for HangingNotifier {
        async fn send(&self, _message: &str) -> std::result::Result<(), med_adapters::NotifyError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_isolates_hung_send() {
        let store = FakeStockStore::new(vec![medicine("A", "Aspirin", 3)], vec![]);
        let engine = AlertEngine::new(store.clone(), HangingNotifier).with_config(
            AlertConfig::new().with_call_timeout(std::time::Duration::from_secs(5)),
        );

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.alert_failures, 1);
        assert_eq!(report.alerts_sent, 0);
        assert!(store.alert_date_updates().is_empty());
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let (engine, _store, notifier) = engine(vec![medicine("A", "Aspirin", 5)], vec![]);
        let engine = engine.with_config(AlertConfig::new().with_threshold_days(3));

        let report = engine.run_pass(now()).await.unwrap();

        assert_eq!(report.medicines_checked, 1);
        assert_eq!(report.alerts_sent, 0);
        assert!(notifier.sent().is_empty());
    }
}
