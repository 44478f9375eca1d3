//! 分攤月報表彙總

use std::collections::{BTreeMap, BTreeSet};

use med_core::{ContributorAmount, FinancialEntry, MonthlyFinancialReport, NeedReportBlock};
use rust_decimal::Decimal;

/// 月報表計算器
pub struct FinancialReportCalculator;

impl FinancialReportCalculator {
    /// 依支出項目與出資人彙總
    ///
    /// 每個項目都列出全部出資人（沒出資的補 0），出資人依名稱排序。
    pub fn aggregate(year: i32, month: u32, entries: &[FinancialEntry]) -> MonthlyFinancialReport {
        let mut breakdown: BTreeMap<String, BTreeMap<&str, Decimal>> = BTreeMap::new();
        let mut need_amounts: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut contributor_totals: BTreeMap<&str, Decimal> = BTreeMap::new();
        let mut total = Decimal::ZERO;

        for entry in entries {
            let key = entry.need_key();
            need_amounts.entry(key.clone()).or_insert(entry.need_amount);
            *breakdown
                .entry(key)
                .or_default()
                .entry(entry.contributor.as_str())
                .or_insert(Decimal::ZERO) += entry.amount_contributed;
            *contributor_totals
                .entry(entry.contributor.as_str())
                .or_insert(Decimal::ZERO) += entry.amount_contributed;
            total += entry.amount_contributed;
        }

        let names: BTreeSet<&str> = contributor_totals.keys().copied().collect();

        let needs = breakdown
            .into_iter()
            .map(|(need, amounts)| {
                let contributors: Vec<ContributorAmount> = names
                    .iter()
                    .map(|name| ContributorAmount {
                        name: name.to_string(),
                        amount: amounts.get(name).copied().unwrap_or(Decimal::ZERO),
                    })
                    .collect();
                let need_total = contributors.iter().map(|c| c.amount).sum();

                NeedReportBlock {
                    need_amount: need_amounts.get(&need).copied().unwrap_or(Decimal::ZERO),
                    need,
                    contributors,
                    total: need_total,
                }
            })
            .collect();

        let contributors = contributor_totals
            .into_iter()
            .map(|(name, amount)| ContributorAmount {
                name: name.to_string(),
                amount,
            })
            .collect();

        tracing::debug!(year, month, entries = entries.len(), %total, "分攤月報表彙總完成");

        MonthlyFinancialReport {
            year,
            month,
            needs,
            contributors,
            total,
        }
    }
}
