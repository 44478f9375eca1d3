//! 家庭分攤款項模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單筆分攤記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialEntry {
    /// 記錄ID
    #[serde(rename = "id", default)]
    pub id: String,

    /// 日期
    #[serde(with = "crate::fields::flexible_date")]
    pub date: NaiveDate,

    /// 支出項目
    pub need_label: String,

    /// 項目金額
    #[serde(default)]
    pub need_amount: Decimal,

    /// 分攤金額
    pub amount_contributed: Decimal,

    /// 月份標籤（YYYY-MM）
    #[serde(default)]
    pub month_tag: String,

    /// 出資人
    pub contributor: String,
}

impl FinancialEntry {
    /// 創建新的分攤記錄
    pub fn new(
        date: NaiveDate,
        need_label: String,
        contributor: String,
        amount_contributed: Decimal,
    ) -> Self {
        Self {
            id: String::new(),
            month_tag: date.format("%Y-%m").to_string(),
            date,
            need_label,
            need_amount: Decimal::ZERO,
            amount_contributed,
            contributor,
        }
    }

    /// 建構器模式：設置項目金額
    pub fn with_need_amount(mut self, need_amount: Decimal) -> Self {
        self.need_amount = need_amount;
        self
    }

    /// 報表分組鍵：`YYYY-MM-DD 項目`
    pub fn need_key(&self) -> String {
        format!("{} {}", self.date.format(crate::fields::DATE_FORMAT), self.need_label)
    }
}

/// 出資人金額
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorAmount {
    pub name: String,
    pub amount: Decimal,
}

/// 單一支出項目的分攤明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedReportBlock {
    pub need: String,
    pub need_amount: Decimal,
    pub contributors: Vec<ContributorAmount>,
    pub total: Decimal,
}

/// 月報表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFinancialReport {
    pub year: i32,
    pub month: u32,
    pub needs: Vec<NeedReportBlock>,
    pub contributors: Vec<ContributorAmount>,
    pub total: Decimal,
}

impl MonthlyFinancialReport {
    /// 創建空的月報表
    pub fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            needs: Vec::new(),
            contributors: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_entry() {
        let entry = FinancialEntry::new(
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            "Pharmacy".to_string(),
            "Alice".to_string(),
            Decimal::from(40),
        )
        .with_need_amount(Decimal::from(100));

        assert_eq!(entry.month_tag, "2025-06");
        assert_eq!(entry.need_key(), "2025-06-05 Pharmacy");
        assert_eq!(entry.need_amount, Decimal::from(100));
    }

    #[test]
    fn test_deserialize_storage_record() {
        let json = r#"{
            "id": "recF1",
            "Date": "2025-06-05T00:00:00.000Z",
            "NeedLabel": "Rent",
            "NeedAmount": 500,
            "AmountContributed": 250.5,
            "MonthTag": "2025-06",
            "Contributor": "Bob"
        }"#;

        let entry: FinancialEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.id, "recF1");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        assert_eq!(entry.amount_contributed, Decimal::new(2505, 1));
        assert_eq!(entry.contributor, "Bob");
    }

    #[test]
    fn test_empty_report() {
        let report = MonthlyFinancialReport::empty(2025, 6);
        assert!(report.needs.is_empty());
        assert_eq!(report.total, Decimal::ZERO);
    }
}
