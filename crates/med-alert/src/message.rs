//! 通知訊息組成（Telegram MarkdownV2）
//!
//! 只有動態內容（藥名、日期、數字）需要跳脫，格式標記保持原樣。

use chrono::NaiveDate;
use med_calc::ForecastRow;
use med_core::{Medicine, StockEntry};
use rust_decimal::Decimal;

use med_core::fields::DATE_FORMAT;

/// MarkdownV2 的保留字元
const RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// 預測表的藥名欄寬
const NAME_COLUMN_WIDTH: usize = 22;

/// 跳脫 MarkdownV2 保留字元
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 程式碼區塊內只需跳脫 ` 與 \
fn escape_code(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '`' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 低庫存提醒
pub fn low_stock_message(
    name: &str,
    days_left: i64,
    forecast_date: NaiveDate,
    stock: Decimal,
) -> String {
    format!(
        "⚠️ *{}* will run out in {} day\\(s\\)\\!\nRefill before *{}*\nCurrently: *{}* pills left\\.",
        escape_markdown(name),
        escape_markdown(&days_left.to_string()),
        escape_markdown(&format_date(forecast_date)),
        escape_markdown(&format!("{stock:.2}")),
    )
}

/// 補藥通知，每筆記錄一行並附上換算後的顆數
pub fn refill_message(medicine: &Medicine, entries: &[&StockEntry]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .map(|e| {
            let pills = medicine.to_pills(e.quantity, e.unit);
            format!(
                "• {} {} \\= {} pills on {}",
                escape_markdown(&e.quantity.normalize().to_string()),
                escape_markdown(e.unit.as_str()),
                escape_markdown(&pills.normalize().to_string()),
                escape_markdown(&format_date(e.date.date_naive())),
            )
        })
        .collect();

    format!(
        "✅ *Refill recorded for {}*\n{}",
        escape_markdown(&medicine.name),
        lines.join("\n")
    )
}

/// 斷藥預測總表
pub fn forecast_message(rows: &[ForecastRow]) -> String {
    if rows.is_empty() {
        return "✅ All medicines are well stocked\\.".to_string();
    }

    let table: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{:<width$} → {}",
                escape_code(&row.name),
                format_date(row.forecast_date),
                width = NAME_COLUMN_WIDTH
            )
        })
        .collect();

    format!(
        "*Out\\-of\\-Stock Forecast*\n\n```text\n{}\n```",
        table.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use med_core::StockUnit;
    use rstest::rstest;

    #[rstest]
    #[case("a_b", "a\\_b")]
    #[case("(test)", "\\(test\\)")]
    #[case("dash - dash", "dash \\- dash")]
    #[case("Vitamin D3 1.000 IU!", "Vitamin D3 1\\.000 IU\\!")]
    #[case("plain", "plain")]
    #[case("back\\slash", "back\\\\slash")]
    fn test_escape_markdown(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_markdown(input), expected);
    }

    #[test]
    fn test_low_stock_message_content() {
        let msg = low_stock_message(
            "Aspirin",
            5,
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Decimal::from(5),
        );

        assert!(msg.contains("*Aspirin*"));
        assert!(msg.contains("will run out in 5 day\\(s\\)"));
        assert!(msg.contains("2025\\-06\\-10"));
        assert!(msg.contains("*5\\.00* pills left"));
    }

    #[test]
    fn test_low_stock_message_escapes_name() {
        let msg = low_stock_message(
            "Co-Amoxiclav (500mg)",
            1,
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            Decimal::new(150, 2),
        );

        assert!(msg.contains("Co\\-Amoxiclav \\(500mg\\)"));
        assert!(msg.contains("1\\.50"));
    }

    #[test]
    fn test_refill_message_converts_boxes() {
        let medicine = Medicine::new(
            "M".to_string(),
            "Metformin".to_string(),
            Decimal::ONE,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            Decimal::from(30),
        )
        .with_unit_per_box(Decimal::from(10));
        let date = Utc.with_ymd_and_hms(2025, 6, 4, 8, 0, 0).unwrap();
        let boxes = StockEntry::new("M".to_string(), Decimal::ONE, StockUnit::Box, date);
        let pills = StockEntry::new("M".to_string(), Decimal::from(7), StockUnit::Pill, date);

        let msg = refill_message(&medicine, &[&boxes, &pills]);

        assert!(msg.starts_with("✅ *Refill recorded for Metformin*"));
        assert!(msg.contains("• 1 box \\= 10 pills on 2025\\-06\\-04"));
        assert!(msg.contains("• 7 pill \\= 7 pills on 2025\\-06\\-04"));
    }

    #[test]
    fn test_forecast_message_table() {
        let rows = vec![ForecastRow {
            medicine_id: "A".to_string(),
            name: "Aspirin".to_string(),
            current_stock: Decimal::from(5),
            forecast_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            needs_update: false,
        }];

        let msg = forecast_message(&rows);

        assert!(msg.starts_with("*Out\\-of\\-Stock Forecast*"));
        assert!(msg.contains("```text\nAspirin                → 2025-06-15\n```"));
    }

    #[test]
    fn test_forecast_message_empty() {
        assert_eq!(forecast_message(&[]), "✅ All medicines are well stocked\\.");
    }
}
