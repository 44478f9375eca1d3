//! 儲存端欄位格式
//!
//! 遠端資料表的日期欄位可能是 `YYYY-MM-DD` 或 RFC 3339，
//! 關聯欄位可能是單一字串或字串陣列。

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::MedError;

/// 日期輸出格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析日期（接受 `YYYY-MM-DD` 或 RFC 3339）
pub fn parse_date(raw: &str) -> crate::Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| MedError::InvalidDate(raw.to_string()))
}

/// 解析時間點（純日期視為當天 UTC 零時）
pub fn parse_datetime(raw: &str) -> crate::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(start_of_day(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MedError::InvalidDate(raw.to_string()))
}

/// 當天 UTC 零時
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `NaiveDate` 欄位
pub mod flexible_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// `Option<NaiveDate>` 欄位（空字串視為未設定）
pub mod optional_flexible_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => {
                parse_date(&raw).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

/// `DateTime<Utc>` 欄位，零時輸出為純日期
pub mod flexible_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if value.time() == NaiveTime::MIN {
            serializer.collect_str(&value.format(DATE_FORMAT))
        } else {
            serializer.serialize_str(&value.to_rfc3339())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).map_err(serde::de::Error::custom)
    }
}

/// 關聯欄位：`"rec1"` 或 `["rec1", ...]`，取第一個
pub mod linked_id {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Linked {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Linked::deserialize(deserializer)? {
            Linked::One(id) => Ok(id),
            Linked::Many(ids) => ids
                .into_iter()
                .next()
                .ok_or_else(|| serde::de::Error::custom("關聯欄位為空")),
        }
    }
}
