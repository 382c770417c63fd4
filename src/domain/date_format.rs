use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 日付が指定されていない場合の表示
pub const NOT_SPECIFIED: &str = "Not specified";

/// 日付を表示用の長い形式に変換する（例: "June 1, 2024"）
///
/// UTCの暦日で表示する。`None`の場合は"Not specified"を返す。
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// 期間を"{開始} to {終了}"形式で表示する
pub fn format_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    format!("{} to {}", format_date(start), format_date(end))
}

/// 予約・検索レスポンスに付与する表示用の日付ラベル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateLabels {
    pub book_date: String,
    pub purchase_date: String,
    pub date_range: String,
}

impl DateLabels {
    pub fn new(book_date: DateTime<Utc>, purchase_date: DateTime<Utc>) -> Self {
        Self {
            book_date: format_date(Some(book_date)),
            purchase_date: format_date(Some(purchase_date)),
            date_range: format_range(Some(book_date), Some(purchase_date)),
        }
    }
}
