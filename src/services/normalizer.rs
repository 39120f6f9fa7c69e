//! 序列规范化
//!
//! 将原始表投影为 date/close 两列，逐行解析。解析失败的行被丢弃，
//! 只在日志中体现。

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{RawRecord, RawTable, Series, SeriesRow, CLOSE_COLUMN, DATE_COLUMN};

/// 支持的日期时间格式
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// 支持的纯日期格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 规范化原始表
///
/// # 参数
/// - table: 读取层输出的原始表
/// - sort_by_date: 为 true 时按日期稳定排序，否则保持文件顺序
pub fn normalize(table: &RawTable, sort_by_date: bool) -> Series {
    let mut rows = Vec::with_capacity(table.len());
    let mut dropped = 0usize;

    for record in &table.records {
        match parse_record(record) {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::debug!("丢弃数据行: {}", e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::warn!("共丢弃 {} 行无法解析的数据，保留 {} 行", dropped, rows.len());
    }

    if sort_by_date {
        rows.sort_by_key(|row| row.date);
    } else if let Some(pos) = rows.windows(2).position(|w| w[1].date < w[0].date) {
        log::warn!(
            "数据未按日期升序排列（{} 之后出现 {}），保持文件顺序",
            rows[pos].date_label(),
            rows[pos + 1].date_label()
        );
    }

    Series::new(rows)
}

/// 将单个原始行转换为规范化行
pub fn parse_record(record: &RawRecord) -> PipelineResult<SeriesRow> {
    let row_error = |reason: String| PipelineError::RowParse {
        line: record.line,
        reason,
    };

    let date_text = record
        .get(DATE_COLUMN)
        .ok_or_else(|| row_error("缺少 date 字段".to_string()))?;
    let close_text = record
        .get(CLOSE_COLUMN)
        .ok_or_else(|| row_error("缺少 close 字段".to_string()))?;

    let date = parse_date(date_text).ok_or_else(|| row_error(format!("无法解析日期 '{}'", date_text)))?;
    let close = parse_close(close_text).ok_or_else(|| row_error(format!("无法解析收盘价 '{}'", close_text)))?;

    Ok(SeriesRow { date, close })
}

/// 解析日期或日期时间
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 解析收盘价，拒绝 NaN 与无穷大
pub fn parse_close(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(line: usize, date: &str, close: &str) -> RawRecord {
        let mut fields = HashMap::new();
        fields.insert("date".to_string(), date.to_string());
        fields.insert("close".to_string(), close.to_string());
        RawRecord { line, fields }
    }

    fn table(rows: &[(&str, &str)]) -> RawTable {
        RawTable {
            headers: vec!["date".to_string(), "close".to_string()],
            records: rows
                .iter()
                .enumerate()
                .map(|(i, (d, c))| record(i + 2, d, c))
                .collect(),
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        for input in ["2024-03-05", "2024/03/05", "20240305", " 2024-03-05 "] {
            assert_eq!(parse_date(input), Some(expected), "{}", input);
        }

        let with_time = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(parse_date("2024-03-05 09:30:00"), Some(with_time));
        assert_eq!(parse_date("2024-03-05T09:30:00"), Some(with_time));
        assert_eq!(parse_date("2024-03-05 09:30"), Some(with_time));
        assert_eq!(parse_date("2024-03-05T18:30:00+09:00"), Some(with_time));

        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_parse_close() {
        assert_eq!(parse_close("151.234"), Some(151.234));
        assert_eq!(parse_close(" -0.5 "), Some(-0.5));
        assert_eq!(parse_close("N/A"), None);
        assert_eq!(parse_close(""), None);
        assert_eq!(parse_close("NaN"), None);
        assert_eq!(parse_close("inf"), None);
    }

    #[test]
    fn test_unparseable_close_is_dropped() {
        let raw = table(&[
            ("2024-01-01", "140.0"),
            ("2024-01-02", "N/A"),
            ("2024-01-03", "142.0"),
        ]);
        let series = normalize(&raw, false);

        assert_eq!(series.len(), 2);
        assert_eq!(series.rows()[0].close, 140.0);
        assert_eq!(series.rows()[1].close, 142.0);
    }

    #[test]
    fn test_bad_date_and_missing_field_are_dropped() {
        let mut raw = table(&[("not-a-date", "140.0"), ("2024-01-02", "141.0")]);
        raw.records.push(RawRecord {
            line: 4,
            fields: HashMap::from([("date".to_string(), "2024-01-03".to_string())]),
        });

        let series = normalize(&raw, false);
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].date_label(), "2024-01-02");

        let err = parse_record(&raw.records[2]).unwrap_err();
        assert!(matches!(err, PipelineError::RowParse { line: 4, .. }));
    }

    #[test]
    fn test_input_order_kept_unless_sorting() {
        let raw = table(&[
            ("2024-01-03", "3.0"),
            ("2024-01-01", "1.0"),
            ("2024-01-02", "2.0"),
        ]);

        let kept = normalize(&raw, false);
        let closes: Vec<f64> = kept.rows().iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![3.0, 1.0, 2.0]);

        let sorted = normalize(&raw, true);
        let closes: Vec<f64> = sorted.rows().iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_table() {
        assert!(normalize(&RawTable::empty(), false).is_empty());
    }
}
