//! 价格序列模型
//!
//! 原始行 → 规范化行 → 序列 → 窗口

use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;

/// 必需的日期列名
pub const DATE_COLUMN: &str = "date";
/// 必需的收盘价列名
pub const CLOSE_COLUMN: &str = "close";

/// 原始行：列名到未类型化文本值的映射，仅在加载期间存在
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    /// 源文件中的行号（表头为第 1 行）
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// 读取层输出的原始表
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// 数据源不可用时返回的空表
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// 规范化后的一行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRow {
    /// 日期时间
    pub date: NaiveDateTime,
    /// 收盘价（保证为有限值）
    pub close: f64,
}

impl SeriesRow {
    /// 日期的展示文本：零点时只显示日期
    pub fn date_label(&self) -> String {
        if self.date.time().num_seconds_from_midnight() == 0 {
            self.date.format("%Y-%m-%d").to_string()
        } else {
            self.date.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }
}

/// 完整的规范化序列，加载后只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    rows: Vec<SeriesRow>,
}

impl Series {
    pub fn new(rows: Vec<SeriesRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 最后 n 行，保持原有顺序
    pub fn tail(&self, n: usize) -> Window<'_> {
        let start = self.rows.len().saturating_sub(n);
        Window {
            rows: &self.rows[start..],
        }
    }
}

/// 序列末尾若干行的只读视图
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    rows: &'a [SeriesRow],
}

impl<'a> Window<'a> {
    pub fn rows(&self) -> &'a [SeriesRow] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 最终输出的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
}

impl RenderedPage {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    pub fn into_html(self) -> String {
        self.html
    }
}
