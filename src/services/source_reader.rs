//! 数据源读取
//!
//! 将 CSV 文件整体读入内存并解析为原始表。失败时返回空表并记录警告，
//! 不会把错误抛给调用方。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{RawRecord, RawTable, CLOSE_COLUMN, DATE_COLUMN};

/// 读取选项
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// 字段分隔符
    pub delimiter: char,
    /// 文件编码标签
    pub encoding: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            encoding: "utf-8".to_string(),
        }
    }
}

/// 读取数据源；不可用时返回空表
pub fn load_source(path: &Path, options: &SourceOptions) -> RawTable {
    match read_source(path, options) {
        Ok(table) => {
            log::info!("加载数据文件 {} 成功，共 {} 行", path.display(), table.len());
            log::debug!("列: {:?}", table.headers);
            if table.is_empty() {
                log::warn!("数据文件 {} 只有表头，没有数据行", path.display());
            }
            table
        }
        Err(e) => {
            log::warn!("{}，按无数据处理", e);
            RawTable::empty()
        }
    }
}

/// 读取并解析数据文件，整体成功或整体失败
pub fn read_source(path: &Path, options: &SourceOptions) -> PipelineResult<RawTable> {
    let unavailable = |reason: String| PipelineError::SourceUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let bytes = fs::read(path).map_err(|e| unavailable(e.to_string()))?;
    let text = decode(&bytes, &options.encoding);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter_byte(options.delimiter))
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unavailable(format!("读取表头失败: {}", e)))?
        .iter()
        .map(normalize_header)
        .collect();

    for column in [DATE_COLUMN, CLOSE_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::MissingColumn { column });
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // 表头占第 1 行
        let line = idx + 2;
        let record = result.map_err(|e| unavailable(format!("第 {} 行 CSV 结构错误: {}", line, e)))?;

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        records.push(RawRecord { line, fields });
    }

    Ok(RawTable { headers, records })
}

/// 按配置的编码解码；UTF-8 BOM 会被去除
fn decode(bytes: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
        log::warn!("未知编码 '{}'，使用 UTF-8", label);
        UTF_8
    });
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("使用 {} 解码时存在无法识别的字节", actual.name());
    }
    text.into_owned()
}

fn delimiter_byte(delimiter: char) -> u8 {
    if delimiter.is_ascii() {
        delimiter as u8
    } else {
        log::warn!("分隔符 '{}' 不是 ASCII 字符，使用 ','", delimiter);
        b','
    }
}

fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}
