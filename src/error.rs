//! 管线错误类型

use thiserror::Error;

/// 数据加载与页面渲染过程中的错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 数据文件不存在或无法读取（在读取层被恢复为空表）
    #[error("数据源不可用 '{path}': {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// 表头缺少必需列（在读取层被恢复为空表）
    #[error("缺少必需列 '{column}'")]
    MissingColumn { column: &'static str },

    /// 单行解析失败（在规范化层被丢弃）
    #[error("第 {line} 行解析失败: {reason}")]
    RowParse { line: usize, reason: String },

    /// 表格或图表渲染失败，按请求级致命错误处理
    #[error("渲染失败: {0}")]
    Render(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
