//! 数据到页面的处理管线
//!
//! 读取 → 规范化 → 窗口 → 表格 → 图表 → 编码 → 页面

pub mod chart;          // 图表渲染
pub mod encoder;        // 图片编码
pub mod normalizer;     // 序列规范化
pub mod page;           // 页面组装
pub mod source_reader;  // 数据源读取
pub mod store;          // 序列持有者
pub mod table;          // 表格渲染
pub mod window;         // 窗口选择
