//! 表格渲染
//!
//! 输出与 dataframe `to_html(index=False)` 相同结构的 HTML 表格

use std::fmt::Write;

use crate::models::{Window, CLOSE_COLUMN, DATE_COLUMN};

/// 将窗口渲染为 HTML 表格片段；空窗口只输出表头
pub fn render_table(window: &Window<'_>) -> String {
    if window.is_empty() {
        log::debug!("窗口为空，只输出表头");
    }

    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"dataframe\">\n");
    html.push_str("  <thead>\n");
    html.push_str("    <tr style=\"text-align: right;\">\n");
    let _ = writeln!(html, "      <th>{}</th>", DATE_COLUMN);
    let _ = writeln!(html, "      <th>{}</th>", CLOSE_COLUMN);
    html.push_str("    </tr>\n");
    html.push_str("  </thead>\n");
    html.push_str("  <tbody>\n");

    for row in window.rows() {
        html.push_str("    <tr>\n");
        let _ = writeln!(html, "      <td>{}</td>", escape_html(&row.date_label()));
        let _ = writeln!(html, "      <td>{}</td>", row.close);
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n");
    html.push_str("</table>");
    html
}

/// 转义 HTML 特殊字符
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
