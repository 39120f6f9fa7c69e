//! 图片内嵌编码

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// 标准 base64 编码
pub fn encode_image(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// 生成可直接放入 `<img src>` 的 PNG data URI
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", encode_image(bytes))
}
