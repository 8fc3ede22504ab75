//! 输入文本截断

/// 转发给模型前允许的最大字符数
pub const MAX_INPUT_CHARS: usize = 1000;

/// 按字符数截断文本
///
/// 长度不超过 `limit` 时原样返回，否则返回前 `limit` 个字符。
/// 按 Unicode 字符计数而不是字节，不会切断多字节字符。
#[inline]
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
