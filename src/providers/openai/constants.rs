//! OpenAI 配置常量

/// Responses API 路径（拼接在 base URL 之后）
pub const RESPONSES_PATH: &str = "/responses";

/// 输出内容块类型
pub const OUTPUT_ITEM_MESSAGE: &str = "message";
pub const CONTENT_OUTPUT_TEXT: &str = "output_text";
