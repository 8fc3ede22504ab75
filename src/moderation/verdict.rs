//! 模型输出 -> 审核标记
//!
//! 模型被要求只回答一个词（hate / spam / benign），
//! 这里用整词匹配把自由文本映射成两个二值标记。

use regex::Regex;
use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::OnceLock;

/// 二值审核标记，序列化为 `0` 或 `1`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flag {
    #[default]
    Clear,
    Set,
}

impl Flag {
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Flag::Set
        } else {
            Flag::Clear
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Flag::Clear => 0,
            Flag::Set => 1,
        }
    }

    pub fn is_set(self) -> bool {
        self == Flag::Set
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Flag::Clear),
            1 => Ok(Flag::Set),
            other => Err(de::Error::invalid_value(
                Unexpected::Unsigned(other.into()),
                &"0 or 1",
            )),
        }
    }
}

/// 审核结果（`POST /classify` 的响应体）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub hate: Flag,
    pub spam: Flag,
}

struct Keywords {
    hate: Regex,
    spam: Regex,
    benign: Regex,
}

static KEYWORDS: OnceLock<Keywords> = OnceLock::new();

fn keywords() -> &'static Keywords {
    KEYWORDS.get_or_init(|| Keywords {
        hate: Regex::new(r"\bhate\b").expect("valid hate pattern"),
        spam: Regex::new(r"\bspam\b").expect("valid spam pattern"),
        benign: Regex::new(r"\bbenign\b").expect("valid benign pattern"),
    })
}

/// 把模型原始输出映射成审核结果
///
/// 规则：
/// - 输出里有独立的 `hate` 一词 -> hate=1
/// - 输出里有独立的 `spam` 一词 -> spam=1
/// - 其他情况（包括 `benign`、空输出）-> 全 0
///
/// 匹配前先去掉首尾空白并转小写。对任意输入都返回合法结果。
pub fn classify_output(output: &str) -> Verdict {
    let normalized = output.trim().to_lowercase();
    let keywords = keywords();

    let verdict = Verdict {
        hate: Flag::from_match(keywords.hate.is_match(&normalized)),
        spam: Flag::from_match(keywords.spam.is_match(&normalized)),
    };

    if !verdict.hate.is_set() && !verdict.spam.is_set() {
        // benign 只记录，不影响结果
        let benign = keywords.benign.is_match(&normalized);
        tracing::debug!(benign, "no moderation keyword in model output");
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLEAR: Verdict = Verdict {
        hate: Flag::Clear,
        spam: Flag::Clear,
    };

    #[test]
    fn hate_only() {
        let verdict = classify_output("hate");
        assert_eq!(verdict.hate, Flag::Set);
        assert_eq!(verdict.spam, Flag::Clear);
    }

    #[test]
    fn spam_only() {
        assert_eq!(
            classify_output("  Spam.\n"),
            Verdict {
                hate: Flag::Clear,
                spam: Flag::Set
            }
        );
    }

    #[test]
    fn both_flags_can_be_set() {
        assert_eq!(
            classify_output("HATE, spam"),
            Verdict {
                hate: Flag::Set,
                spam: Flag::Set
            }
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(classify_output("Label: HaTe").hate.is_set());
        assert!(classify_output("SPAM").spam.is_set());
    }

    #[test]
    fn partial_words_do_not_match() {
        assert_eq!(classify_output("hateful content"), CLEAR);
        assert_eq!(classify_output("spammer"), CLEAR);
        assert_eq!(classify_output("antispam"), CLEAR);
        assert_eq!(classify_output("hate_speech"), CLEAR);
    }

    #[test]
    fn empty_and_benign_are_clear() {
        assert_eq!(classify_output(""), CLEAR);
        assert_eq!(classify_output("   \n\t"), CLEAR);
        assert_eq!(classify_output("benign"), CLEAR);
        assert_eq!(classify_output("Benign."), CLEAR);
        assert_eq!(classify_output("unrelated words"), CLEAR);
    }

    #[test]
    fn serializes_flags_as_integers() {
        let verdict = classify_output("hate");
        assert_eq!(
            serde_json::to_value(verdict).unwrap(),
            json!({"hate": 1, "spam": 0})
        );
    }

    #[test]
    fn rejects_out_of_range_flags() {
        assert!(serde_json::from_value::<Verdict>(json!({"hate": 2, "spam": 0})).is_err());
        assert!(serde_json::from_value::<Verdict>(json!({"hate": null, "spam": 0})).is_err());

        let verdict: Verdict = serde_json::from_value(json!({"hate": 0, "spam": 1})).unwrap();
        assert_eq!(verdict.spam, Flag::Set);
    }
}
