//! Token 计数（路由层使用）
//!
//! TokenCounter 可插拔；默认的 SegmentingCounter 对 CJK 文本使用 jieba 分词，英文按约 4 字符/token 估算。
//! 计数器失败时 count_tokens 退化为按空白分词的词数，而不是让路由决策失败。

use std::sync::OnceLock;

use jieba_rs::Jieba;
use thiserror::Error;

/// 全局 Jieba 实例（延迟初始化）
static JIEBA: OnceLock<Jieba> = OnceLock::new();

fn get_jieba() -> &'static Jieba {
    JIEBA.get_or_init(Jieba::new)
}

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Tokenizer unavailable: {0}")]
    Unavailable(String),
}

/// Token 计数器
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// 判断字符是否为 CJK（中日韩）字符
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |   // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |   // CJK Unified Ideographs Extension A
        '\u{F900}'..='\u{FAFF}' |   // CJK Compatibility Ideographs
        '\u{3040}'..='\u{309F}' |   // Hiragana
        '\u{30A0}'..='\u{30FF}'     // Katakana
    )
}

/// 判断文本是否包含 CJK 字符
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// 默认计数器：CJK 片段按 jieba 分词计数，其余单词按 4 字符/token 估算（每词至少 1）
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentingCounter;

impl TokenCounter for SegmentingCounter {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        let mut tokens = 0;
        for word in text.split_whitespace() {
            if contains_cjk(word) {
                tokens += get_jieba()
                    .cut(word, false)
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .count();
            } else {
                tokens += word.chars().count().div_ceil(4).max(1);
            }
        }
        Ok(tokens)
    }
}

/// 兜底计数器：空白分词的词数
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(word_count(text))
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 用给定计数器计数，失败时退化为词数
pub fn count_tokens(counter: &dyn TokenCounter, text: &str) -> usize {
    match counter.count(text) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("Token counting failed ({}), falling back to word count", e);
            word_count(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenCounter;

    impl TokenCounter for BrokenCounter {
        fn count(&self, _text: &str) -> Result<usize, TokenizerError> {
            Err(TokenizerError::Unavailable("model file missing".into()))
        }
    }

    #[test]
    fn test_whitespace_counter() {
        assert_eq!(WhitespaceCounter.count("list all  published\nattractions").unwrap(), 4);
        assert_eq!(WhitespaceCounter.count("   ").unwrap(), 0);
    }

    #[test]
    fn test_segmenting_counter_english() {
        // "summarize" 9 字符 -> 3；"it" -> 1
        assert_eq!(SegmentingCounter.count("summarize it").unwrap(), 4);
    }

    #[test]
    fn test_segmenting_counter_chinese() {
        let n = SegmentingCounter.count("我喜欢编程和人工智能").unwrap();
        assert!(n >= 3, "jieba should split the sentence into several words, got {n}");
    }

    #[test]
    fn test_fallback_to_word_count() {
        assert_eq!(count_tokens(&BrokenCounter, "one two three"), 3);
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("Hello 世界"));
        assert!(!contains_cjk("Hello World"));
    }
}
