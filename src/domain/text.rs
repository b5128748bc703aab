//! 文本工具
//!
//! 所有长度均按 Unicode 字符计算（日文正文不能按字节截断）

/// 截断后追加的省略标记
pub const OMISSION_MARKER: &str = "\n\n（...以下省略）";

/// 截断结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated<'a> {
    /// 实际发送给模型的部分
    pub sent: &'a str,
    /// 未发送的剩余部分（未截断时为空）
    pub rest: &'a str,
}

impl<'a> Truncated<'a> {
    pub fn is_truncated(&self) -> bool {
        !self.rest.is_empty()
    }

    /// 用于拼接提示词的文本（截断时带省略标记）
    pub fn for_prompt(&self) -> String {
        if self.is_truncated() {
            format!("{}{}", self.sent, OMISSION_MARKER)
        } else {
            self.sent.to_string()
        }
    }
}

/// 去掉模型回显的省略标记
pub fn strip_omission_marker(text: &str) -> String {
    let marker = OMISSION_MARKER.trim();
    if !text.contains(marker) {
        return text.to_string();
    }
    text.replace(marker, "").trim_end().to_string()
}

/// 字符数
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 按字符数截断
pub fn truncate_chars(text: &str, limit: usize) -> Truncated<'_> {
    let split = byte_offset(text, limit);
    Truncated {
        sent: &text[..split],
        rest: &text[split..],
    }
}

/// 前 n 个字符
pub fn head_chars(text: &str, n: usize) -> &str {
    &text[..byte_offset(text, n)]
}

/// 后 n 个字符
pub fn tail_chars(text: &str, n: usize) -> &str {
    let total = char_len(text);
    if total <= n {
        return text;
    }
    &text[byte_offset(text, total - n)..]
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        let t = truncate_chars("短い文章", 10);
        assert_eq!(t.sent, "短い文章");
        assert!(!t.is_truncated());
        assert_eq!(t.for_prompt(), "短い文章");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let t = truncate_chars("あいうえおかきくけこ", 4);
        assert_eq!(t.sent, "あいうえ");
        assert_eq!(t.rest, "おかきくけこ");
        assert_eq!(t.for_prompt(), format!("あいうえ{}", OMISSION_MARKER));
    }

    #[test]
    fn test_strip_echoed_omission_marker() {
        let t = truncate_chars("あいうえおかきくけこ", 4);
        assert_eq!(strip_omission_marker(&t.for_prompt()), "あいうえ");
        assert_eq!(strip_omission_marker("本文\n"), "本文\n");
    }

    #[test]
    fn test_head_and_tail() {
        assert_eq!(head_chars("日本語テキスト", 3), "日本語");
        assert_eq!(tail_chars("日本語テキスト", 4), "テキスト");
        assert_eq!(tail_chars("abc", 10), "abc");
    }
}
