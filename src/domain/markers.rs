//! 标记记号
//!
//! 改写类任务通过检查这些固定字面量是否出现来判断模型是否真的完成了插入。

use once_cell::sync::Lazy;
use regex::Regex;

/// 内部链接引用前缀（全角冒号）
pub const INTERNAL_LINK_PREFIX: &str = "参考記事：";

/// 内部链接引用前缀（半角冒号，模型偶尔输出）
pub const INTERNAL_LINK_PREFIX_ASCII: &str = "参考記事:";

/// 销售文案占位符
pub const SALES_PLACEHOLDER: &str = "※ここにセールス文を書く";

/// 列表 / 表格包裹标签
pub const BOX_OPEN: &str = "<ボックス>";
pub const BOX_CLOSE: &str = "</ボックス>";

/// 一篇文章中销售占位符的上限
pub const MAX_SALES_PLACEHOLDERS: usize = 2;

static CITATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"参考記事[:：][^\n]*?[(（]https?://[^)）\s]*[)）]|参考記事[:：][^\n]*").unwrap()
});

/// 是否包含内部链接引用
pub fn has_internal_link(text: &str) -> bool {
    text.contains(INTERNAL_LINK_PREFIX) || text.contains(INTERNAL_LINK_PREFIX_ASCII)
}

/// 移除内部链接引用片段
pub fn strip_citations(text: &str) -> String {
    CITATION_LINE.replace_all(text, "").into_owned()
}

/// 统计销售占位符数量
pub fn count_sales_placeholders(text: &str) -> usize {
    text.matches(SALES_PLACEHOLDER).count()
}

/// 监修者吹き出し标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorTag {
    name: String,
    open: String,
    close: String,
}

impl SupervisorTag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            open: format!("<{}吹き出し>", name),
            close: format!("</{}吹き出し>", name),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// 公式 LINE 按钮
    pub fn button(&self) -> String {
        format!("<ボタン>{}の公式LINEを見る</ボタン>", self.name)
    }

    pub fn is_present(&self, text: &str) -> bool {
        text.contains(&self.open)
    }

    /// 移除所有吹き出し块（含内容）
    pub fn strip_balloons(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(&self.open) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + self.open.len()..];
            match after_open.find(&self.close) {
                Some(end) => rest = &after_open[end + self.close.len()..],
                None => {
                    rest = "";
                    break;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// 段落在文章中的角色（由 H2 标题判断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Intro,
    Description,
    Summary,
    Body,
}

impl BlockRole {
    pub fn classify(title: &str) -> Self {
        if title.contains("導入") {
            BlockRole::Intro
        } else if title.contains("ディスクリプション") || title.to_lowercase().contains("description")
        {
            BlockRole::Description
        } else if title.contains("まとめ") {
            BlockRole::Summary
        } else {
            BlockRole::Body
        }
    }

    /// 监修者评论只插入正文段落
    pub fn accepts_supervisor_comment(&self) -> bool {
        matches!(self, BlockRole::Body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_link_detection_accepts_both_colons() {
        assert!(has_internal_link("参考記事：A(https://a.example/)"));
        assert!(has_internal_link("参考記事:A(https://a.example/)"));
        assert!(!has_internal_link("参考になる記事"));
    }

    #[test]
    fn test_strip_citations_inline() {
        let text = "Paragraph one. 参考記事：X (https://x.example/)\nParagraph two.";
        assert_eq!(strip_citations(text), "Paragraph one. \nParagraph two.");
    }

    #[test]
    fn test_supervisor_tag_strip() {
        let tag = SupervisorTag::new("佐藤誠一");
        assert_eq!(tag.open(), "<佐藤誠一吹き出し>");
        let text = "前文\n<佐藤誠一吹き出し>\nコメント\n</佐藤誠一吹き出し>\n後文";
        assert!(tag.is_present(text));
        assert_eq!(tag.strip_balloons(text), "前文\n\n後文");
        assert_eq!(tag.button(), "<ボタン>佐藤誠一の公式LINEを見る</ボタン>");
    }

    #[test]
    fn test_block_role() {
        assert_eq!(BlockRole::classify("導入文"), BlockRole::Intro);
        assert_eq!(BlockRole::classify("Meta Description"), BlockRole::Description);
        assert_eq!(BlockRole::classify("まとめ"), BlockRole::Summary);
        assert_eq!(BlockRole::classify("Webライターの始め方"), BlockRole::Body);
        assert!(!BlockRole::Summary.accepts_supervisor_comment());
    }

    #[test]
    fn test_count_sales_placeholders() {
        let text = format!("a{}b{}", SALES_PLACEHOLDER, SALES_PLACEHOLDER);
        assert_eq!(count_sales_placeholders(&text), 2);
    }
}
