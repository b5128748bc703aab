//! Article Context - Value Objects

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 文章唯一标识（`article-<毫秒时间戳>-<随机后缀>`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "article-{}-{}",
            Utc::now().timestamp_millis(),
            &suffix[..6]
        ))
    }

    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("文章 ID 不能为空");
        }
        if raw.len() > 128 || !raw.chars().all(is_key_char) {
            return Err("文章 ID 只能包含字母、数字、- 和 _");
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 段落稳定标识
///
/// 首次创建时分配，之后在大纲重新解析时保持不变。
/// 大纲中可通过 `## 标题 {#key}` 显式携带。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("sec-{}", &raw[..10]))
    }

    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        if raw.is_empty() {
            return Err("段落 ID 不能为空");
        }
        if raw.len() > 64 || !raw.chars().all(is_key_char) {
            return Err("段落 ID 只能包含字母、数字、- 和 _");
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// 标题层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn markdown_prefix(&self) -> &'static str {
        match self {
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
            HeadingLevel::H4 => "####",
        }
    }
}

/// 用户填写的文章需求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleInputData {
    pub main_keyword: String,
    pub related_keywords: String,
    pub target_reader: String,
    pub search_intent: String,
    pub competitor_articles: String,
    pub sample_structure: String,
    pub primary_info: String,
    pub article_goal: String,
    pub media_example: String,
    pub product_url: String,
    pub intro_reader_worry: String,
    pub description_keywords: String,
}

/// 参考附件（仅用于一次生成调用，永不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// data URL（`data:<mime>;base64,<payload>`）或纯 base64
    pub content: String,
}

impl Attachment {
    /// 去掉 data URL 前缀后的 base64 数据
    pub fn base64_payload(&self) -> &str {
        match self.content.split_once(',') {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => &self.content,
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        let name = self.name.to_lowercase();
        if self.mime_type.starts_with("text/")
            || name.ends_with(".txt")
            || name.ends_with(".md")
            || name.ends_with(".csv")
        {
            AttachmentKind::Text
        } else if self.mime_type == "application/pdf" || name.ends_with(".pdf") {
            AttachmentKind::Pdf
        } else if self.mime_type.starts_with("image/")
            || [".jpg", ".jpeg", ".png", ".gif", ".webp"]
                .iter()
                .any(|ext| name.ends_with(ext))
        {
            AttachmentKind::Image
        } else {
            AttachmentKind::Other
        }
    }

    /// 传给模型时使用的 MIME 类型
    pub fn effective_mime(&self) -> String {
        if !self.mime_type.is_empty() {
            return self.mime_type.clone();
        }
        match self.kind() {
            AttachmentKind::Pdf => "application/pdf".to_string(),
            _ => "image/jpeg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Text,
    Pdf,
    Image,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_id_format() {
        let id = ArticleId::new();
        assert!(id.as_str().starts_with("article-"));
        assert!(ArticleId::parse(id.as_str()).is_ok());
        assert_ne!(ArticleId::new(), ArticleId::new());
    }

    #[test]
    fn test_article_id_rejects_bad_chars() {
        assert!(ArticleId::parse("").is_err());
        assert!(ArticleId::parse("../etc/passwd").is_err());
    }

    #[test]
    fn test_section_id_parse() {
        assert!(SectionId::parse("intro_1").is_ok());
        assert!(SectionId::parse("with space").is_err());
        assert!(SectionId::new().as_str().starts_with("sec-"));
    }

    #[test]
    fn test_input_data_camel_case() {
        let json = r#"{"mainKeyword":"Webライター","targetReader":"初心者"}"#;
        let input: ArticleInputData = serde_json::from_str(json).unwrap();
        assert_eq!(input.main_keyword, "Webライター");
        assert_eq!(input.target_reader, "初心者");
        assert!(input.product_url.is_empty());
    }

    #[test]
    fn test_attachment_kind_and_payload() {
        let file = Attachment {
            name: "memo.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content: "data:text/plain;base64,44GC".to_string(),
        };
        assert_eq!(file.kind(), AttachmentKind::Text);
        assert_eq!(file.base64_payload(), "44GC");

        let image = Attachment {
            name: "chart.PNG".to_string(),
            mime_type: String::new(),
            content: "iVBORw0".to_string(),
        };
        assert_eq!(image.kind(), AttachmentKind::Image);
        assert_eq!(image.base64_payload(), "iVBORw0");
        assert_eq!(image.effective_mime(), "image/jpeg");
    }
}
