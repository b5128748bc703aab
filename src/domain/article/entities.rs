//! Article Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{Attachment, HeadingLevel, SectionId};
use crate::domain::markers::BlockRole;

/// 小标题（H3 / H4）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubHeading {
    pub title: String,
    pub level: HeadingLevel,
}

impl SubHeading {
    pub fn h3(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level: HeadingLevel::H3,
        }
    }

    pub fn h4(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level: HeadingLevel::H4,
        }
    }
}

/// 段落（一个 H2 块）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub level: HeadingLevel,
    #[serde(default)]
    pub subheadings: Vec<SubHeading>,
    /// 大纲中该块下的非标题行
    #[serde(default)]
    pub outline_body: Vec<String>,
    /// 已写成的正文
    #[serde(default)]
    pub prose: String,
    /// 针对该段的写作指示
    #[serde(default)]
    pub editing_instruction: String,
    /// 转换后的 HTML
    #[serde(default)]
    pub html: String,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            level: HeadingLevel::H2,
            subheadings: Vec::new(),
            outline_body: Vec::new(),
            prose: String::new(),
            editing_instruction: String::new(),
            html: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn role(&self) -> BlockRole {
        BlockRole::classify(&self.title)
    }

    pub fn has_prose(&self) -> bool {
        !self.prose.trim().is_empty()
    }

    /// 是否带有用户产出（正文 / HTML），重新解析时不能静默丢弃
    pub fn has_user_content(&self) -> bool {
        self.has_prose() || !self.html.trim().is_empty()
    }

    /// 以 Markdown 标题形式输出该块（用于拼接文章全文）
    pub fn render_markdown(&self) -> String {
        let mut out = format!("## {}\n", self.title);
        for sub in &self.subheadings {
            out.push_str(&format!("{} {}\n", sub.level.markdown_prefix(), sub.title));
        }
        if self.has_prose() {
            out.push('\n');
            out.push_str(self.prose.trim_end());
            out.push('\n');
        }
        out
    }
}

/// 合并冲突：重新解析大纲后找不到对应标题的已写段落
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    pub section_id: SectionId,
    pub previous_title: String,
    pub prose: String,
    #[serde(default)]
    pub editing_instruction: String,
    #[serde(default)]
    pub html: String,
    pub detected_at: DateTime<Utc>,
}

impl MergeConflict {
    pub fn from_section(section: Section) -> Self {
        Self {
            section_id: section.id,
            previous_title: section.title,
            prose: section.prose,
            editing_instruction: section.editing_instruction,
            html: section.html,
            detected_at: Utc::now(),
        }
    }
}

/// 冲突处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    /// 将保留的正文挂到指定段落（该段落已有正文时拒绝）
    AttachTo(SectionId),
    /// 丢弃
    Discard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachments_are_not_serialized() {
        let mut section = Section::new(SectionId::parse("s1").unwrap(), "見出し");
        section.attachments.push(Attachment {
            name: "a.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content: "data:text/plain;base64,YQ==".to_string(),
        });
        let json = serde_json::to_string(&section).unwrap();
        assert!(!json.contains("attachments"));
        assert!(!json.contains("YQ=="));

        let back: Section = serde_json::from_str(&json).unwrap();
        assert!(back.attachments.is_empty());
        assert_eq!(back.title, "見出し");
    }

    #[test]
    fn test_render_markdown() {
        let mut section = Section::new(SectionId::parse("s1").unwrap(), "はじめに");
        section.subheadings.push(SubHeading::h3("ポイントA"));
        section.prose = "本文です。".to_string();
        assert_eq!(
            section.render_markdown(),
            "## はじめに\n### ポイントA\n\n本文です。\n"
        );
    }
}
