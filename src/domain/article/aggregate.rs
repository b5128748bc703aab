//! Article Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::{ConflictResolution, MergeConflict, Section};
use super::errors::ArticleError;
use super::value_objects::{ArticleId, ArticleInputData, SectionId};
use crate::domain::markers::{count_sales_placeholders, BlockRole, SALES_PLACEHOLDER};
use crate::domain::outline::{merge_sections, parse_outline, render_outline};

/// 文章聚合根
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: ArticleInputData,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub outline: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub intro_html: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conflicts: Vec<MergeConflict>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// 大纲重新解析的结果统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineChange {
    pub sections: usize,
    pub reused: usize,
    pub created: usize,
    pub new_conflicts: usize,
}

/// 文章索引记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub name: String,
    pub title: String,
    pub main_keyword: String,
    pub saved_at: DateTime<Utc>,
}

impl Article {
    pub fn new(input: ArticleInputData) -> Self {
        Self {
            id: ArticleId::new(),
            name: String::new(),
            input,
            title: String::new(),
            outline: String::new(),
            sections: Vec::new(),
            intro: String::new(),
            intro_html: String::new(),
            description: String::new(),
            conflicts: Vec::new(),
            saved_at: None,
        }
    }

    /// 列表中显示的名称
    pub fn display_name(&self) -> String {
        [&self.name, &self.title, &self.input.main_keyword]
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("無題の記事")
            .to_string()
    }

    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id.clone(),
            name: self.display_name(),
            title: self.title.clone(),
            main_keyword: self.input.main_keyword.clone(),
            saved_at: self.saved_at.unwrap_or_else(Utc::now),
        }
    }

    /// 替换大纲并重新解析段落
    ///
    /// 无法匹配、但已有正文的旧段落记录为冲突，正文保留在冲突记录中。
    pub fn apply_outline(&mut self, outline: impl Into<String>) -> OutlineChange {
        let outline = outline.into();
        let parsed = parse_outline(&outline);
        let existing = std::mem::take(&mut self.sections);
        let outcome = merge_sections(existing, parsed);

        let new_conflicts = outcome.orphaned.len();
        self.conflicts
            .extend(outcome.orphaned.into_iter().map(MergeConflict::from_section));
        self.sections = outcome.sections;
        self.outline = outline;

        OutlineChange {
            sections: self.sections.len(),
            reused: outcome.reused,
            created: outcome.created,
            new_conflicts,
        }
    }

    /// 带稳定 key 的大纲文本
    pub fn keyed_outline(&self) -> String {
        render_outline(&self.sections)
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn section_mut(&mut self, id: &SectionId) -> Result<&mut Section, ArticleError> {
        self.sections
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ArticleError::SectionNotFound(id.clone()))
    }

    pub fn set_prose(&mut self, id: &SectionId, prose: impl Into<String>) -> Result<(), ArticleError> {
        self.section_mut(id)?.prose = prose.into();
        Ok(())
    }

    /// 处理合并冲突
    pub fn resolve_conflict(
        &mut self,
        conflict_id: &SectionId,
        resolution: ConflictResolution,
    ) -> Result<(), ArticleError> {
        let index = self
            .conflicts
            .iter()
            .position(|c| &c.section_id == conflict_id)
            .ok_or_else(|| ArticleError::ConflictNotFound(conflict_id.clone()))?;

        if let ConflictResolution::AttachTo(target) = &resolution {
            let section = self.section_mut(target)?;
            if section.has_prose() {
                return Err(ArticleError::SectionHasProse(target.clone()));
            }
            let conflict = &self.conflicts[index];
            let (prose, instruction, html) = (
                conflict.prose.clone(),
                conflict.editing_instruction.clone(),
                conflict.html.clone(),
            );
            let section = self.section_mut(target)?;
            section.prose = prose;
            if section.editing_instruction.is_empty() {
                section.editing_instruction = instruction;
            }
            section.html = html;
        }

        self.conflicts.remove(index);
        Ok(())
    }

    /// 全文中的销售占位符数量
    pub fn sales_placeholder_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| count_sales_placeholders(&s.prose))
            .sum()
    }

    /// まとめ 段落
    pub fn summary_section_mut(&mut self) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.role() == BlockRole::Summary)
    }

    /// 用销售文案替换指定段落中的占位符，返回替换个数
    pub fn fill_sales_copy(&mut self, id: &SectionId, copy: &str) -> Result<usize, ArticleError> {
        let section = self.section_mut(id)?;
        let count = count_sales_placeholders(&section.prose);
        if count > 0 {
            section.prose = section.prose.replace(SALES_PLACEHOLDER, copy);
        }
        Ok(count)
    }

    /// 拼接成 Markdown 全文（不含导语和摘要）
    pub fn body_markdown(&self) -> String {
        self.sections
            .iter()
            .map(Section::render_markdown)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.saved_at = Some(at);
    }
}
