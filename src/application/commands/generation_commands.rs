//! Generation Commands - 生成类命令
//!
//! 大纲、标题、段落正文、局部编辑、导语等四件套、HTML 转换

use serde::Serialize;

use crate::application::pipeline::{FinishingBrief, FinishingBundle, FinishingReport};
use crate::domain::{ArticleId, ArticleInputData, Attachment, OutlineChange, SectionId, SubHeading};

/// 生成大纲
#[derive(Debug, Clone)]
pub struct GenerateOutline {
    pub input: ArticleInputData,
    /// 指定时把大纲写回该文章并立即保存
    pub article_id: Option<ArticleId>,
}

/// 大纲生成结果
#[derive(Debug, Clone)]
pub struct OutlineGenerated {
    pub structure: String,
    pub change: Option<OutlineChange>,
}

/// 大纲局部编辑
#[derive(Debug, Clone)]
pub struct EditOutlinePart {
    pub selected_text: String,
    pub editing_instruction: String,
    pub full_structure: String,
    pub input: ArticleInputData,
}

/// 生成标题候选
#[derive(Debug, Clone)]
pub struct GenerateTitles {
    pub keyword: String,
    pub target_reader: String,
    pub structure: String,
}

/// 标题候选
#[derive(Debug, Clone, Serialize)]
pub struct TitlesGenerated {
    pub titles: Vec<String>,
    pub count: usize,
}

/// 执笔单个 H2 段落
#[derive(Debug, Clone)]
pub struct GenerateWriting {
    pub article_id: Option<ArticleId>,
    pub section_id: Option<SectionId>,
    pub section_title: String,
    pub subheadings: Vec<SubHeading>,
    pub input: ArticleInputData,
    pub structure: String,
    pub instruction: String,
    pub attachments: Vec<Attachment>,
}

/// 段落正文局部编辑
#[derive(Debug, Clone)]
pub struct EditWritingPart {
    pub selected_text: String,
    pub editing_instruction: String,
    pub full_content: String,
    pub section_title: String,
    pub subheadings: Vec<SubHeading>,
}

/// 导语 / 销售文 / まとめ / 摘要
///
/// 指定 `article_id` 时以已保存的文章为准构建输入，并把结果回填保存。
#[derive(Debug, Clone)]
pub struct GenerateFinishing {
    pub article_id: Option<ArticleId>,
    pub brief: FinishingBrief,
}

/// 四件套结果
#[derive(Debug, Clone)]
pub struct FinishingGenerated {
    pub bundle: FinishingBundle,
    pub report: Option<FinishingReport>,
}

/// 转换为 WordPress HTML
///
/// 指定文章时：有 `section_id` 写入该段落的 html，否则写入导语 html。
#[derive(Debug, Clone)]
pub struct ConvertToWordpress {
    pub content: String,
    pub article_id: Option<ArticleId>,
    pub section_id: Option<SectionId>,
}
