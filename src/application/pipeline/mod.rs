//! 生成管线 - 纯函数部分
//!
//! - prompts: 各任务的提示词组装
//! - sanitizer: 模型输出清洗（信封 / 正则级联 / HTML 提取）
//! - verifier: 改写类任务的原文保留校验
//! - titles: 标题候选提取
//! - finishing: 导语 / 销售文 / まとめ / 摘要 的解析与回填

mod finishing;
mod prompts;
mod sanitizer;
mod titles;
mod verifier;

pub use finishing::{parse_finishing, FinishingBundle, FinishingReport, SalesCopy};
pub use prompts::{
    AssembledPrompt, FinishingBrief, PartEdit, PromptAssembler, WritingBrief, OUTPUT_BEGIN,
    OUTPUT_END,
};
pub use sanitizer::{
    extract_html, sanitize_mutation, sanitize_outline, sanitize_plain, strip_leading_headings,
    unwrap_envelope,
};
pub use titles::extract_titles;
pub use verifier::{reassemble, ContentVerifier, RejectReason, Verdict};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 任务种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Outline,
    OutlinePartEdit,
    Titles,
    Writing,
    WritingPartEdit,
    InternalLinks,
    SalesLocations,
    SupervisorComments,
    Finishing,
    WordpressHtml,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Outline => "outline",
            TaskKind::OutlinePartEdit => "outline-part-edit",
            TaskKind::Titles => "titles",
            TaskKind::Writing => "writing",
            TaskKind::WritingPartEdit => "writing-part-edit",
            TaskKind::InternalLinks => "internal-links",
            TaskKind::SalesLocations => "sales-locations",
            TaskKind::SupervisorComments => "supervisor-comments",
            TaskKind::Finishing => "finishing",
            TaskKind::WordpressHtml => "wordpress-html",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 改写类任务（在已有正文中插入内容）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    InternalLinks,
    SalesLocations,
    SupervisorComments,
}

impl MutationKind {
    pub fn task(&self) -> TaskKind {
        match self {
            MutationKind::InternalLinks => TaskKind::InternalLinks,
            MutationKind::SalesLocations => TaskKind::SalesLocations,
            MutationKind::SupervisorComments => TaskKind::SupervisorComments,
        }
    }
}

/// 各任务的超时（None 表示不限）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTimeouts {
    pub outline: Option<Duration>,
    pub titles: Option<Duration>,
    pub writing: Option<Duration>,
    pub part_edit: Option<Duration>,
    pub mutation: Option<Duration>,
    pub finishing: Option<Duration>,
    pub html: Option<Duration>,
}

impl TaskTimeouts {
    pub fn for_task(&self, kind: TaskKind) -> Option<Duration> {
        match kind {
            TaskKind::Outline => self.outline,
            TaskKind::Titles => self.titles,
            TaskKind::Writing => self.writing,
            TaskKind::OutlinePartEdit | TaskKind::WritingPartEdit => self.part_edit,
            TaskKind::InternalLinks | TaskKind::SalesLocations | TaskKind::SupervisorComments => {
                self.mutation
            }
            TaskKind::Finishing => self.finishing,
            TaskKind::WordpressHtml => self.html,
        }
    }
}

/// 管线设置（由配置构建）
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// 文本任务使用的模型
    pub writer_model: String,
    /// HTML 转换使用的模型
    pub html_model: String,
    pub timeouts: TaskTimeouts,
    pub supervisor_name: String,
    pub internal_link_char_limit: usize,
    pub sales_char_limit: usize,
    pub supervisor_char_limit: usize,
    /// 改写类任务每次请求处理的段落数
    pub max_sections_per_request: usize,
    pub max_sales_placeholders: usize,
    pub title_min_chars: usize,
    pub title_max_chars: usize,
}

impl PipelineSettings {
    pub fn model_for(&self, kind: TaskKind) -> &str {
        match kind {
            TaskKind::WordpressHtml => &self.html_model,
            _ => &self.writer_model,
        }
    }

    pub fn char_limit(&self, kind: MutationKind) -> usize {
        match kind {
            MutationKind::InternalLinks => self.internal_link_char_limit,
            MutationKind::SalesLocations => self.sales_char_limit,
            MutationKind::SupervisorComments => self.supervisor_char_limit,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            writer_model: "gemini-3-pro-preview".to_string(),
            html_model: "claude-sonnet-4-5-20250929".to_string(),
            timeouts: TaskTimeouts {
                mutation: Some(Duration::from_secs(55)),
                ..Default::default()
            },
            supervisor_name: "佐藤誠一".to_string(),
            internal_link_char_limit: 3000,
            sales_char_limit: 2000,
            supervisor_char_limit: 2000,
            max_sections_per_request: 1,
            max_sales_placeholders: crate::domain::markers::MAX_SALES_PLACEHOLDERS,
            title_min_chars: 30,
            title_max_chars: 40,
        }
    }
}
