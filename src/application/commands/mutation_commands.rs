//! Mutation Commands - 改写类命令
//!
//! 内部链接 / 销售位置 / 监修者评论：在已有正文中插入内容，每次调用只处理有限个段落，
//! 调用方根据 `remaining` 反复调用直到为 0。

use serde::Serialize;

use crate::application::pipeline::MutationKind;
use crate::application::ports::{CatalogEntry, CatalogSource};
use crate::domain::{ArticleId, Section, SectionId, SubHeading};

/// 参与改写的段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPayload {
    pub id: SectionId,
    pub title: String,
    pub subheadings: Vec<SubHeading>,
    pub prose: String,
}

impl From<&Section> for SectionPayload {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
            subheadings: section.subheadings.clone(),
            prose: section.prose.clone(),
        }
    }
}

/// 任务专属参数
#[derive(Debug, Clone)]
pub enum MutationTask {
    InternalLinks {
        /// 调用方直接给出的候选文章（非空时不再读取目录）
        catalog: Option<Vec<CatalogEntry>>,
    },
    SalesLocations {
        product_url: String,
        article_topic: String,
    },
    SupervisorComments,
}

impl MutationTask {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationTask::InternalLinks { .. } => MutationKind::InternalLinks,
            MutationTask::SalesLocations { .. } => MutationKind::SalesLocations,
            MutationTask::SupervisorComments => MutationKind::SupervisorComments,
        }
    }
}

/// 改写命令
///
/// 指定 `article_id` 时：`sections` 为空则取已保存文章的段落，结果写回文章并立即保存。
#[derive(Debug, Clone)]
pub struct RunMutation {
    pub task: MutationTask,
    pub article_id: Option<ArticleId>,
    pub sections: Vec<SectionPayload>,
}

/// 单个段落的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutcome {
    pub section_id: SectionId,
    /// 处理后的正文（被拒绝时为原文）
    pub content: String,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<&'static str>,
}

/// 改写结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub results: Vec<SectionOutcome>,
    /// 本次之后仍待处理的段落数
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CatalogSource>,
}
