//! Data Transfer Objects
//!
//! 请求 / 响应体均为 camelCase JSON

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::pipeline::{FinishingBrief, FinishingBundle, FinishingReport};
use crate::application::{
    CatalogEntry, ConvertToWordpress, EditOutlinePart, EditWritingPart, GenerateFinishing,
    GenerateOutline, GenerateTitles, GenerateWriting, MutationTask, RunMutation, SectionPayload,
};
use crate::domain::{
    Article, ArticleId, ArticleInputData, Attachment, ConflictResolution, OutlineChange, SectionId,
    SubHeading,
};
use crate::infrastructure::http::error::ApiError;

// ============================================================================
// 请求体解析
// ============================================================================

/// JSON 请求体，解析失败时返回 `{error}` 而不是 axum 的纯文本
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Request body rejected");
                Err(ApiError::BadRequest(
                    "リクエストデータの解析に失敗しました。データ形式を確認してください。".to_string(),
                ))
            }
        }
    }
}

fn article_id(raw: Option<&str>) -> Result<Option<ArticleId>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => ArticleId::parse(raw)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("記事IDが不正です: {}", e))),
    }
}

fn required_article_id(raw: &str) -> Result<ArticleId, ApiError> {
    article_id(Some(raw))?.ok_or_else(|| ApiError::BadRequest("記事IDが必要です".to_string()))
}

fn section_id(raw: Option<&str>) -> Result<Option<SectionId>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => SectionId::parse(raw)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("段落IDが不正です: {}", e))),
    }
}

// ============================================================================
// 构成 / 标题
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStructureRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(flatten)]
    pub input: ArticleInputData,
}

impl TryFrom<GenerateStructureRequest> for GenerateOutline {
    type Error = ApiError;

    fn try_from(req: GenerateStructureRequest) -> Result<Self, Self::Error> {
        Ok(GenerateOutline {
            article_id: article_id(req.article_id.as_deref())?,
            input: req.input,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    pub structure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_change: Option<OutlineChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStructurePartRequest {
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub editing_instruction: String,
    #[serde(default)]
    pub full_structure: String,
    #[serde(default)]
    pub initial_data: ArticleInputData,
}

impl From<EditStructurePartRequest> for EditOutlinePart {
    fn from(req: EditStructurePartRequest) -> Self {
        EditOutlinePart {
            selected_text: req.selected_text,
            editing_instruction: req.editing_instruction,
            full_structure: req.full_structure,
            input: req.initial_data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedTextResponse {
    pub edited_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitlesRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub target_reader: String,
    #[serde(default)]
    pub structure: String,
}

impl From<GenerateTitlesRequest> for GenerateTitles {
    fn from(req: GenerateTitlesRequest) -> Self {
        GenerateTitles {
            keyword: req.keyword,
            target_reader: req.target_reader,
            structure: req.structure,
        }
    }
}

// ============================================================================
// 执笔
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWritingRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub subheadings: Vec<SubHeading>,
    #[serde(default)]
    pub structure: String,
    #[serde(default, alias = "editingInstruction")]
    pub instruction: String,
    #[serde(default, alias = "attachedFiles")]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub input: ArticleInputData,
}

impl TryFrom<GenerateWritingRequest> for GenerateWriting {
    type Error = ApiError;

    fn try_from(req: GenerateWritingRequest) -> Result<Self, Self::Error> {
        Ok(GenerateWriting {
            article_id: article_id(req.article_id.as_deref())?,
            section_id: section_id(req.section_id.as_deref())?,
            section_title: req.section_title,
            subheadings: req.subheadings,
            input: req.input,
            structure: req.structure,
            instruction: req.instruction,
            attachments: req.attachments,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWritingPartRequest {
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub editing_instruction: String,
    #[serde(default)]
    pub full_content: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub subheadings: Vec<SubHeading>,
}

impl From<EditWritingPartRequest> for EditWritingPart {
    fn from(req: EditWritingPartRequest) -> Self {
        EditWritingPart {
            selected_text: req.selected_text,
            editing_instruction: req.editing_instruction,
            full_content: req.full_content,
            section_title: req.section_title,
            subheadings: req.subheadings,
        }
    }
}

// ============================================================================
// 改写类任务（内部链接 / セールス / 监修者）
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDto {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subheadings: Vec<SubHeading>,
    #[serde(default, alias = "content")]
    pub prose: String,
}

impl TryFrom<SectionDto> for SectionPayload {
    type Error = ApiError;

    fn try_from(dto: SectionDto) -> Result<Self, Self::Error> {
        let id = section_id(Some(dto.id.as_str()))?
            .ok_or_else(|| ApiError::BadRequest("段落IDが必要です".to_string()))?;
        Ok(SectionPayload {
            id,
            title: dto.title,
            subheadings: dto.subheadings,
            prose: dto.prose,
        })
    }
}

fn mutation(
    task: MutationTask,
    article_id_raw: Option<&str>,
    sections: Vec<SectionDto>,
) -> Result<RunMutation, ApiError> {
    Ok(RunMutation {
        task,
        article_id: article_id(article_id_raw)?,
        sections: sections
            .into_iter()
            .map(SectionPayload::try_from)
            .collect::<Result<_, _>>()?,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalLinksRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDto>,
    #[serde(default, alias = "spreadsheetData")]
    pub catalog: Option<Vec<CatalogEntry>>,
}

impl TryFrom<InternalLinksRequest> for RunMutation {
    type Error = ApiError;

    fn try_from(req: InternalLinksRequest) -> Result<Self, Self::Error> {
        mutation(
            MutationTask::InternalLinks {
                catalog: req.catalog,
            },
            req.article_id.as_deref(),
            req.sections,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLocationsRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDto>,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub article_topic: String,
}

impl TryFrom<SalesLocationsRequest> for RunMutation {
    type Error = ApiError;

    fn try_from(req: SalesLocationsRequest) -> Result<Self, Self::Error> {
        mutation(
            MutationTask::SalesLocations {
                product_url: req.product_url,
                article_topic: req.article_topic,
            },
            req.article_id.as_deref(),
            req.sections,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorCommentsRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDto>,
}

impl TryFrom<SupervisorCommentsRequest> for RunMutation {
    type Error = ApiError;

    fn try_from(req: SupervisorCommentsRequest) -> Result<Self, Self::Error> {
        mutation(
            MutationTask::SupervisorComments,
            req.article_id.as_deref(),
            req.sections,
        )
    }
}

// ============================================================================
// 导语 / 销售文 / まとめ / 摘要
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBlockDto {
    pub block_id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishingRequest {
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub article_body: String,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub intro_reader_worry: String,
    #[serde(default)]
    pub description_keywords: String,
    #[serde(default)]
    pub sales_blocks: Vec<SalesBlockDto>,
    #[serde(default)]
    pub summary_block: Option<String>,
}

impl TryFrom<FinishingRequest> for GenerateFinishing {
    type Error = ApiError;

    fn try_from(req: FinishingRequest) -> Result<Self, Self::Error> {
        Ok(GenerateFinishing {
            article_id: article_id(req.article_id.as_deref())?,
            brief: FinishingBrief {
                keyword: req.keyword,
                title: req.title,
                article_body: req.article_body,
                product_url: req.product_url,
                intro_reader_worry: req.intro_reader_worry,
                description_keywords: req.description_keywords,
                sales_blocks: req
                    .sales_blocks
                    .into_iter()
                    .map(|b| (b.block_id, b.content))
                    .collect(),
                summary_block: req.summary_block,
            },
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishingResponse {
    #[serde(flatten)]
    pub bundle: FinishingBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FinishingReport>,
}

// ============================================================================
// WordPress
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertToWordpressRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
}

impl TryFrom<ConvertToWordpressRequest> for ConvertToWordpress {
    type Error = ApiError;

    fn try_from(req: ConvertToWordpressRequest) -> Result<Self, Self::Error> {
        Ok(ConvertToWordpress {
            content: req.content,
            article_id: article_id(req.article_id.as_deref())?,
            section_id: section_id(req.section_id.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HtmlResponse {
    pub html: String,
}

// ============================================================================
// 统一任务入口
// ============================================================================

/// `POST /api/tasks` 的请求体，按 `task` 字段区分
#[derive(Debug, Deserialize)]
#[serde(tag = "task", rename_all = "kebab-case")]
pub enum TaskRequest {
    Outline(GenerateStructureRequest),
    OutlinePartEdit(EditStructurePartRequest),
    Titles(GenerateTitlesRequest),
    Writing(GenerateWritingRequest),
    WritingPartEdit(EditWritingPartRequest),
    InternalLinks(InternalLinksRequest),
    SalesLocations(SalesLocationsRequest),
    SupervisorComments(SupervisorCommentsRequest),
    Finishing(FinishingRequest),
    WordpressHtml(ConvertToWordpressRequest),
}

// ============================================================================
// 文章存储
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ArticleIdRequest {
    pub id: String,
}

impl ArticleIdRequest {
    pub fn article_id(&self) -> Result<ArticleId, ApiError> {
        required_article_id(&self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveArticleRequest {
    pub article: Article,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveResponse {
    pub id: ArticleId,
    pub scheduled: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutlineRequest {
    pub article_id: String,
    pub outline: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutlineResponse {
    pub article: Article,
    pub change: OutlineChange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConflictRequest {
    pub article_id: String,
    pub conflict_id: String,
    /// 为空表示丢弃
    #[serde(default)]
    pub attach_to: Option<String>,
}

impl ResolveConflictRequest {
    pub fn parts(&self) -> Result<(ArticleId, SectionId, ConflictResolution), ApiError> {
        let article = required_article_id(&self.article_id)?;
        let conflict = section_id(Some(self.conflict_id.as_str()))?
            .ok_or_else(|| ApiError::BadRequest("競合IDが必要です".to_string()))?;
        let resolution = match section_id(self.attach_to.as_deref())? {
            Some(target) => ConflictResolution::AttachTo(target),
            None => ConflictResolution::Discard,
        };
        Ok((article, conflict, resolution))
    }
}

// ============================================================================
// 登录
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_request_dispatch_by_tag() {
        let raw = r#"{"task":"sales-locations","articleId":"","sections":[{"id":"sec-1","title":"始め方","content":"本文"}],"productUrl":"https://example.com/p","articleTopic":"副業"}"#;
        let TaskRequest::SalesLocations(req) = serde_json::from_str(raw).unwrap() else {
            panic!("wrong variant");
        };
        let cmd = RunMutation::try_from(req).unwrap();
        assert!(cmd.article_id.is_none());
        assert_eq!(cmd.sections[0].prose, "本文");
        assert!(matches!(
            cmd.task,
            MutationTask::SalesLocations { ref product_url, .. } if product_url == "https://example.com/p"
        ));
    }

    #[test]
    fn test_structure_request_flattens_brief() {
        let raw = r#"{"task":"outline","mainKeyword":"Webライター","targetReader":"初心者"}"#;
        let TaskRequest::Outline(req) = serde_json::from_str(raw).unwrap() else {
            panic!("wrong variant");
        };
        let cmd = GenerateOutline::try_from(req).unwrap();
        assert_eq!(cmd.input.main_keyword, "Webライター");
        assert_eq!(cmd.input.target_reader, "初心者");
    }

    #[test]
    fn test_unknown_task_rejected() {
        let raw = r#"{"task":"translate","text":"x"}"#;
        assert!(serde_json::from_str::<TaskRequest>(raw).is_err());
    }

    #[test]
    fn test_invalid_section_id_is_bad_request() {
        let dto = SectionDto {
            id: "bad id!".to_string(),
            title: String::new(),
            subheadings: Vec::new(),
            prose: String::new(),
        };
        assert!(matches!(
            SectionPayload::try_from(dto),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_writing_request_aliases() {
        let raw = r#"{"sectionTitle":"始め方","editingInstruction":"具体例を","attachedFiles":[{"name":"memo.txt","type":"text/plain","content":"44Oh"}]}"#;
        let req: GenerateWritingRequest = serde_json::from_str(raw).unwrap();
        let cmd = GenerateWriting::try_from(req).unwrap();
        assert_eq!(cmd.instruction, "具体例を");
        assert_eq!(cmd.attachments.len(), 1);
    }

    #[test]
    fn test_resolve_conflict_discard() {
        let req = ResolveConflictRequest {
            article_id: "article-1".to_string(),
            conflict_id: "sec-old".to_string(),
            attach_to: None,
        };
        let (_, conflict, resolution) = req.parts().unwrap();
        assert_eq!(conflict.as_str(), "sec-old");
        assert_eq!(resolution, ConflictResolution::Discard);
    }
}
