//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod article_handlers;
mod generation_handlers;
mod mutation_handlers;

pub use article_handlers::*;
pub use generation_handlers::*;
pub use mutation_handlers::*;

use std::time::Instant;

use crate::application::error::ApplicationError;
use crate::application::pipeline::{PipelineSettings, TaskKind};
use crate::application::ports::{
    ArticleRepositoryPort, AutosavePort, CompletionRequest, ImagePart, LlmGatewayPort,
};
use crate::domain::{Article, ArticleId};

/// 调用模型（按任务选择模型与超时）
pub(crate) async fn complete(
    gateway: &dyn LlmGatewayPort,
    settings: &PipelineSettings,
    task: TaskKind,
    prompt: String,
    images: Vec<ImagePart>,
) -> Result<String, ApplicationError> {
    let model = settings.model_for(task).to_string();
    let timeout = settings.timeouts.for_task(task);

    tracing::info!(
        task = %task,
        model = %model,
        prompt_chars = prompt.chars().count(),
        images = images.len(),
        timeout_ms = ?timeout.map(|t| t.as_millis()),
        "Calling LLM"
    );

    let started = Instant::now();
    let request = CompletionRequest::new(prompt, model)
        .with_images(images)
        .with_timeout(timeout);

    match gateway.generate(request).await {
        Ok(text) => {
            tracing::info!(
                task = %task,
                elapsed_ms = started.elapsed().as_millis() as u64,
                response_chars = text.chars().count(),
                "LLM call completed"
            );
            Ok(text)
        }
        Err(e) => {
            tracing::warn!(
                task = %task,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "LLM call failed"
            );
            Err(e.into())
        }
    }
}

/// 读取文章：尚未落盘的版本优先
pub(crate) async fn load_article(
    repo: &dyn ArticleRepositoryPort,
    autosave: &dyn AutosavePort,
    id: &ArticleId,
) -> Result<Article, ApplicationError> {
    if let Some(article) = autosave.pending(id) {
        return Ok(article);
    }
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Article", id.as_str()))
}
