//! Generation Command Handlers

use std::sync::Arc;

use super::{complete, load_article};
use crate::application::commands::{
    ConvertToWordpress, EditOutlinePart, EditWritingPart, FinishingGenerated, GenerateFinishing,
    GenerateOutline, GenerateTitles, GenerateWriting, OutlineGenerated, TitlesGenerated,
};
use crate::application::error::ApplicationError;
use crate::application::pipeline::{
    extract_html, extract_titles, parse_finishing, sanitize_outline, sanitize_plain,
    FinishingBrief, PartEdit, PipelineSettings, PromptAssembler, TaskKind, WritingBrief,
};
use crate::application::ports::{ArticleRepositoryPort, AutosavePort, LlmGatewayPort};

fn require(value: &str, message: &str) -> Result<(), ApplicationError> {
    if value.trim().is_empty() {
        Err(ApplicationError::validation(message))
    } else {
        Ok(())
    }
}

fn require_edit(selected: &str, instruction: &str) -> Result<(), ApplicationError> {
    if selected.trim().is_empty() || instruction.trim().is_empty() {
        return Err(ApplicationError::validation("選択されたテキストと編集指示が必要です"));
    }
    Ok(())
}

// ============================================================================
// GenerateOutline
// ============================================================================

/// GenerateOutline Handler - 生成大纲
pub struct GenerateOutlineHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl GenerateOutlineHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
        repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
            repo,
            autosave,
        }
    }

    pub async fn handle(&self, cmd: GenerateOutline) -> Result<OutlineGenerated, ApplicationError> {
        require(&cmd.input.main_keyword, "メインキーワードが必要です")?;

        let prompt = self.assembler.outline(&cmd.input);
        let raw = complete(&*self.gateway, &self.settings, TaskKind::Outline, prompt, Vec::new()).await?;

        let structure = sanitize_outline(&raw);
        if structure.is_empty() {
            return Err(ApplicationError::empty_result("記事構成を生成できませんでした", &raw));
        }

        let change = match &cmd.article_id {
            Some(id) => {
                let mut article = load_article(&*self.repo, &*self.autosave, id).await?;
                article.input = cmd.input;
                let change = article.apply_outline(structure.clone());
                self.autosave.save_now(article).await?;
                tracing::info!(
                    article_id = %id,
                    sections = change.sections,
                    new_conflicts = change.new_conflicts,
                    "Outline applied to article"
                );
                Some(change)
            }
            None => None,
        };

        Ok(OutlineGenerated { structure, change })
    }
}

// ============================================================================
// EditOutlinePart
// ============================================================================

/// EditOutlinePart Handler - 大纲局部编辑
pub struct EditOutlinePartHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
}

impl EditOutlinePartHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
        }
    }

    pub async fn handle(&self, cmd: EditOutlinePart) -> Result<String, ApplicationError> {
        require_edit(&cmd.selected_text, &cmd.editing_instruction)?;

        let prompt = self.assembler.outline_part_edit(
            PartEdit {
                selected_text: &cmd.selected_text,
                instruction: &cmd.editing_instruction,
                full_text: &cmd.full_structure,
            },
            &cmd.input,
        );
        let raw = complete(&*self.gateway, &self.settings, TaskKind::OutlinePartEdit, prompt, Vec::new()).await?;

        let edited = sanitize_plain(&raw);
        if edited.is_empty() {
            return Err(ApplicationError::empty_result("編集結果を取得できませんでした", &raw));
        }
        Ok(edited)
    }
}

// ============================================================================
// GenerateTitles
// ============================================================================

/// GenerateTitles Handler - 生成标题候选
pub struct GenerateTitlesHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
}

impl GenerateTitlesHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
        }
    }

    pub async fn handle(&self, cmd: GenerateTitles) -> Result<TitlesGenerated, ApplicationError> {
        require(&cmd.keyword, "キーワードが必要です")?;

        let prompt = self
            .assembler
            .titles(&cmd.keyword, &cmd.target_reader, &cmd.structure);
        let raw = complete(&*self.gateway, &self.settings, TaskKind::Titles, prompt, Vec::new()).await?;

        let titles = extract_titles(
            &sanitize_plain(&raw),
            self.settings.title_min_chars,
            self.settings.title_max_chars,
        );
        if titles.is_empty() {
            return Err(ApplicationError::empty_result(
                format!(
                    "{}〜{}文字のタイトルを抽出できませんでした。もう一度お試しください。",
                    self.settings.title_min_chars, self.settings.title_max_chars
                ),
                &raw,
            ));
        }

        tracing::info!(count = titles.len(), "Titles extracted");
        Ok(TitlesGenerated {
            count: titles.len(),
            titles,
        })
    }
}

// ============================================================================
// GenerateWriting
// ============================================================================

/// GenerateWriting Handler - 执笔单个段落
pub struct GenerateWritingHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl GenerateWritingHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
        repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
            repo,
            autosave,
        }
    }

    pub async fn handle(&self, cmd: GenerateWriting) -> Result<String, ApplicationError> {
        require(&cmd.section_title, "H2ブロックが指定されていません")?;

        let assembled = self.assembler.writing(WritingBrief {
            section_title: &cmd.section_title,
            subheadings: &cmd.subheadings,
            input: &cmd.input,
            outline: &cmd.structure,
            instruction: &cmd.instruction,
            attachments: &cmd.attachments,
        });
        let raw = complete(
            &*self.gateway,
            &self.settings,
            TaskKind::Writing,
            assembled.text,
            assembled.images,
        )
        .await?;

        let content = sanitize_plain(&raw);
        if content.is_empty() {
            return Err(ApplicationError::empty_result("本文を生成できませんでした", &raw));
        }

        if let (Some(article_id), Some(section_id)) = (&cmd.article_id, &cmd.section_id) {
            let mut article = load_article(&*self.repo, &*self.autosave, article_id).await?;
            article.set_prose(section_id, content.clone())?;
            self.autosave.save_now(article).await?;
        }

        Ok(content)
    }
}

// ============================================================================
// EditWritingPart
// ============================================================================

/// EditWritingPart Handler - 正文局部编辑
pub struct EditWritingPartHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
}

impl EditWritingPartHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
        }
    }

    pub async fn handle(&self, cmd: EditWritingPart) -> Result<String, ApplicationError> {
        require_edit(&cmd.selected_text, &cmd.editing_instruction)?;

        let prompt = self.assembler.writing_part_edit(
            PartEdit {
                selected_text: &cmd.selected_text,
                instruction: &cmd.editing_instruction,
                full_text: &cmd.full_content,
            },
            &cmd.section_title,
            &cmd.subheadings,
        );
        let raw = complete(&*self.gateway, &self.settings, TaskKind::WritingPartEdit, prompt, Vec::new()).await?;

        let edited = sanitize_plain(&raw);
        if edited.is_empty() {
            return Err(ApplicationError::empty_result("編集結果を取得できませんでした", &raw));
        }
        Ok(edited)
    }
}

// ============================================================================
// GenerateFinishing
// ============================================================================

/// GenerateFinishing Handler - 导语 / 销售文 / まとめ / 摘要
pub struct GenerateFinishingHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl GenerateFinishingHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
        repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
            repo,
            autosave,
        }
    }

    pub async fn handle(&self, cmd: GenerateFinishing) -> Result<FinishingGenerated, ApplicationError> {
        let mut article = match &cmd.article_id {
            Some(id) => Some(load_article(&*self.repo, &*self.autosave, id).await?),
            None => None,
        };
        let brief = match &article {
            Some(a) => FinishingBrief::from_article(a),
            None => cmd.brief,
        };
        require(&brief.article_body, "記事本文が必要です")?;

        let prompt = self.assembler.finishing(&brief);
        let raw = complete(&*self.gateway, &self.settings, TaskKind::Finishing, prompt, Vec::new()).await?;

        let bundle = parse_finishing(&raw);
        if bundle.is_empty() {
            return Err(ApplicationError::empty_result(
                "導入文・まとめ文などを抽出できませんでした",
                &raw,
            ));
        }

        let report = match article.as_mut() {
            Some(a) => {
                let report = bundle.apply(a);
                if !report.unknown_blocks.is_empty() {
                    tracing::warn!(
                        article_id = %a.id,
                        unknown = ?report.unknown_blocks,
                        "Sales copy returned for unknown blocks"
                    );
                }
                self.autosave.save_now(a.clone()).await?;
                Some(report)
            }
            None => None,
        };

        Ok(FinishingGenerated { bundle, report })
    }
}

// ============================================================================
// ConvertToWordpress
// ============================================================================

/// ConvertToWordpress Handler - 转换为 Gutenberg HTML
pub struct ConvertToWordpressHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl ConvertToWordpressHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
        repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
    ) -> Self {
        Self {
            gateway,
            assembler,
            settings,
            repo,
            autosave,
        }
    }

    pub async fn handle(&self, cmd: ConvertToWordpress) -> Result<String, ApplicationError> {
        require(&cmd.content, "変換するコンテンツが必要です")?;

        let prompt = self.assembler.wordpress_html(&cmd.content);
        let raw = complete(&*self.gateway, &self.settings, TaskKind::WordpressHtml, prompt, Vec::new()).await?;

        let mut html = extract_html(&raw);
        if html.is_empty() {
            tracing::warn!(raw_chars = raw.chars().count(), "No HTML found in response, returning raw text");
            html = raw.trim().to_string();
        }

        if let Some(article_id) = &cmd.article_id {
            let mut article = load_article(&*self.repo, &*self.autosave, article_id).await?;
            match &cmd.section_id {
                Some(section_id) => article.section_mut(section_id)?.html = html.clone(),
                None => article.intro_html = html.clone(),
            }
            self.autosave.save_now(article).await?;
        }

        Ok(html)
    }
}
