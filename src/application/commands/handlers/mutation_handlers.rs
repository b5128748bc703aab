//! Mutation Command Handlers - 内部链接 / 销售位置 / 监修者评论

use std::sync::Arc;

use super::{complete, load_article};
use crate::application::commands::{
    MutationResponse, MutationTask, RunMutation, SectionOutcome, SectionPayload,
};
use crate::application::error::ApplicationError;
use crate::application::pipeline::{
    reassemble, sanitize_mutation, ContentVerifier, MutationKind, PipelineSettings,
    PromptAssembler, Verdict,
};
use crate::application::ports::{
    ArticleCatalogPort, ArticleRepositoryPort, AutosavePort, Catalog, CatalogEntry, CatalogSource,
    LlmGatewayPort,
};
use crate::domain::markers::{count_sales_placeholders, has_internal_link, BlockRole, SALES_PLACEHOLDER};
use crate::domain::text::{strip_omission_marker, truncate_chars};

/// RunMutation Handler - 改写类任务
///
/// 每次调用最多处理 `max_sections_per_request` 个待处理段落。模型结果未通过原文保留校验时
/// 保留原文，只记录警告。
pub struct RunMutationHandler {
    gateway: Arc<dyn LlmGatewayPort>,
    assembler: Arc<PromptAssembler>,
    settings: Arc<PipelineSettings>,
    catalog: Arc<dyn ArticleCatalogPort>,
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
    verifier: ContentVerifier,
}

impl RunMutationHandler {
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        assembler: Arc<PromptAssembler>,
        settings: Arc<PipelineSettings>,
        catalog: Arc<dyn ArticleCatalogPort>,
        repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
    ) -> Self {
        let verifier = ContentVerifier::new(assembler.supervisor().clone());
        Self {
            gateway,
            assembler,
            settings,
            catalog,
            repo,
            autosave,
            verifier,
        }
    }

    pub async fn handle(&self, cmd: RunMutation) -> Result<MutationResponse, ApplicationError> {
        let kind = cmd.task.kind();

        let mut article = match &cmd.article_id {
            Some(id) => Some(load_article(&*self.repo, &*self.autosave, id).await?),
            None => None,
        };
        let sections: Vec<SectionPayload> = if cmd.sections.is_empty() {
            article
                .as_ref()
                .map(|a| a.sections.iter().map(SectionPayload::from).collect())
                .unwrap_or_default()
        } else {
            cmd.sections
        };
        if sections.is_empty() {
            return Err(ApplicationError::validation("処理対象のセクションがありません"));
        }

        let mut response = MutationResponse::default();

        let catalog = match &cmd.task {
            MutationTask::InternalLinks { catalog } => {
                let catalog = self.resolve_catalog(catalog.clone()).await?;
                if catalog.is_empty() {
                    return Err(ApplicationError::Unavailable(
                        "記事一覧データが取得できませんでした".to_string(),
                    ));
                }
                response.article_count = Some(catalog.entries.len());
                response.source = Some(catalog.source);
                Some(catalog)
            }
            _ => None,
        };

        let mut placeholders: usize = sections.iter().map(|s| count_sales_placeholders(&s.prose)).sum();
        if kind == MutationKind::SalesLocations && placeholders >= self.settings.max_sales_placeholders {
            tracing::info!(placeholders, "Sales placeholder cap reached, skipping");
            response.message = Some(format!(
                "セールス箇所は既に{}箇所あります（上限{}箇所）",
                placeholders, self.settings.max_sales_placeholders
            ));
            return Ok(response);
        }

        let pending: Vec<&SectionPayload> = sections
            .iter()
            .filter(|s| self.needs_processing(kind, s))
            .collect();
        let batch = pending.len().min(self.settings.max_sections_per_request.max(1));

        for section in pending.iter().take(batch) {
            if kind == MutationKind::SalesLocations && placeholders >= self.settings.max_sales_placeholders {
                break;
            }
            let outcome = self.process(&cmd.task, section, catalog.as_ref()).await?;
            if kind == MutationKind::SalesLocations && outcome.changed {
                placeholders += count_sales_placeholders(&outcome.content);
            }
            response.results.push(outcome);
        }

        response.remaining = pending.len() - response.results.len();
        if pending.is_empty() {
            response.message = Some(done_message(kind).to_string());
        }

        if let Some(article) = article.as_mut() {
            let mut applied = 0;
            for outcome in response.results.iter().filter(|o| o.changed) {
                match article.set_prose(&outcome.section_id, outcome.content.clone()) {
                    Ok(()) => applied += 1,
                    Err(e) => tracing::warn!(error = %e, "Mutation result not applied"),
                }
            }
            if applied > 0 {
                self.autosave.save_now(article.clone()).await?;
            }
        }

        tracing::info!(
            task = %kind.task(),
            processed = response.results.len(),
            changed = response.results.iter().filter(|o| o.changed).count(),
            remaining = response.remaining,
            "Mutation batch finished"
        );

        Ok(response)
    }

    async fn resolve_catalog(
        &self,
        manual: Option<Vec<CatalogEntry>>,
    ) -> Result<Catalog, ApplicationError> {
        match manual {
            Some(entries) if !entries.is_empty() => Ok(Catalog::new(entries, CatalogSource::Manual)),
            _ => Ok(self.catalog.fetch().await?),
        }
    }

    fn needs_processing(&self, kind: MutationKind, section: &SectionPayload) -> bool {
        if section.prose.trim().is_empty() {
            return false;
        }
        let role = BlockRole::classify(&section.title);
        match kind {
            MutationKind::InternalLinks => {
                matches!(role, BlockRole::Body | BlockRole::Summary) && !has_internal_link(&section.prose)
            }
            MutationKind::SalesLocations => {
                matches!(role, BlockRole::Body | BlockRole::Summary)
                    && !section.prose.contains(SALES_PLACEHOLDER)
            }
            MutationKind::SupervisorComments => {
                role.accepts_supervisor_comment() && !self.assembler.supervisor().is_present(&section.prose)
            }
        }
    }

    async fn process(
        &self,
        task: &MutationTask,
        section: &SectionPayload,
        catalog: Option<&Catalog>,
    ) -> Result<SectionOutcome, ApplicationError> {
        let kind = task.kind();
        let sent = truncate_chars(&section.prose, self.settings.char_limit(kind));
        if sent.is_truncated() {
            tracing::debug!(
                section_id = %section.id,
                limit = self.settings.char_limit(kind),
                "Section prose truncated for prompt"
            );
        }

        let prompt = match task {
            MutationTask::InternalLinks { .. } => self.assembler.internal_links(
                &section.title,
                &section.subheadings,
                &sent,
                catalog.map(|c| c.entries.as_slice()).unwrap_or(&[]),
            ),
            MutationTask::SalesLocations {
                product_url,
                article_topic,
            } => {
                let topic = if article_topic.trim().is_empty() {
                    section.title.as_str()
                } else {
                    article_topic.as_str()
                };
                self.assembler.sales_locations(&sent, topic, product_url)
            }
            MutationTask::SupervisorComments => {
                self.assembler.supervisor_comments(&sent, &section.title)
            }
        };

        let raw = complete(&*self.gateway, &self.settings, kind.task(), prompt, Vec::new()).await?;
        let candidate = strip_omission_marker(&sanitize_mutation(&raw, kind, sent.sent));

        match self.verifier.verify(kind, sent.sent, &candidate) {
            Verdict::Accepted => {
                tracing::info!(section_id = %section.id, task = %kind.task(), "Mutation accepted");
                Ok(SectionOutcome {
                    section_id: section.id.clone(),
                    content: reassemble(&candidate, &sent),
                    changed: true,
                    rejected: None,
                })
            }
            Verdict::Rejected(reason) => {
                tracing::warn!(
                    section_id = %section.id,
                    task = %kind.task(),
                    reason = reason.as_str(),
                    candidate_chars = candidate.chars().count(),
                    "Model output failed preservation check, keeping original"
                );
                Ok(SectionOutcome {
                    section_id: section.id.clone(),
                    content: section.prose.clone(),
                    changed: false,
                    rejected: Some(reason.as_str()),
                })
            }
        }
    }
}

fn done_message(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::InternalLinks => "すべてのセクションに内部リンクが挿入済みです",
        MutationKind::SalesLocations => "セールス箇所を追加できるセクションがありません",
        MutationKind::SupervisorComments => "すべてのセクションに監修者コメントが挿入済みです",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::{OUTPUT_BEGIN, OUTPUT_END};
    use crate::application::ports::TemplateSourcePort;
    use crate::domain::{Article, ArticleInputData, SectionId};
    use crate::application::ports::CatalogError;
    use crate::infrastructure::adapters::{builtin_entries, FakeLlmClient, FallbackCatalog, StaticCatalog};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteArticleRepository,
    };
    use crate::infrastructure::worker::AutosaveWorker;
    use std::time::Duration;

    struct NoTemplates;

    impl TemplateSourcePort for NoTemplates {
        fn load(&self, _name: &str) -> String {
            String::new()
        }
    }

    struct Fixture {
        llm: Arc<FakeLlmClient>,
        repo: Arc<SqliteArticleRepository>,
        autosave: Arc<AutosaveWorker>,
        handler: RunMutationHandler,
    }

    async fn fixture(catalog: Vec<CatalogEntry>) -> Fixture {
        fixture_with(Arc::new(StaticCatalog::new(catalog))).await
    }

    async fn fixture_with(catalog: Arc<dyn ArticleCatalogPort>) -> Fixture {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqliteArticleRepository::new(pool));
        let autosave = Arc::new(AutosaveWorker::new(repo.clone(), Duration::from_millis(50)));
        let llm = Arc::new(FakeLlmClient::new());
        let settings = Arc::new(PipelineSettings::default());
        let assembler = Arc::new(PromptAssembler::new(Arc::new(NoTemplates), &settings));
        let handler = RunMutationHandler::new(
            llm.clone(),
            assembler,
            settings,
            catalog,
            repo.clone(),
            autosave.clone(),
        );
        Fixture {
            llm,
            repo,
            autosave,
            handler,
        }
    }

    struct UnreachableSheet;

    #[async_trait::async_trait]
    impl ArticleCatalogPort for UnreachableSheet {
        async fn fetch(&self) -> Result<Catalog, CatalogError> {
            Err(CatalogError::Network("connection refused".to_string()))
        }
    }

    fn payload(title: &str, prose: &str) -> SectionPayload {
        SectionPayload {
            id: SectionId::new(),
            title: title.to_string(),
            subheadings: Vec::new(),
            prose: prose.to_string(),
        }
    }

    fn enveloped(text: &str) -> String {
        format!("{}\n{}\n{}", OUTPUT_BEGIN, text, OUTPUT_END)
    }

    fn links(sections: Vec<SectionPayload>) -> RunMutation {
        RunMutation {
            task: MutationTask::InternalLinks { catalog: None },
            article_id: None,
            sections,
        }
    }

    #[tokio::test]
    async fn test_internal_links_one_section_per_call() {
        let f = fixture(vec![CatalogEntry::new("記事A", "https://a.example/")]).await;
        f.llm.push_text(enveloped("本文一。\n参考記事：記事A(https://a.example/)"));

        let sections = vec![payload("始め方", "本文一。"), payload("続き", "本文二。")];
        let response = f.handler.handle(links(sections)).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert!(response.results[0].changed);
        assert_eq!(response.remaining, 1);
        assert_eq!(response.article_count, Some(1));
        assert_eq!(f.llm.requests().len(), 1);
        assert!(f.llm.requests()[0].prompt.contains("記事A (https://a.example/)"));
    }

    #[tokio::test]
    async fn test_rejected_output_keeps_original() {
        let f = fixture(vec![CatalogEntry::new("記事A", "https://a.example/")]).await;
        f.llm.push_text("全く別の文章です。参考記事：記事A(https://a.example/)");

        let response = f
            .handler
            .handle(links(vec![payload("始め方", "元の本文です。")]))
            .await
            .unwrap();

        assert!(!response.results[0].changed);
        assert_eq!(response.results[0].content, "元の本文です。");
        assert!(response.results[0].rejected.is_some());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_an_error() {
        let f = fixture(Vec::new()).await;
        let err = f
            .handler
            .handle(links(vec![payload("始め方", "本文")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Unavailable(_)));
        assert!(f.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_sales_cap_skips_processing() {
        let f = fixture(Vec::new()).await;
        let prose = format!("本文\n{}\n続き\n{}", SALES_PLACEHOLDER, SALES_PLACEHOLDER);
        let cmd = RunMutation {
            task: MutationTask::SalesLocations {
                product_url: String::new(),
                article_topic: String::new(),
            },
            article_id: None,
            sections: vec![payload("始め方", &prose), payload("次", "未処理")],
        };
        let response = f.handler.handle(cmd).await.unwrap();
        assert!(response.results.is_empty());
        assert!(response.message.is_some());
        assert!(f.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_supervisor_skips_summary_and_applies_to_article() {
        let f = fixture(Vec::new()).await;
        let mut article = Article::new(ArticleInputData::default());
        article.apply_outline("## 始め方\n## まとめ");
        let body_id = article.sections[0].id.clone();
        let summary_id = article.sections[1].id.clone();
        article.set_prose(&body_id, "始め方の本文。").unwrap();
        article.set_prose(&summary_id, "まとめの本文。").unwrap();
        let article = f.autosave.save_now(article).await.unwrap();

        f.llm.push_text(enveloped(
            "始め方の本文。\n<佐藤誠一吹き出し>\n大切なポイントです。\n</佐藤誠一吹き出し>",
        ));

        let response = f
            .handler
            .handle(RunMutation {
                task: MutationTask::SupervisorComments,
                article_id: Some(article.id.clone()),
                sections: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].section_id, body_id);
        assert_eq!(response.remaining, 0);

        let stored = f.repo.find_by_id(&article.id).await.unwrap().unwrap();
        assert!(stored.section(&body_id).unwrap().prose.contains("<佐藤誠一吹き出し>"));
        assert_eq!(stored.section(&summary_id).unwrap().prose, "まとめの本文。");
    }

    #[tokio::test]
    async fn test_truncated_prose_tail_restored() {
        let f = fixture(Vec::new()).await;
        let head = "あ".repeat(2000);
        let tail = "い".repeat(500);
        let prose = format!("{}{}", head, tail);
        f.llm.push_text(enveloped(&format!("{}\n{}", head, SALES_PLACEHOLDER)));

        let response = f
            .handler
            .handle(RunMutation {
                task: MutationTask::SalesLocations {
                    product_url: "https://example.com".to_string(),
                    article_topic: String::new(),
                },
                article_id: None,
                sections: vec![payload("始め方", &prose)],
            })
            .await
            .unwrap();

        let content = &response.results[0].content;
        assert!(response.results[0].changed);
        assert!(content.starts_with(&head));
        assert!(content.ends_with(&tail));
        assert!(content.contains(SALES_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_echoed_omission_marker_not_stored() {
        let f = fixture(Vec::new()).await;
        let head = "あ".repeat(2000);
        let tail = "い".repeat(500);
        let prose = format!("{}{}", head, tail);
        f.llm.push_text(enveloped(&format!(
            "{}\n{}\n\n（...以下省略）",
            head, SALES_PLACEHOLDER
        )));

        let response = f
            .handler
            .handle(RunMutation {
                task: MutationTask::SalesLocations {
                    product_url: "https://example.com".to_string(),
                    article_topic: String::new(),
                },
                article_id: None,
                sections: vec![payload("始め方", &prose)],
            })
            .await
            .unwrap();

        let content = &response.results[0].content;
        assert!(response.results[0].changed);
        assert!(!content.contains("以下省略"));
        assert!(content.ends_with(&tail));
        assert!(content.contains(SALES_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_internal_links_fall_back_to_builtin_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FallbackCatalog::new(
            Some(Arc::new(UnreachableSheet)),
            vec![dir.path().join("article-list.json")],
            true,
        );
        let f = fixture_with(Arc::new(catalog)).await;
        f.llm.push_text(enveloped("本文一。"));

        let response = f
            .handler
            .handle(links(vec![payload("始め方", "本文一。")]))
            .await
            .unwrap();

        let builtin = builtin_entries();
        assert_eq!(response.source, Some(CatalogSource::Builtin));
        assert_eq!(response.article_count, Some(builtin.len()));

        let prompt = &f.llm.requests()[0].prompt;
        let listed: Vec<&str> = prompt
            .lines()
            .filter(|l| l.ends_with(')') && l.contains(" (http"))
            .collect();
        let expected: Vec<String> = builtin.iter().map(CatalogEntry::prompt_line).collect();
        assert_eq!(listed, expected);
    }
}
