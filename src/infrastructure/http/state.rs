//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ApplyOutlineHandler, AutosaveArticleHandler, ConvertToWordpressHandler, DeleteArticleHandler,
    EditOutlinePartHandler, EditWritingPartHandler, GenerateFinishingHandler,
    GenerateOutlineHandler, GenerateTitlesHandler, GenerateWritingHandler,
    ResolveConflictHandler, RunMutationHandler, SaveArticleHandler,
    // Query handlers
    GetArticleHandler, GetCatalogHandler, ListArticlesHandler,
    // Pipeline
    PipelineSettings, PromptAssembler,
    // Ports
    ArticleCatalogPort, ArticleRepositoryPort, AutosavePort, LlmGatewayPort, TemplateSourcePort,
};
use crate::infrastructure::http::auth::AuthGate;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub gateway: Arc<dyn LlmGatewayPort>,
    pub catalog: Arc<dyn ArticleCatalogPort>,
    pub article_repo: Arc<dyn ArticleRepositoryPort>,
    pub autosave: Arc<dyn AutosavePort>,
    pub settings: Arc<PipelineSettings>,
    pub auth: AuthGate,

    // ========== Command Handlers ==========
    pub generate_outline_handler: GenerateOutlineHandler,
    pub edit_outline_part_handler: EditOutlinePartHandler,
    pub generate_titles_handler: GenerateTitlesHandler,
    pub generate_writing_handler: GenerateWritingHandler,
    pub edit_writing_part_handler: EditWritingPartHandler,
    pub generate_finishing_handler: GenerateFinishingHandler,
    pub convert_to_wordpress_handler: ConvertToWordpressHandler,
    pub run_mutation_handler: RunMutationHandler,
    pub save_article_handler: SaveArticleHandler,
    pub autosave_article_handler: AutosaveArticleHandler,
    pub delete_article_handler: DeleteArticleHandler,
    pub apply_outline_handler: ApplyOutlineHandler,
    pub resolve_conflict_handler: ResolveConflictHandler,

    // ========== Query Handlers ==========
    pub get_article_handler: GetArticleHandler,
    pub list_articles_handler: ListArticlesHandler,
    pub get_catalog_handler: GetCatalogHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        gateway: Arc<dyn LlmGatewayPort>,
        templates: Arc<dyn TemplateSourcePort>,
        catalog: Arc<dyn ArticleCatalogPort>,
        article_repo: Arc<dyn ArticleRepositoryPort>,
        autosave: Arc<dyn AutosavePort>,
        settings: PipelineSettings,
        auth: AuthGate,
    ) -> Self {
        let assembler = Arc::new(PromptAssembler::new(templates, &settings));
        let settings = Arc::new(settings);

        Self {
            // Ports
            gateway: gateway.clone(),
            catalog: catalog.clone(),
            article_repo: article_repo.clone(),
            autosave: autosave.clone(),
            settings: settings.clone(),
            auth,

            // Command handlers
            generate_outline_handler: GenerateOutlineHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
                article_repo.clone(),
                autosave.clone(),
            ),
            edit_outline_part_handler: EditOutlinePartHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
            ),
            generate_titles_handler: GenerateTitlesHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
            ),
            generate_writing_handler: GenerateWritingHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
                article_repo.clone(),
                autosave.clone(),
            ),
            edit_writing_part_handler: EditWritingPartHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
            ),
            generate_finishing_handler: GenerateFinishingHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
                article_repo.clone(),
                autosave.clone(),
            ),
            convert_to_wordpress_handler: ConvertToWordpressHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
                article_repo.clone(),
                autosave.clone(),
            ),
            run_mutation_handler: RunMutationHandler::new(
                gateway.clone(),
                assembler.clone(),
                settings.clone(),
                catalog.clone(),
                article_repo.clone(),
                autosave.clone(),
            ),
            save_article_handler: SaveArticleHandler::new(autosave.clone()),
            autosave_article_handler: AutosaveArticleHandler::new(autosave.clone()),
            delete_article_handler: DeleteArticleHandler::new(autosave.clone()),
            apply_outline_handler: ApplyOutlineHandler::new(
                article_repo.clone(),
                autosave.clone(),
            ),
            resolve_conflict_handler: ResolveConflictHandler::new(
                article_repo.clone(),
                autosave.clone(),
            ),

            // Query handlers
            get_article_handler: GetArticleHandler::new(article_repo.clone(), autosave.clone()),
            list_articles_handler: ListArticlesHandler::new(article_repo.clone()),
            get_catalog_handler: GetCatalogHandler::new(catalog.clone()),
        }
    }
}
