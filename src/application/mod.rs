//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（LlmGateway、TemplateSource、ArticleCatalog、Repository、Autosave）
//! - pipeline: 提示词组装、输出清洗、原文保留校验、标题与四件套解析
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Generation commands
    ConvertToWordpress,
    EditOutlinePart,
    EditWritingPart,
    FinishingGenerated,
    GenerateFinishing,
    GenerateOutline,
    GenerateTitles,
    GenerateWriting,
    OutlineGenerated,
    TitlesGenerated,
    // Mutation commands
    MutationResponse,
    MutationTask,
    RunMutation,
    SectionOutcome,
    SectionPayload,
    // Article commands
    ApplyOutline,
    AutosaveArticle,
    DeleteArticle,
    ResolveConflict,
    SaveArticle,
    // Handlers
    handlers::{
        ApplyOutlineHandler, AutosaveArticleHandler, ConvertToWordpressHandler,
        DeleteArticleHandler, EditOutlinePartHandler, EditWritingPartHandler,
        GenerateFinishingHandler, GenerateOutlineHandler, GenerateTitlesHandler,
        GenerateWritingHandler, ResolveConflictHandler, RunMutationHandler, SaveArticleHandler,
    },
};

pub use error::ApplicationError;

pub use pipeline::{PipelineSettings, PromptAssembler, TaskKind, TaskTimeouts};

pub use ports::{
    // LLM
    CompletionRequest,
    ImagePart,
    LlmError,
    LlmGatewayPort,
    // Templates
    TemplateSourcePort,
    // Catalog
    ArticleCatalogPort,
    Catalog,
    CatalogEntry,
    CatalogError,
    CatalogSource,
    // Repositories
    ArticleRepositoryPort,
    AutosavePort,
    RepositoryError,
};

pub use queries::{
    GetArticle,
    GetCatalog,
    ListArticles,
    // Handlers
    handlers::{GetArticleHandler, GetCatalogHandler, ListArticlesHandler},
};
