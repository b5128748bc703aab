//! SQLite Persistence - SQLite 数据库持久化实现

mod article_repo;
mod database;

pub use article_repo::SqliteArticleRepository;
pub use database::*;
